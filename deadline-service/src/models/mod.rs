mod calendar;
mod client;
mod deadline;
mod financial_year;

pub use calendar::{ComplianceCalendarEntry, FirmCalendar};
pub use client::ClientRecord;
pub use deadline::{Deadline, DeadlineKey, DeadlineStatus};
pub use financial_year::FinancialYear;
