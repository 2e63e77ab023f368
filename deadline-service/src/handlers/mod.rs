pub mod calendar;
pub mod deadlines;
pub mod health;

pub use calendar::{get_calendar, put_calendar};
pub use deadlines::{list_deadlines, mark_filed, seed_deadlines};
pub use health::{health_check, metrics_endpoint, readiness_check};
