pub mod database;
pub mod deadlines;
pub mod generator;
pub mod memory;
pub mod metrics;
pub mod repository;

pub use database::MongoDb;
pub use deadlines::{DeadlineService, SeedOutcome};
pub use generator::generate_deadlines;
pub use memory::{InMemoryCalendars, InMemoryDeadlines};
pub use repository::{CalendarRepository, DeadlineRepository, UpsertSummary};
pub use service_core::observability::{get_metrics, init_metrics};
