pub mod logging;
pub mod metrics;

pub use logging::{init_test_tracing, init_tracing};
pub use metrics::{get_metrics, init_metrics};
