//! Exponential backoff for storage and persistence calls.

use backoff::future::retry;
use backoff::ExponentialBackoff;
use service_core::error::AppError;
use std::future::Future;
use std::time::Duration;

/// Retries database and I/O failures; caller errors (not found, bad input,
/// conflicts) are returned immediately.
pub async fn with_backoff<T, F, Fut>(operation: &str, max_elapsed: Duration, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(100),
        max_elapsed_time: Some(max_elapsed),
        ..Default::default()
    };

    retry(policy, || {
        let attempt = op();
        async move {
            attempt.await.map_err(|e| {
                if is_transient(&e) {
                    tracing::warn!(operation = %operation, error = %e, "Transient failure, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        }
    })
    .await
}

fn is_transient(error: &AppError) -> bool {
    matches!(
        error,
        AppError::DatabaseError(_) | AppError::InternalError(_) | AppError::ServiceUnavailable
    )
}
