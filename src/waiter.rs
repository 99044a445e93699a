//! Connection waiter: fixed-interval retry until the database answers.

use crate::config::RetryPolicy;
use crate::error::SmokeError;
use crate::persistence::Connector;

/// Opens a connection, retrying on failure within `policy`.
///
/// Makes up to `policy.max_attempts` attempts. After each failed attempt
/// except the last it sleeps for `policy.delay`, so a database that answers
/// on attempt `n` costs `n - 1` sleeps.
///
/// # Errors
///
/// Returns [`SmokeError::ConnectionExhausted`] carrying the last driver
/// error when every attempt fails.
pub async fn wait_for_database<C: Connector>(
    connector: &C,
    policy: &RetryPolicy,
) -> Result<C::Store, SmokeError> {
    let max_attempts = policy.max_attempts.get();
    let mut attempt = 1;

    loop {
        match connector.connect().await {
            Ok(store) => {
                tracing::info!(attempt, "connected to database");
                return Ok(store);
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!(attempt, max_attempts, error = %e, "database still unreachable");
                return Err(SmokeError::ConnectionExhausted {
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!(attempt, max_attempts, error = %e, "database not ready yet");
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
