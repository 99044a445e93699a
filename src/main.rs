//! db-smoke entry point.
//!
//! Loads configuration, runs the smoke test and maps failure to a
//! non-zero exit status.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use db_smoke::config::{PasswordSource, SmokeConfig};
use db_smoke::persistence::postgres::PostgresConnector;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match SmokeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if config.connection.password_source == PasswordSource::Fallback {
        tracing::warn!("DB_PASSWORD is not set; using the built-in default password");
    }

    tracing::info!(
        addr = %config.connection.address(),
        user = %config.connection.username,
        max_attempts = config.retry.max_attempts.get(),
        delay_secs = config.retry.delay.as_secs(),
        "waiting for database to be ready"
    );

    let connector = PostgresConnector::new(config.connection.connect_options());
    let mut stdout = std::io::stdout();

    match db_smoke::run(&connector, &config.retry, &config.message, &mut stdout).await {
        Ok(report) => {
            tracing::info!(
                inserted_id = report.inserted_id,
                rows = report.records.len(),
                "all database operations completed successfully"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "smoke test failed");
            ExitCode::FAILURE
        }
    }
}
