//! Smoke-test runner: create, insert, read back, print.
//!
//! [`run_smoke_test`] drives one cycle over an open [`ProbeStore`];
//! [`run`] wraps it with the connection waiter and always closes the
//! connection afterwards.

use std::io::Write;

use chrono::{DurationRound, TimeDelta, Utc};

use crate::config::RetryPolicy;
use crate::error::SmokeError;
use crate::persistence::{Connector, ProbeRecord, ProbeStore, TableSetup, TableStatus};
use crate::waiter::wait_for_database;

/// Outcome of one successful smoke-test cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Whether this run created the probe table.
    pub table: TableStatus,
    /// Id assigned to the row inserted by this run.
    pub inserted_id: i64,
    /// Every probe row, ordered by id.
    pub records: Vec<ProbeRecord>,
}

/// Runs the create/insert/query cycle and prints the rows to `out`.
///
/// Only an "already exists" create failure is tolerated; any other error
/// aborts the cycle at the step that raised it.
///
/// # Errors
///
/// Returns [`SmokeError::OperationFailed`] if a statement fails and
/// [`SmokeError::Output`] if writing to `out` fails.
pub async fn run_smoke_test<S, W>(
    store: &mut S,
    message: &str,
    out: &mut W,
) -> Result<RunReport, SmokeError>
where
    S: ProbeStore,
    W: Write,
{
    let table = match store.create_table().await {
        TableSetup::Created => {
            tracing::info!("probe table created");
            TableStatus::Created
        }
        TableSetup::AlreadyExists => {
            tracing::info!("probe table already exists");
            TableStatus::AlreadyExists
        }
        TableSetup::Failed(e) => return Err(SmokeError::operation("create table", e)),
    };

    let created_at = storage_now();
    let inserted_id = store
        .insert_probe(message, created_at)
        .await
        .map_err(|e| SmokeError::operation("insert probe", e))?;
    tracing::info!(id = inserted_id, "probe record inserted");

    let records = store
        .fetch_probes()
        .await
        .map_err(|e| SmokeError::operation("query probes", e))?;
    tracing::info!(rows = records.len(), "probe records fetched");

    print_records(out, &records)?;

    Ok(RunReport {
        table,
        inserted_id,
        records,
    })
}

/// Waits for the database, runs the smoke test and closes the connection.
///
/// The connection is closed whether or not the smoke test succeeded. A
/// failure to close is logged and does not replace the test's result.
///
/// # Errors
///
/// Returns [`SmokeError::ConnectionExhausted`] if the database never
/// answers, or any error from [`run_smoke_test`].
pub async fn run<C, W>(
    connector: &C,
    policy: &RetryPolicy,
    message: &str,
    out: &mut W,
) -> Result<RunReport, SmokeError>
where
    C: Connector,
    W: Write,
{
    let mut store = wait_for_database(connector, policy).await?;
    let result = run_smoke_test(&mut store, message, out).await;

    if let Err(e) = store.close().await {
        tracing::warn!(error = %e, "failed to close database connection");
    }

    result
}

/// Writes the probe rows under a header, one per line.
///
/// # Errors
///
/// Returns the underlying I/O error if `out` rejects a write.
pub fn print_records<W: Write>(out: &mut W, records: &[ProbeRecord]) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Test Records:")?;
    for record in records {
        writeln!(out, "{record}")?;
    }
    out.flush()
}

/// Current time truncated to the microsecond precision of `TIMESTAMPTZ`,
/// so the value read back equals the value written.
fn storage_now() -> chrono::DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::microseconds(1))
        .unwrap_or(now)
}
