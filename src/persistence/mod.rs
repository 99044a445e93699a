//! Persistence layer: the probe table and the connection that reaches it.
//!
//! [`Connector`] opens one connection; [`ProbeStore`] is the handful of
//! statements the smoke test runs over it. The concrete implementation in
//! [`postgres`] uses a single `sqlx::PgConnection`.

use std::future::Future;

use chrono::{DateTime, Utc};

pub mod models;
pub mod postgres;

pub use models::{ProbeRecord, TableSetup, TableStatus};

/// Opens a fresh database connection.
pub trait Connector {
    /// Connection type produced on success.
    type Store: ProbeStore;

    /// Makes one connection attempt.
    fn connect(&self) -> impl Future<Output = Result<Self::Store, sqlx::Error>> + Send;
}

/// Statements the smoke test issues against an open connection.
pub trait ProbeStore {
    /// Creates the probe table, classifying the outcome.
    fn create_table(&mut self) -> impl Future<Output = TableSetup> + Send;

    /// Inserts one probe row and commits it, returning the assigned id.
    fn insert_probe(
        &mut self,
        message: &str,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Returns every probe row ordered by id.
    fn fetch_probes(&mut self) -> impl Future<Output = Result<Vec<ProbeRecord>, sqlx::Error>> + Send;

    /// Closes the connection.
    fn close(self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}
