//! Row and outcome types for the probe table.

use std::fmt;

use chrono::{DateTime, Utc};

/// A stored row from the `probe_records` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProbeRecord {
    /// Identity column assigned by the database.
    pub id: i64,
    /// Probe message text.
    pub message: String,
    /// Timestamp supplied at insert time.
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for ProbeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Message: {}, Created At: {}",
            self.id, self.message, self.created_at
        )
    }
}

/// Classified result of the create-table step.
#[derive(Debug)]
pub enum TableSetup {
    /// The table did not exist and was created.
    Created,
    /// The table was already present from an earlier run.
    AlreadyExists,
    /// Creation failed for any other reason.
    Failed(sqlx::Error),
}

/// [`TableSetup`] without its error payload, kept in run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    /// See [`TableSetup::Created`].
    Created,
    /// See [`TableSetup::AlreadyExists`].
    AlreadyExists,
}
