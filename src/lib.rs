//! # db-smoke
//!
//! Waits for a PostgreSQL database to accept connections, then runs a
//! minimal create/insert/query cycle against it to confirm that writes
//! and reads work.
//!
//! ## Flow
//!
//! ```text
//! SmokeConfig (env / .env)
//!     │
//!     ├── wait_for_database (waiter/)   fixed-interval retry
//!     │        │
//!     │        └── Connector ──► PgConnection
//!     │
//!     ├── run_smoke_test (runner/)      create table → insert → select → print
//!     │
//!     └── close connection
//! ```

pub mod config;
pub mod error;
pub mod persistence;
pub mod runner;
pub mod waiter;

#[cfg(test)]
mod testing;

pub use config::{ConnectionParams, RetryPolicy, SmokeConfig};
pub use error::SmokeError;
pub use runner::{RunReport, run, run_smoke_test};
pub use waiter::wait_for_database;
