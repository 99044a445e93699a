//! In-memory [`Connector`] and [`ProbeStore`] used by unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::persistence::{Connector, ProbeRecord, ProbeStore, TableSetup};

/// Shared table state so several connections see the same rows.
#[derive(Debug, Default)]
pub struct MemoryTable {
    pub exists: bool,
    pub rows: Vec<ProbeRecord>,
    pub create_error: Option<String>,
    pub insert_error: Option<String>,
    pub insert_calls: u32,
    pub closed: u32,
}

/// Connection over a [`MemoryTable`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Arc<Mutex<MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `CREATE TABLE` fails with `message`.
    pub fn failing_create(message: &str) -> Self {
        let store = Self::new();
        store.table().create_error = Some(message.to_string());
        store
    }

    /// Store whose insert fails with `message`.
    pub fn failing_insert(message: &str) -> Self {
        let store = Self::new();
        store.table().insert_error = Some(message.to_string());
        store
    }

    pub fn table(&self) -> MutexGuard<'_, MemoryTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProbeStore for MemoryStore {
    async fn create_table(&mut self) -> TableSetup {
        let mut table = self.table();
        if let Some(msg) = &table.create_error {
            return TableSetup::Failed(sqlx::Error::Protocol(msg.clone()));
        }
        if table.exists {
            TableSetup::AlreadyExists
        } else {
            table.exists = true;
            TableSetup::Created
        }
    }

    async fn insert_probe(
        &mut self,
        message: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let mut table = self.table();
        table.insert_calls += 1;
        if let Some(msg) = &table.insert_error {
            return Err(sqlx::Error::Protocol(msg.clone()));
        }
        let id = i64::try_from(table.rows.len()).unwrap_or(i64::MAX) + 1;
        table.rows.push(ProbeRecord {
            id,
            message: message.to_string(),
            created_at,
        });
        Ok(id)
    }

    async fn fetch_probes(&mut self) -> Result<Vec<ProbeRecord>, sqlx::Error> {
        Ok(self.table().rows.clone())
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.table().closed += 1;
        Ok(())
    }
}

/// Connector that fails a fixed number of times before handing out
/// connections to a shared [`MemoryStore`].
#[derive(Debug)]
pub struct FlakyConnector {
    failures: Option<u32>,
    attempts: AtomicU32,
    store: MemoryStore,
}

impl FlakyConnector {
    /// Fails the first `failures` attempts, then succeeds.
    pub fn failing_first(failures: u32) -> Self {
        Self::with_store(failures, MemoryStore::new())
    }

    /// Like [`Self::failing_first`] but over an existing store.
    pub fn with_store(failures: u32, store: MemoryStore) -> Self {
        Self {
            failures: Some(failures),
            attempts: AtomicU32::new(0),
            store,
        }
    }

    /// Never succeeds.
    pub fn never() -> Self {
        Self {
            failures: None,
            attempts: AtomicU32::new(0),
            store: MemoryStore::new(),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl Connector for FlakyConnector {
    type Store = MemoryStore;

    async fn connect(&self) -> Result<MemoryStore, sqlx::Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        match self.failures {
            Some(failures) if attempt > failures => Ok(self.store.clone()),
            _ => Err(sqlx::Error::Protocol(format!(
                "connection refused on attempt {attempt}"
            ))),
        }
    }
}
