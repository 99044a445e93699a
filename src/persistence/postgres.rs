//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use super::models::{ProbeRecord, TableSetup};
use super::{Connector, ProbeStore};

/// SQLSTATE `duplicate_table`.
pub const DUPLICATE_TABLE: &str = "42P07";

const CREATE_TABLE_SQL: &str = "CREATE TABLE probe_records (\
     id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY, \
     message VARCHAR(100) NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL)";

/// Opens single PostgreSQL connections from fixed options.
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    options: PgConnectOptions,
}

impl PostgresConnector {
    /// Creates a connector for the given options.
    #[must_use]
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }
}

impl Connector for PostgresConnector {
    type Store = PostgresProbeStore;

    async fn connect(&self) -> Result<PostgresProbeStore, sqlx::Error> {
        let conn = PgConnection::connect_with(&self.options).await?;
        Ok(PostgresProbeStore::new(conn))
    }
}

/// Probe table access over one `sqlx::PgConnection`.
#[derive(Debug)]
pub struct PostgresProbeStore {
    conn: PgConnection,
}

impl PostgresProbeStore {
    /// Wraps an already open connection.
    #[must_use]
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }
}

impl ProbeStore for PostgresProbeStore {
    async fn create_table(&mut self) -> TableSetup {
        match sqlx::query(CREATE_TABLE_SQL).execute(&mut self.conn).await {
            Ok(_) => TableSetup::Created,
            Err(e) => classify_create_error(e),
        }
    }

    async fn insert_probe(
        &mut self,
        message: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let mut tx = self.conn.begin().await?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO probe_records (message, created_at) VALUES ($1, $2) RETURNING id",
        )
        .bind(message)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(id)
    }

    async fn fetch_probes(&mut self) -> Result<Vec<ProbeRecord>, sqlx::Error> {
        sqlx::query_as::<_, ProbeRecord>(
            "SELECT id, message, created_at FROM probe_records ORDER BY id ASC",
        )
        .fetch_all(&mut self.conn)
        .await
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

/// Maps a failed `CREATE TABLE` to [`TableSetup`].
fn classify_create_error(err: sqlx::Error) -> TableSetup {
    let code = match &err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    };
    if is_duplicate_table(code.as_deref()) {
        TableSetup::AlreadyExists
    } else {
        TableSetup::Failed(err)
    }
}

/// Returns `true` for the SQLSTATE raised when the table already exists.
#[must_use]
pub fn is_duplicate_table(code: Option<&str>) -> bool {
    code == Some(DUPLICATE_TABLE)
}
