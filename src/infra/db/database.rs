//! SQLite database setup and connection management for Customer Desk
//! Handles opening the store, applying schema migrations, and handing out repositories.

use super::migrations::{self, MIGRATIONS};
use super::repository::CustomerRepository;
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database wrapper that owns the SQLite connection.
///
/// Constructed once at startup and shared with the controller; the connection
/// is closed when the last handle is dropped.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Create or open the database at a specific path
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        log::debug!("Opened customer database at {}", path.display());
        Self::from_connection(conn)
    }

    /// Wrap an existing connection and bring its schema up to date.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Get the default database path
    pub fn default_path() -> PathBuf {
        let config = crate::infra::app_config::load_config();
        crate::infra::app_config::resolve_db_path(None, &config)
    }

    /// Apply every schema step in order.
    ///
    /// Safe to call repeatedly; an up-to-date database is left untouched.
    pub fn initialize(&self) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))?;

        let existing_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        let target_version = migrations::schema_version();
        if existing_version > target_version {
            log::warn!(
                "Database schema version {} is newer than supported version {}",
                existing_version,
                target_version
            );
        }

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for migration in MIGRATIONS {
            let changed = (migration.apply)(&tx)
                .with_context(|| format!("Failed to apply migration {}", migration.name))?;
            if changed {
                log::info!("Applied migration {}", migration.name);
            }
        }
        if existing_version < target_version {
            tx.pragma_update(None, "user_version", target_version)?;
        }
        tx.commit()?;

        Ok(())
    }

    /// Get a reference to the connection
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    pub fn customer_repo(&self) -> CustomerRepository {
        CustomerRepository::new(self.connection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_sql(db: &Database) -> Vec<String> {
        let conn = db.connection();
        let guard = conn.lock().unwrap();
        let mut stmt = guard
            .prepare("SELECT sql FROM sqlite_master WHERE sql IS NOT NULL ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn test_database_default_path() {
        let path = Database::default_path();
        assert!(path.file_name().is_some());
    }

    #[test]
    fn test_database_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let guard = conn.lock().unwrap();
        let version: i32 = guard
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, migrations::schema_version());
        assert!(migrations::has_column(&guard, "customers", "date_added").unwrap());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.customer_repo().insert_customer("Alice").unwrap();
        let before = schema_sql(&db);

        db.initialize().unwrap();
        db.initialize().unwrap();

        assert_eq!(schema_sql(&db), before);
        assert_eq!(db.customer_repo().list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_legacy_table_is_upgraded_and_backfilled() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE customers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            INSERT INTO customers (id, name, created_at) VALUES ('LEG00001', 'Kamal', '2023-11-02 10:00:00');
            INSERT INTO customers (id, name, created_at) VALUES ('LEG00002', 'Sunil', '2023-11-03 16:30:12');
            "#,
        )
        .unwrap();

        let db = Database::from_connection(conn).unwrap();
        let mut rows = db.customer_repo().list_all().unwrap();
        rows.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Kamal");
        assert_eq!(rows[0].created_at, "2023-11-02 10:00:00");
        assert_eq!(rows[0].date_added, "2023-11-02");
        assert_eq!(rows[0].daily_sequence, 0);
        assert_eq!(rows[1].date_added, "2023-11-03");
    }

    #[test]
    fn test_table_missing_only_date_added() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE customers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                daily_sequence INTEGER DEFAULT 0
            );
            INSERT INTO customers VALUES ('LEG00003', 'Ruwan', '2024-02-29 08:00:00', 4);
            "#,
        )
        .unwrap();

        let db = Database::from_connection(conn).unwrap();
        let rows = db
            .customer_repo()
            .list_for_date(chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].daily_sequence, 4);
        assert_eq!(rows[0].id, "LEG00003");
    }

    #[test]
    fn test_nullable_date_added_is_backfilled() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE customers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                daily_sequence INTEGER DEFAULT 0,
                date_added TEXT
            );
            INSERT INTO customers (id, name, created_at) VALUES ('LEG00004', 'Dilani', '2024-03-08 12:30:00');
            "#,
        )
        .unwrap();

        let db = Database::from_connection(conn).unwrap();
        let rows = db.customer_repo().list_all().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date_added, "2024-03-08");
    }

    #[test]
    fn test_open_at_persists_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("customers.db");

        {
            let db = Database::open_at(&path).unwrap();
            db.customer_repo().insert_customer("Alice").unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        let rows = db.customer_repo().list_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Alice");
    }
}
