//! Ordered schema steps for the `customers` table.
//!
//! Every step inspects the live schema before changing it, so the whole list
//! can be replayed against any database: fresh, partially upgraded or current.

use rusqlite::Connection;

/// A single idempotent schema step.
pub struct Migration {
    pub name: &'static str,
    /// Applies the step and reports whether anything changed.
    pub apply: fn(&Connection) -> rusqlite::Result<bool>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_customers_table",
        apply: create_customers_table,
    },
    Migration {
        name: "add_daily_sequence",
        apply: add_daily_sequence,
    },
    Migration {
        name: "add_date_added",
        apply: add_date_added,
    },
    Migration {
        name: "index_date_added",
        apply: index_date_added,
    },
];

/// Schema version recorded in `PRAGMA user_version` once every step has run.
pub fn schema_version() -> i32 {
    MIGRATIONS.len() as i32
}

pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn create_customers_table(conn: &Connection) -> rusqlite::Result<bool> {
    if table_exists(conn, "customers")? {
        return Ok(false);
    }
    conn.execute_batch(
        r#"
        CREATE TABLE customers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            daily_sequence INTEGER NOT NULL,
            date_added TEXT NOT NULL
        );
        "#,
    )?;
    Ok(true)
}

fn add_daily_sequence(conn: &Connection) -> rusqlite::Result<bool> {
    if has_column(conn, "customers", "daily_sequence")? {
        return Ok(false);
    }
    conn.execute_batch(
        "ALTER TABLE customers ADD COLUMN daily_sequence INTEGER NOT NULL DEFAULT 0;",
    )?;
    Ok(true)
}

fn add_date_added(conn: &Connection) -> rusqlite::Result<bool> {
    let mut changed = false;
    if !has_column(conn, "customers", "date_added")? {
        conn.execute_batch("ALTER TABLE customers ADD COLUMN date_added TEXT NOT NULL DEFAULT '';")?;
        changed = true;
    }
    let backfilled = conn.execute(
        "UPDATE customers SET date_added = substr(created_at, 1, 10) \
         WHERE date_added IS NULL OR date_added = ''",
        [],
    )?;
    if backfilled > 0 {
        log::info!("Backfilled date_added for {} customer(s)", backfilled);
    }
    Ok(changed || backfilled > 0)
}

fn index_date_added(conn: &Connection) -> rusqlite::Result<bool> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_customers_date_added'",
        [],
        |row| row.get(0),
    )?;
    if existing > 0 {
        return Ok(false);
    }
    conn.execute_batch(
        "CREATE INDEX idx_customers_date_added ON customers(date_added, daily_sequence);",
    )?;
    Ok(true)
}
