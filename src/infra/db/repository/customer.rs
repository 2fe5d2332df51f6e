use super::{DbConn, lock};
use crate::domain::{
    CustomerRecord, SearchCriteria, StoreError, format_date, format_timestamp,
};
use crate::infra::clock::{Clock, SystemClock};
use crate::infra::ids::{IdSource, RandomIds};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, TransactionBehavior, params, params_from_iter};
use std::sync::Arc;

const CUSTOMER_COLUMNS: &str = "id, name, created_at, daily_sequence, date_added";

/// Repository for customer records.
///
/// Records are only ever inserted; there is no update or delete.
pub struct CustomerRepository {
    conn: DbConn,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
}

impl CustomerRepository {
    pub fn new(conn: DbConn) -> Self {
        Self {
            conn,
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIds),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// One plus the highest sequence used on `date`, or 1 for a date with no customers.
    ///
    /// Read-only: the value is not reserved. [`Self::insert_customer`] recomputes
    /// it inside its own write transaction.
    pub fn next_daily_sequence(&self, date: NaiveDate) -> Result<i64, StoreError> {
        let conn = lock(&self.conn)?;
        Ok(next_sequence_in(&conn, &format_date(&date))?)
    }

    /// Record a new customer stamped with the current time and the next sequence
    /// number for today.
    ///
    /// The sequence lookup and the insert share one `IMMEDIATE` transaction, so
    /// concurrent writers on the same file cannot be handed the same number.
    pub fn insert_customer(&self, name: &str) -> Result<CustomerRecord, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::validation("Customer name is required"));
        }

        let id = self.ids.next_id();
        let now = self.clock.now();
        let created_at = format_timestamp(&now);
        let date_added = format_date(&now.date());

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let daily_sequence = next_sequence_in(&tx, &date_added)?.max(1);

        tx.execute(
            r#"
            INSERT INTO customers (id, name, created_at, daily_sequence, date_added)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![&id, name, &created_at, daily_sequence, &date_added],
        )
        .map_err(|err| classify_insert_error(err, &id))?;
        tx.commit()?;

        log::debug!("Inserted customer {} as #{:02} on {}", id, daily_sequence, date_added);

        Ok(CustomerRecord {
            id,
            name: name.to_string(),
            created_at,
            daily_sequence,
            date_added,
        })
    }

    /// Every customer, most recent first.
    pub fn list_all(&self) -> Result<Vec<CustomerRecord>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], map_customer)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Customers added on `date`, in queue order.
    pub fn list_for_date(&self, date: NaiveDate) -> Result<Vec<CustomerRecord>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE date_added = ?1 ORDER BY daily_sequence ASC, rowid ASC"
        ))?;
        let rows = stmt.query_map([format_date(&date)], map_customer)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Customers matching every supplied criterion, most recent first.
    ///
    /// Name and id filters are case-sensitive substring matches. At least one
    /// criterion is required and the sequence filter must be an integer.
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<CustomerRecord>, StoreError> {
        if criteria.is_empty() {
            return Err(StoreError::validation(
                "Please enter at least one search criteria",
            ));
        }

        let mut conditions = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(name) = criteria.name() {
            conditions.push("instr(name, ?) > 0");
            values.push(Value::Text(name.to_string()));
        }
        if let Some(id) = criteria.id() {
            conditions.push("instr(id, ?) > 0");
            values.push(Value::Text(id.to_string()));
        }
        if let Some(sequence) = criteria.sequence() {
            let sequence: i64 = sequence.trim().parse().map_err(|_| {
                StoreError::validation(format!(
                    "Daily number must be a valid number, got '{sequence}'"
                ))
            })?;
            conditions.push("daily_sequence = ?");
            values.push(Value::Integer(sequence));
        }

        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE {} ORDER BY created_at DESC, rowid DESC",
            conditions.join(" AND ")
        ))?;
        let rows = stmt.query_map(params_from_iter(values), map_customer)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count_all(&self) -> Result<u64, StoreError> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    pub fn count_for_date(&self, date: NaiveDate) -> Result<u64, StoreError> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM customers WHERE date_added = ?1",
            [format_date(&date)],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// Today's date according to the repository clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }
}

fn next_sequence_in(conn: &Connection, date_added: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(daily_sequence), 0) + 1 FROM customers WHERE date_added = ?1",
        [date_added],
        |row| row.get(0),
    )
}

fn classify_insert_error(err: rusqlite::Error, id: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            StoreError::DuplicateKey(id.to_string())
        }
        _ => StoreError::Storage(err),
    }
}

fn map_customer(row: &Row<'_>) -> rusqlite::Result<CustomerRecord> {
    Ok(CustomerRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        daily_sequence: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
        date_added: row.get(4)?,
    })
}
