//! Repository implementations for data access in Customer Desk.
//!
//! Provides the customer store: inserts with per-day sequence numbers and the
//! listing/search queries the desk renders.

mod customer;

pub use customer::CustomerRepository;

use crate::domain::StoreError;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

pub(super) type DbConn = Arc<Mutex<Connection>>;

pub(super) fn lock(conn: &DbConn) -> Result<MutexGuard<'_, Connection>, StoreError> {
    conn.lock()
        .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
}
