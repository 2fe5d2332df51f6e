//! Domain types for Customer Desk
//! Defines the customer record, search criteria and summary counters shared by
//! the store, the controller and the terminal UI.

pub mod error;

pub use error::StoreError;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier of a customer row (8 characters of `A-Z0-9`).
pub type CustomerId = String;

/// On-disk format of `created_at`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// On-disk format of `date_added`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of generated customer identifiers.
pub const CUSTOMER_ID_LEN: usize = 8;

/// One customer entry.
///
/// `created_at` and `date_added` are kept as the stored text so rows written by
/// older versions (or migrated from them) round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub name: String,
    pub created_at: String,
    pub daily_sequence: i64,
    pub date_added: String,
}

impl CustomerRecord {
    /// Queue label shown to users, e.g. `#07`. Legacy rows without a sequence show `#00`.
    pub fn sequence_label(&self) -> String {
        format_sequence(self.daily_sequence)
    }
}

pub fn format_sequence(sequence: i64) -> String {
    if sequence > 0 {
        format!("#{sequence:02}")
    } else {
        "#00".to_string()
    }
}

pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Filters for [`crate::infra::db::CustomerRepository::search`].
///
/// All supplied fields are combined with AND. A field that is `None` or empty
/// counts as not supplied. `exact_sequence` is kept as text because it comes
/// straight from a free-text input and is validated by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub name_part: Option<String>,
    pub id_part: Option<String>,
    pub exact_sequence: Option<String>,
}

impl SearchCriteria {
    pub fn by_name(part: impl Into<String>) -> Self {
        Self {
            name_part: Some(part.into()),
            ..Self::default()
        }
    }

    pub fn by_id(part: impl Into<String>) -> Self {
        Self {
            id_part: Some(part.into()),
            ..Self::default()
        }
    }

    pub fn by_sequence(sequence: impl ToString) -> Self {
        Self {
            exact_sequence: Some(sequence.to_string()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, part: impl Into<String>) -> Self {
        self.name_part = Some(part.into());
        self
    }

    pub fn with_id(mut self, part: impl Into<String>) -> Self {
        self.id_part = Some(part.into());
        self
    }

    pub fn with_sequence(mut self, sequence: impl ToString) -> Self {
        self.exact_sequence = Some(sequence.to_string());
        self
    }

    pub fn name(&self) -> Option<&str> {
        supplied(&self.name_part)
    }

    pub fn id(&self) -> Option<&str> {
        supplied(&self.id_part)
    }

    pub fn sequence(&self) -> Option<&str> {
        supplied(&self.exact_sequence)
    }

    pub fn is_empty(&self) -> bool {
        self.name().is_none() && self.id().is_none() && self.sequence().is_none()
    }
}

fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

/// Header counters: every customer ever recorded and those recorded today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: u64,
    pub today: u64,
}
