//! The customer desk: the use-cases behind the add/list/search screen.
//!
//! Inputs arrive as raw text from the UI. The desk trims and checks them,
//! calls the store and hands back everything the UI needs to redraw: the rows,
//! the header counters and a status line.

use crate::domain::{CustomerRecord, SearchCriteria, StoreError, Summary};
use crate::infra::db::CustomerRepository;
use crate::infra::speech::Notifier;
use serde::Serialize;
use std::sync::Arc;

/// Attempts made with fresh identifiers when an insert hits a duplicate id.
pub const MAX_ID_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

impl Status {
    pub fn new(level: StatusLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn error(err: &StoreError) -> Self {
        Self::new(StatusLevel::Error, err.to_string())
    }
}

/// What the list view shows after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeskView {
    pub rows: Vec<CustomerRecord>,
    pub summary: Summary,
    pub status: Status,
}

/// Result of a successful add: the new record plus the refreshed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    pub customer: CustomerRecord,
    pub view: DeskView,
}

pub struct Desk {
    repo: CustomerRepository,
    notifier: Arc<dyn Notifier>,
}

impl Desk {
    pub fn new(repo: CustomerRepository, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    /// Record a customer, announce them and refresh the full list.
    pub fn add(&self, raw_name: &str) -> Result<Added, StoreError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(StoreError::validation(
                "Please enter a customer name to continue",
            ));
        }

        let customer = self.insert_with_fresh_ids(name)?;
        log::info!(
            "Added customer {} ({}) as {}",
            customer.name,
            customer.id,
            customer.sequence_label()
        );
        self.notifier.customer_added(&customer);

        let message = format!("Added customer: {} ({})", customer.name, customer.sequence_label());
        let refreshed = self
            .repo
            .list_all()
            .and_then(|rows| self.view(rows, Status::new(StatusLevel::Success, message.clone())));

        // The record is committed at this point; a failed refresh only affects the view.
        let view = refreshed.unwrap_or_else(|err| {
            log::error!("Customer {} saved but the list could not be reloaded: {}", customer.id, err);
            DeskView {
                rows: vec![customer.clone()],
                summary: Summary::default(),
                status: Status::new(
                    StatusLevel::Error,
                    format!("{message}, but the list could not be reloaded: {err}"),
                ),
            }
        });
        Ok(Added { customer, view })
    }

    fn insert_with_fresh_ids(&self, name: &str) -> Result<CustomerRecord, StoreError> {
        let mut attempt = 1;
        loop {
            match self.repo.insert_customer(name) {
                Err(StoreError::DuplicateKey(id)) if attempt < MAX_ID_ATTEMPTS => {
                    log::warn!(
                        "Customer ID {} already taken (attempt {}), generating another",
                        id,
                        attempt
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Every customer, most recent first.
    pub fn show_all(&self) -> Result<DeskView, StoreError> {
        let rows = self.repo.list_all()?;
        let status = Status::new(
            StatusLevel::Success,
            format!("Loaded {} customers", rows.len()),
        );
        self.view(rows, status)
    }

    /// Today's customers in queue order.
    pub fn show_today(&self) -> Result<DeskView, StoreError> {
        let rows = self.repo.list_for_date(self.repo.today())?;
        let status = if rows.is_empty() {
            Status::new(StatusLevel::Info, "No customers added today yet.")
        } else {
            Status::new(
                StatusLevel::Success,
                format!("Loaded {} customers for today", rows.len()),
            )
        };
        self.view(rows, status)
    }

    /// Search by any combination of name part, id part and daily number.
    pub fn search(&self, name: &str, id: &str, sequence: &str) -> Result<DeskView, StoreError> {
        let criteria = SearchCriteria {
            name_part: non_empty(name),
            id_part: non_empty(id),
            exact_sequence: non_empty(sequence),
        };
        if criteria.is_empty() {
            return Err(StoreError::validation(
                "Please enter at least one search criteria",
            ));
        }

        let rows = self.repo.search(&criteria)?;
        let status = if rows.is_empty() {
            Status::new(StatusLevel::Warning, "No customers found")
        } else {
            Status::new(
                StatusLevel::Success,
                format!("Found {} customer(s)", rows.len()),
            )
        };
        self.view(rows, status)
    }

    pub fn summary(&self) -> Result<Summary, StoreError> {
        Ok(Summary {
            total: self.repo.count_all()?,
            today: self.repo.count_for_date(self.repo.today())?,
        })
    }

    fn view(&self, rows: Vec<CustomerRecord>, status: Status) -> Result<DeskView, StoreError> {
        Ok(DeskView {
            rows,
            summary: self.summary()?,
            status,
        })
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
