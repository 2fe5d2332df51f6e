//! Application layer (use-cases, policies).
//!
//! Orchestrates the customer store and the announcement side effect without
//! depending on how results are rendered.

pub mod desk;

pub use desk::{Added, Desk, DeskView, Status, StatusLevel};
