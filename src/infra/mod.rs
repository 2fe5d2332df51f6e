//! Infrastructure layer (adapters/implementations).
//!
//! This module contains IO-heavy integrations (SQLite, clock, speech, config files).

pub mod app_config;
pub mod clock;
pub mod db;
pub mod ids;
pub mod speech;
