//! Terminal presentation: table rendering and the interactive shell.

pub mod shell;
pub mod table;
