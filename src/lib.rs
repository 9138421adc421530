//! Single-user task tracker: a SQLite task table and the text menu that
//! drives it.

pub mod config;
pub mod error;
pub mod shell;
pub mod store;
pub mod task;
