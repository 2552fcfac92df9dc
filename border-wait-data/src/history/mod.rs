//! SQLite persistence for recorded crossing history.
//!
//! - [`schema`] materialises the history table and its identity index.
//! - [`persistence`] implements [`border_wait_core::HistoryStore`] on top.
#![forbid(unsafe_code)]

mod persistence;
mod schema;

pub use persistence::{HistoryStoreError, SqliteHistoryStore};
pub use schema::{HistorySchemaError, SCHEMA_VERSION, initialise_schema};

#[cfg(test)]
mod tests;
