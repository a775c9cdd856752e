//! SQLite-backed sample store

mod sqlite_store;

pub use sqlite_store::{DbPool, SqliteSampleStore};
