//! Scan record history persistence.

pub mod store;

pub use store::{FileHistoryStore, HistoryError};
