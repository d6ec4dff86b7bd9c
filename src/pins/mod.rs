//! In-memory quest pins and the bookkeeping of what has been pulled
pub mod cache;
pub mod fetched;
pub mod store;
