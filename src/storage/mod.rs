// file: src/storage/mod.rs
// description: persistence module exports
// reference: internal module structure

pub mod store;

pub use store::{DataStore, INDEX_FILE, REFRESH_MARKER};
