// file: src/api/mod.rs
// description: Forem API access module exports
// reference: internal module structure

pub mod client;

pub use client::{ArticleSource, ForemClient, fetch_all_articles};
