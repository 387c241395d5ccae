// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod article;
pub mod dataset;

pub use article::{Article, ArticleOrganization, ArticleUser};
pub use dataset::TagDataset;
