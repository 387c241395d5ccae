// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: internal module structure

pub mod classifier;
pub mod removal;
pub mod sync;

pub use classifier::{
    ANNOUNCEMENT_ORG, Classified, MARKER_TAG, REQUIRED_SUFFIX, RESERVED_TAG, classify,
    validate_tag,
};
pub use removal::{RemovalDecision, plan_removal, remove_tag};
pub use sync::{
    FetchOutcome, SyncOptions, TagUpdateOutcome, UpdateReport, UpdateStatus, fetch_tag, update_all,
    update_tag,
};
