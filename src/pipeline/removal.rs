// file: src/pipeline/removal.rs
// description: removal planning and execution for stored tag data
// reference: decision logic kept free of prompting so callers own the UI

use crate::error::Result;
use crate::storage::DataStore;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalDecision {
    /// Tag is tracked and the caller confirmed; go ahead and delete.
    Proceed,
    /// Tag has no stored data, so there is nothing to remove.
    NotTracked,
    /// Caller did not confirm; leave everything in place.
    Declined,
}

/// Decides what a removal request should do. Tracking is checked before
/// confirmation, so an unknown tag reports `NotTracked` regardless of
/// the confirmation flag.
pub fn plan_removal(available: &[String], selection: &str, confirmed: bool) -> RemovalDecision {
    if !available.iter().any(|tag| tag == selection) {
        return RemovalDecision::NotTracked;
    }
    if !confirmed {
        return RemovalDecision::Declined;
    }
    RemovalDecision::Proceed
}

/// Deletes a tag's documents after snapshotting them into the backup
/// directory, then prunes the tag index.
pub async fn remove_tag(store: &DataStore, tag: &str) -> Result<()> {
    if let Some(path) = store.backup(tag).await? {
        info!("Backed up {} to {}", tag, path.display());
    }
    store.remove(tag).await?;
    store.index_remove(tag).await?;
    info!("Removed stored data for tag: {}", tag);
    Ok(())
}
