//! Entity storage for collections, saved requests and history.
//!
//! The REST surface only talks to the [`Storage`] trait, so the in-memory
//! backend and the SQLite backend are interchangeable.

pub mod memory;
pub mod sqlite;
pub mod types;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A request names a collection that does not exist.
    #[error("Collection {0} does not exist")]
    MissingCollection(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Create/read/list/update/delete per entity kind.
///
/// Every method is a single atomic step; in particular
/// [`Storage::delete_collection`] removes the collection and its requests
/// before any other call can observe either.
pub trait Storage: Send + Sync {
    /// All collections in creation order.
    fn list_collections(&self) -> Result<Vec<Collection>>;

    fn get_collection(&self, id: &str) -> Result<Option<Collection>>;

    fn create_collection(&self, collection: NewCollection) -> Result<Collection>;

    /// Deletes the collection and every request filed under it. Missing ids
    /// are not an error.
    fn delete_collection(&self, id: &str) -> Result<()>;

    fn list_requests_by_collection(&self, collection_id: &str) -> Result<Vec<SavedRequest>>;

    fn get_request(&self, id: &str) -> Result<Option<SavedRequest>>;

    /// Fails with [`StoreError::MissingCollection`] when `collection_id`
    /// names no collection. The check and the insert are one step.
    fn create_request(&self, request: NewRequest) -> Result<SavedRequest>;

    /// Fails with [`StoreError::NotFound`] without mutating anything when
    /// the id is absent, and with [`StoreError::MissingCollection`] when the
    /// patch moves the request into a collection that does not exist.
    fn update_request(&self, id: &str, patch: RequestPatch) -> Result<SavedRequest>;

    fn delete_request(&self, id: &str) -> Result<()>;

    /// Newest first.
    fn list_history(&self) -> Result<Vec<HistoryEntry>>;

    fn add_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry>;

    fn clear_history(&self) -> Result<()>;
}

/// Orders history newest first. `seq` is the insertion sequence and breaks
/// ties between entries created within the same clock tick.
pub(crate) fn sort_history(entries: &mut [(u64, HistoryEntry)]) {
    entries.sort_by(|(a_seq, a), (b_seq, b)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b_seq.cmp(a_seq))
    });
}
