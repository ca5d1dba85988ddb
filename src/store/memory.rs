//! Process-local storage backend. Nothing survives a restart.

use super::{
    sort_history, Collection, HistoryEntry, NewCollection, NewHistoryEntry, NewRequest,
    RequestPatch, Result, SavedRequest, Storage, StoreError,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Rows of one entity kind keyed by id. Each row remembers its insertion
/// sequence so listings come back in creation order.
#[derive(Debug)]
struct Table<T> {
    rows: HashMap<String, (u64, T)>,
    next_seq: u64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            next_seq: 0,
        }
    }

    fn insert(&mut self, id: String, row: T) {
        self.next_seq += 1;
        self.rows.insert(id, (self.next_seq, row));
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.rows.get(id).map(|(_, row)| row)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.rows.get_mut(id).map(|(_, row)| row)
    }

    fn remove(&mut self, id: &str) {
        self.rows.remove(id);
    }

    fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.rows.retain(|_, (_, row)| keep(row));
    }

    fn clear(&mut self) {
        self.rows.clear();
    }

    fn sequenced(&self) -> Vec<(u64, T)> {
        let mut rows: Vec<(u64, T)> = self
            .rows
            .values()
            .map(|(seq, row)| (*seq, row.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows
    }

    fn ordered(&self) -> Vec<T> {
        self.sequenced().into_iter().map(|(_, row)| row).collect()
    }
}

#[derive(Debug)]
struct Tables {
    collections: Table<Collection>,
    requests: Table<SavedRequest>,
    history: Table<HistoryEntry>,
}

/// In-memory [`Storage`] backend.
///
/// All three tables sit behind one lock so that the collection cascade is a
/// single write.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                collections: Table::new(),
                requests: Table::new(),
                history: Table::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| StoreError::Backend(format!("Lock error: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| StoreError::Backend(format!("Lock error: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Tables {
    fn ensure_collection(&self, collection_id: Option<&str>) -> Result<()> {
        match collection_id {
            Some(id) if self.collections.get(id).is_none() => {
                Err(StoreError::MissingCollection(id.to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl Storage for MemoryStore {
    fn list_collections(&self) -> Result<Vec<Collection>> {
        Ok(self.read()?.collections.ordered())
    }

    fn get_collection(&self, id: &str) -> Result<Option<Collection>> {
        Ok(self.read()?.collections.get(id).cloned())
    }

    fn create_collection(&self, collection: NewCollection) -> Result<Collection> {
        let collection = Collection::from_new(collection);
        self.write()?
            .collections
            .insert(collection.id.clone(), collection.clone());
        Ok(collection)
    }

    fn delete_collection(&self, id: &str) -> Result<()> {
        let mut tables = self.write()?;
        tables.collections.remove(id);
        tables
            .requests
            .retain(|request| request.collection_id.as_deref() != Some(id));
        Ok(())
    }

    fn list_requests_by_collection(&self, collection_id: &str) -> Result<Vec<SavedRequest>> {
        Ok(self
            .read()?
            .requests
            .ordered()
            .into_iter()
            .filter(|request| request.collection_id.as_deref() == Some(collection_id))
            .collect())
    }

    fn get_request(&self, id: &str) -> Result<Option<SavedRequest>> {
        Ok(self.read()?.requests.get(id).cloned())
    }

    fn create_request(&self, request: NewRequest) -> Result<SavedRequest> {
        let mut tables = self.write()?;
        tables.ensure_collection(request.collection_id.as_deref())?;
        let request = SavedRequest::from_new(request);
        tables
            .requests
            .insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn update_request(&self, id: &str, patch: RequestPatch) -> Result<SavedRequest> {
        let mut tables = self.write()?;
        if let Some(collection_id) = &patch.collection_id {
            tables.ensure_collection(collection_id.as_deref())?;
        }
        let request = tables
            .requests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "Request",
                id: id.to_string(),
            })?;
        patch.apply(request);
        Ok(request.clone())
    }

    fn delete_request(&self, id: &str) -> Result<()> {
        self.write()?.requests.remove(id);
        Ok(())
    }

    fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.read()?.history.sequenced();
        sort_history(&mut entries);
        Ok(entries.into_iter().map(|(_, entry)| entry).collect())
    }

    fn add_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry> {
        let entry = HistoryEntry::from_new(entry);
        self.write()?.history.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    fn clear_history(&self) -> Result<()> {
        self.write()?.history.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HttpMethod, StringMap};

    fn new_request(collection_id: Option<&str>, name: &str) -> NewRequest {
        NewRequest {
            collection_id: collection_id.map(str::to_string),
            name: name.to_string(),
            method: HttpMethod::Get,
            url: "https://api.example.com".to_string(),
            headers: StringMap::new(),
            params: StringMap::new(),
            body: None,
        }
    }

    fn collection(store: &MemoryStore, name: &str) -> Collection {
        store
            .create_collection(NewCollection {
                name: name.to_string(),
                description: None,
            })
            .unwrap()
    }

    #[test]
    fn test_create_then_list_collection() {
        let store = MemoryStore::new();
        let created = collection(&store, "Users API");

        let listed = store.list_collections().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], created);
        assert!(!created.id.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let store = MemoryStore::new();
        let a = collection(&store, "a");
        let b = collection(&store, "b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_collections_list_in_creation_order() {
        let store = MemoryStore::new();
        for name in ["one", "two", "three"] {
            collection(&store, name);
        }
        let names: Vec<String> = store
            .list_collections()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_delete_collection_cascades_to_its_requests_only() {
        let store = MemoryStore::new();
        let doomed = collection(&store, "doomed");
        let kept = collection(&store, "kept");

        let gone = store
            .create_request(new_request(Some(&doomed.id), "gone"))
            .unwrap();
        let other = store
            .create_request(new_request(Some(&kept.id), "other"))
            .unwrap();
        let unfiled = store.create_request(new_request(None, "unfiled")).unwrap();

        store.delete_collection(&doomed.id).unwrap();

        assert!(store.get_collection(&doomed.id).unwrap().is_none());
        assert!(store.get_request(&gone.id).unwrap().is_none());
        assert_eq!(store.get_request(&other.id).unwrap(), Some(other));
        assert_eq!(store.get_request(&unfiled.id).unwrap(), Some(unfiled));
        assert_eq!(store.list_collections().unwrap(), vec![kept]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.delete_collection("missing").unwrap();
        store.delete_request("missing").unwrap();
    }

    #[test]
    fn test_update_missing_request_fails_without_mutation() {
        let store = MemoryStore::new();
        let existing = store.create_request(new_request(None, "keep")).unwrap();

        let patch = RequestPatch {
            name: Some("changed".to_string()),
            ..Default::default()
        };
        let err = store.update_request("missing", patch).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.get_request(&existing.id).unwrap(), Some(existing));
    }

    #[test]
    fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let existing = store.create_request(new_request(None, "before")).unwrap();

        let updated = store
            .update_request(
                &existing.id,
                RequestPatch {
                    method: Some(HttpMethod::Post),
                    body: Some(Some("{\"a\":1}".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.name, "before");
        assert_eq!(updated.method, HttpMethod::Post);
        assert_eq!(updated.created_at, existing.created_at);
        assert_eq!(store.get_request(&existing.id).unwrap(), Some(updated));
    }

    #[test]
    fn test_history_newest_first_and_clear() {
        let store = MemoryStore::new();
        for url in ["https://a.test", "https://b.test", "https://c.test"] {
            store
                .add_history(NewHistoryEntry {
                    method: "GET".to_string(),
                    url: url.to_string(),
                    ..Default::default()
                })
                .unwrap();
        }

        let history = store.list_history().unwrap();
        let urls: Vec<&str> = history.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, vec!["https://c.test", "https://b.test", "https://a.test"]);
        assert!(history
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));

        store.clear_history().unwrap();
        assert!(store.list_history().unwrap().is_empty());
    }

    #[test]
    fn test_requests_by_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        store.create_request(new_request(None, "unfiled")).unwrap();
        assert!(store.list_requests_by_collection("nope").unwrap().is_empty());
    }

    #[test]
    fn test_request_in_unknown_collection_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_request(new_request(Some("ghost"), "orphan"))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingCollection(id) if id == "ghost"));
        assert!(store.list_requests_by_collection("ghost").unwrap().is_empty());

        let existing = store.create_request(new_request(None, "unfiled")).unwrap();
        let patch = RequestPatch {
            collection_id: Some(Some("ghost".to_string())),
            ..Default::default()
        };
        let err = store.update_request(&existing.id, patch).unwrap_err();
        assert!(matches!(err, StoreError::MissingCollection(_)));
        assert_eq!(store.get_request(&existing.id).unwrap(), Some(existing));
    }

    #[test]
    fn test_request_cannot_land_in_deleted_collection() {
        let store = MemoryStore::new();
        let doomed = collection(&store, "doomed");
        store.delete_collection(&doomed.id).unwrap();

        let err = store
            .create_request(new_request(Some(&doomed.id), "late"))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingCollection(_)));
    }
}
