//! Durable storage backend on SQLite.
//!
//! Records are kept as JSON documents in a single `records` table keyed by
//! `(store, key)`. The autoincrement `seq` column preserves insertion order.

use super::{
    sort_history, Collection, HistoryEntry, NewCollection, NewHistoryEntry, NewRequest,
    RequestPatch, Result, SavedRequest, Storage, StoreError,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const COLLECTIONS: &str = "collections";
const REQUESTS: &str = "requests";
const HISTORY: &str = "history";

/// SQLite-backed [`Storage`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    /// A private database that disappears with the store.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                store TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                UNIQUE (store, key)
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_store ON records(store)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Backend(format!("Lock error: {}", e)))
    }
}

fn insert<T: Serialize>(conn: &Connection, store: &str, key: &str, record: &T) -> Result<()> {
    let value = serde_json::to_string(record)?;
    conn.execute(
        "INSERT INTO records (store, key, value) VALUES (?1, ?2, ?3)",
        params![store, key, value],
    )?;
    Ok(())
}

fn get<T: DeserializeOwned>(conn: &Connection, store: &str, key: &str) -> Result<Option<T>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM records WHERE store = ?1 AND key = ?2",
            params![store, key],
            |row| row.get(0),
        )
        .optional()?;

    Ok(match value {
        Some(value) => Some(serde_json::from_str(&value)?),
        None => None,
    })
}

/// Runs a `SELECT seq, value ...` query and decodes each row.
fn query<T: DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
) -> Result<Vec<(u64, T)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (seq, value) = row?;
        records.push((seq as u64, serde_json::from_str(&value)?));
    }
    Ok(records)
}

fn list<T: DeserializeOwned>(conn: &Connection, store: &str) -> Result<Vec<(u64, T)>> {
    query(
        conn,
        "SELECT seq, value FROM records WHERE store = ?1 ORDER BY seq",
        params![store],
    )
}

fn delete(conn: &Connection, store: &str, key: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM records WHERE store = ?1 AND key = ?2",
        params![store, key],
    )?;
    Ok(())
}

fn ensure_collection(conn: &Connection, collection_id: Option<&str>) -> Result<()> {
    let Some(id) = collection_id else {
        return Ok(());
    };
    let exists = conn
        .query_row(
            "SELECT 1 FROM records WHERE store = ?1 AND key = ?2",
            params![COLLECTIONS, id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if exists {
        Ok(())
    } else {
        Err(StoreError::MissingCollection(id.to_string()))
    }
}

fn strip_seq<T>(records: Vec<(u64, T)>) -> Vec<T> {
    records.into_iter().map(|(_, record)| record).collect()
}

impl Storage for SqliteStore {
    fn list_collections(&self) -> Result<Vec<Collection>> {
        Ok(strip_seq(list(&*self.lock()?, COLLECTIONS)?))
    }

    fn get_collection(&self, id: &str) -> Result<Option<Collection>> {
        get(&*self.lock()?, COLLECTIONS, id)
    }

    fn create_collection(&self, collection: NewCollection) -> Result<Collection> {
        let collection = Collection::from_new(collection);
        insert(&*self.lock()?, COLLECTIONS, &collection.id, &collection)?;
        Ok(collection)
    }

    fn delete_collection(&self, id: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        delete(&tx, COLLECTIONS, id)?;
        tx.execute(
            "DELETE FROM records WHERE store = ?1 AND json_extract(value, '$.collectionId') = ?2",
            params![REQUESTS, id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn list_requests_by_collection(&self, collection_id: &str) -> Result<Vec<SavedRequest>> {
        let records = query(
            &*self.lock()?,
            "SELECT seq, value FROM records \
             WHERE store = ?1 AND json_extract(value, '$.collectionId') = ?2 \
             ORDER BY seq",
            params![REQUESTS, collection_id],
        )?;
        Ok(strip_seq(records))
    }

    fn get_request(&self, id: &str) -> Result<Option<SavedRequest>> {
        get(&*self.lock()?, REQUESTS, id)
    }

    fn create_request(&self, request: NewRequest) -> Result<SavedRequest> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        ensure_collection(&tx, request.collection_id.as_deref())?;
        let request = SavedRequest::from_new(request);
        insert(&tx, REQUESTS, &request.id, &request)?;
        tx.commit()?;
        Ok(request)
    }

    fn update_request(&self, id: &str, patch: RequestPatch) -> Result<SavedRequest> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if let Some(collection_id) = &patch.collection_id {
            ensure_collection(&tx, collection_id.as_deref())?;
        }
        let mut request: SavedRequest =
            get(&tx, REQUESTS, id)?.ok_or_else(|| StoreError::NotFound {
                kind: "Request",
                id: id.to_string(),
            })?;
        patch.apply(&mut request);

        tx.execute(
            "UPDATE records SET value = ?3 WHERE store = ?1 AND key = ?2",
            params![REQUESTS, id, serde_json::to_string(&request)?],
        )?;
        tx.commit()?;
        Ok(request)
    }

    fn delete_request(&self, id: &str) -> Result<()> {
        delete(&*self.lock()?, REQUESTS, id)
    }

    fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        let mut entries = list(&*self.lock()?, HISTORY)?;
        sort_history(&mut entries);
        Ok(strip_seq(entries))
    }

    fn add_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry> {
        let entry = HistoryEntry::from_new(entry);
        insert(&*self.lock()?, HISTORY, &entry.id, &entry)?;
        Ok(entry)
    }

    fn clear_history(&self) -> Result<()> {
        self.lock()?
            .execute("DELETE FROM records WHERE store = ?1", params![HISTORY])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HttpMethod, StringMap};
    use tempfile::TempDir;

    fn new_request(collection_id: Option<&str>) -> NewRequest {
        let mut headers = StringMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        NewRequest {
            collection_id: collection_id.map(str::to_string),
            name: "request".to_string(),
            method: HttpMethod::Post,
            url: "https://api.example.com/items".to_string(),
            headers,
            params: StringMap::new(),
            body: Some("{\"a\":1}".to_string()),
        }
    }

    fn new_collection(name: &str) -> NewCollection {
        NewCollection {
            name: name.to_string(),
            description: Some("desc".to_string()),
        }
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");

        let created = {
            let store = SqliteStore::open(&path).unwrap();
            store.create_collection(new_collection("persisted")).unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.list_collections().unwrap(), vec![created]);
    }

    #[test]
    fn test_cascade_delete() {
        let store = SqliteStore::open_in_memory().unwrap();
        let doomed = store.create_collection(new_collection("doomed")).unwrap();
        let kept = store.create_collection(new_collection("kept")).unwrap();

        store.create_request(new_request(Some(&doomed.id))).unwrap();
        let other = store.create_request(new_request(Some(&kept.id))).unwrap();
        let unfiled = store.create_request(new_request(None)).unwrap();

        store.delete_collection(&doomed.id).unwrap();

        assert!(store.list_requests_by_collection(&doomed.id).unwrap().is_empty());
        assert_eq!(
            store.list_requests_by_collection(&kept.id).unwrap(),
            vec![other]
        );
        assert_eq!(store.get_request(&unfiled.id).unwrap(), Some(unfiled));
    }

    #[test]
    fn test_update_and_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let request = store.create_request(new_request(None)).unwrap();

        let updated = store
            .update_request(
                &request.id,
                RequestPatch {
                    url: Some("https://api.example.com/other".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.url, "https://api.example.com/other");
        assert_eq!(updated.headers, request.headers);
        assert_eq!(store.get_request(&request.id).unwrap(), Some(updated));

        let err = store
            .update_request("missing", RequestPatch::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_history_order_and_clear() {
        let store = SqliteStore::open_in_memory().unwrap();
        for status in ["200", "404"] {
            store
                .add_history(NewHistoryEntry {
                    method: "GET".to_string(),
                    url: "https://a.test".to_string(),
                    response_status: Some(status.to_string()),
                    ..Default::default()
                })
                .unwrap();
        }

        let history = store.list_history().unwrap();
        assert_eq!(history[0].response_status.as_deref(), Some("404"));
        assert_eq!(history[1].response_status.as_deref(), Some("200"));

        store.clear_history().unwrap();
        assert!(store.list_history().unwrap().is_empty());
    }

    #[test]
    fn test_idempotent_deletes() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.delete_collection("missing").unwrap();
        store.delete_request("missing").unwrap();
    }

    #[test]
    fn test_request_in_unknown_collection_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.create_request(new_request(Some("ghost"))).unwrap_err();
        assert!(matches!(err, StoreError::MissingCollection(id) if id == "ghost"));
        assert!(store.list_requests_by_collection("ghost").unwrap().is_empty());

        let existing = store.create_request(new_request(None)).unwrap();
        let err = store
            .update_request(
                &existing.id,
                RequestPatch {
                    collection_id: Some(Some("ghost".to_string())),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingCollection(_)));
        assert_eq!(store.get_request(&existing.id).unwrap(), Some(existing));
    }

    #[test]
    fn test_missing_record_reads_as_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_collection("missing").unwrap().is_none());
        assert!(store.get_request("missing").unwrap().is_none());
    }
}
