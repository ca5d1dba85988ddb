//! Collections tree and history list, kept in sync with the server.

use super::draft::RequestDraft;
use super::{Result, UiError};
use crate::client::ApiClient;
use crate::proxy::ResponseEnvelope;
use crate::store::{Collection, HistoryEntry, NewCollection, SavedRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionNode {
    pub collection: Collection,
    pub requests: Vec<SavedRequest>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sidebar {
    pub collections: Vec<CollectionNode>,
    pub history: Vec<HistoryEntry>,
}

impl Sidebar {
    pub async fn load(client: &ApiClient) -> Result<Self> {
        let mut sidebar = Self::default();
        sidebar.refresh(client).await?;
        Ok(sidebar)
    }

    /// Reloads collections with their requests, then the history.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<()> {
        let mut collections = Vec::new();
        for collection in client.list_collections().await? {
            let requests = client.list_requests(&collection.id).await?;
            collections.push(CollectionNode {
                collection,
                requests,
            });
        }
        self.collections = collections;
        self.history = client.list_history().await?;
        tracing::debug!(
            collections = self.collections.len(),
            history = self.history.len(),
            "Sidebar refreshed"
        );
        Ok(())
    }

    pub async fn create_collection(
        &mut self,
        client: &ApiClient,
        name: &str,
        description: Option<String>,
    ) -> Result<Collection> {
        let created = client
            .create_collection(&NewCollection {
                name: name.to_string(),
                description,
            })
            .await?;
        self.refresh(client).await?;
        Ok(created)
    }

    pub async fn delete_collection(&mut self, client: &ApiClient, id: &str) -> Result<()> {
        client.delete_collection(id).await?;
        self.refresh(client).await
    }

    pub async fn save_request(
        &mut self,
        client: &ApiClient,
        draft: &RequestDraft,
        name: &str,
        collection_id: Option<String>,
    ) -> Result<SavedRequest> {
        let saved = client
            .create_request(&draft.to_new_request(name, collection_id))
            .await?;
        self.refresh(client).await?;
        Ok(saved)
    }

    pub async fn delete_request(&mut self, client: &ApiClient, id: &str) -> Result<()> {
        client.delete_request(id).await?;
        self.refresh(client).await
    }

    /// Stores the outcome of a sent draft, then reloads the sidebar.
    pub async fn record(
        &mut self,
        client: &ApiClient,
        draft: &RequestDraft,
        response: &ResponseEnvelope,
    ) -> Result<HistoryEntry> {
        let entry = client.add_history(&draft.history_record(response)).await?;
        self.refresh(client).await?;
        Ok(entry)
    }

    pub async fn clear_history(&mut self, client: &ApiClient) -> Result<()> {
        client.clear_history().await?;
        self.history.clear();
        Ok(())
    }

    pub fn find_request(&self, id: &str) -> Option<&SavedRequest> {
        self.collections
            .iter()
            .flat_map(|node| node.requests.iter())
            .find(|request| request.id == id)
    }

    /// Loads a saved request into a fresh draft.
    pub fn select_request(&self, id: &str) -> Result<RequestDraft> {
        self.find_request(id)
            .map(RequestDraft::from_saved)
            .ok_or(UiError::NotFound("Request"))
    }

    pub fn select_history(&self, id: &str) -> Result<RequestDraft> {
        let entry = self
            .history
            .iter()
            .find(|entry| entry.id == id)
            .ok_or(UiError::NotFound("History entry"))?;
        Ok(RequestDraft::from_history(entry)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HttpMethod, StringMap};
    use chrono::Utc;

    fn sidebar() -> Sidebar {
        let mut params = StringMap::new();
        params.insert("q".to_string(), "x".to_string());
        let request = SavedRequest {
            id: "r1".to_string(),
            collection_id: Some("c1".to_string()),
            name: "search".to_string(),
            method: HttpMethod::Post,
            url: "https://x.test/search".to_string(),
            headers: StringMap::new(),
            params: params.clone(),
            body: Some("{}".to_string()),
            created_at: Utc::now(),
        };
        let history = HistoryEntry {
            id: "h1".to_string(),
            method: "DELETE".to_string(),
            url: "https://x.test/items/1".to_string(),
            headers: StringMap::new(),
            params,
            body: None,
            response_status: Some("204".to_string()),
            response_time: Some("3ms".to_string()),
            response_size: Some("0 bytes".to_string()),
            response_body: Some(String::new()),
            created_at: Utc::now(),
        };
        Sidebar {
            collections: vec![CollectionNode {
                collection: Collection {
                    id: "c1".to_string(),
                    name: "Search".to_string(),
                    description: None,
                    created_at: Utc::now(),
                },
                requests: vec![request],
            }],
            history: vec![history],
        }
    }

    #[test]
    fn test_select_request_builds_draft() {
        let draft = sidebar().select_request("r1").unwrap();
        assert_eq!(draft.method, HttpMethod::Post);
        assert_eq!(draft.final_url(), "https://x.test/search?q=x");
        assert_eq!(draft.body, "{}");
    }

    #[test]
    fn test_select_history_builds_draft() {
        let draft = sidebar().select_history("h1").unwrap();
        assert_eq!(draft.method, HttpMethod::Delete);
        assert_eq!(draft.final_url(), "https://x.test/items/1?q=x");
        assert!(draft.body.is_empty());
    }

    #[test]
    fn test_select_unknown_ids() {
        let sidebar = sidebar();
        assert!(matches!(
            sidebar.select_request("nope"),
            Err(UiError::NotFound("Request"))
        ));
        assert!(matches!(
            sidebar.select_history("nope"),
            Err(UiError::NotFound("History entry"))
        ));
    }
}
