//! State behind the browser front end: the request builder, the response
//! viewer and the sidebar. Everything talks to the server through
//! [`ApiClient`].

pub mod draft;
pub mod sidebar;
pub mod viewer;

pub use draft::{DraftError, KeyValueRow, RequestDraft, RowEdit, RowList};
pub use sidebar::{CollectionNode, Sidebar};
pub use viewer::{
    body_kind, clipboard_text, header_rows, render_body, status_tone, summary_line, BodyKind,
    StatusTone, ViewMode,
};

use crate::client::{send_direct, ApiClient, ClientError};
use crate::proxy::ResponseEnvelope;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UiError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("{0} not found")]
    NotFound(&'static str),
}

pub type Result<T> = std::result::Result<T, UiError>;

/// Sends the draft through the server proxy.
pub async fn send(client: &ApiClient, draft: &RequestDraft) -> Result<ResponseEnvelope> {
    let request = draft.to_proxy_request()?;
    Ok(client.proxy(&request).await?)
}

/// Sends the draft straight to the target, bypassing the proxy.
pub async fn send_without_proxy(
    http: &reqwest::Client,
    draft: &RequestDraft,
    timeout_ms: Option<u64>,
) -> Result<ResponseEnvelope> {
    let request = draft.to_direct_request(timeout_ms)?;
    Ok(send_direct(http, request).await?)
}

/// Sends through the proxy and records the outcome in the sidebar history.
pub async fn send_and_record(
    client: &ApiClient,
    sidebar: &mut Sidebar,
    draft: &RequestDraft,
) -> Result<ResponseEnvelope> {
    let response = send(client, draft).await?;
    sidebar.record(client, draft, &response).await?;
    Ok(response)
}
