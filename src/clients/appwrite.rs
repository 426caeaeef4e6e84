use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::config::BackendConfig;
use crate::constants::USER_AGENT;
use crate::domain::{Document, DocumentId, Identity, SearchEvent};
use crate::store::{DocumentQuery, Permission, RemoteStore, StoreError};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const FALLBACK_COOKIES_HEADER: &str = "X-Fallback-Cookies";

#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "$id")]
    id: String,
    #[serde(flatten)]
    event: SearchEvent,
}

impl RawDocument {
    /// Decodes one listed document, skipping it with a warning when its
    /// attributes do not form a search event.
    fn parse(value: serde_json::Value) -> Option<Document> {
        let id = value
            .get("$id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();

        match serde_json::from_value::<Self>(value) {
            Ok(raw) => Some(raw.into()),
            Err(e) => {
                warn!(document_id = %id, error = %e, "Skipping malformed search document");
                None
            }
        }
    }
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        Self {
            id: raw.id,
            event: raw.event,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(rename = "total", default)]
    _total: u64,
    documents: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct CreateDocumentRequest<'a> {
    #[serde(rename = "documentId")]
    document_id: &'a str,
    data: &'a SearchEvent,
    permissions: Vec<String>,
}

/// REST client for an Appwrite-compatible backend.
///
/// The session cookie lives in the client's cookie jar; when the service
/// answers with fallback cookies (non-browser clients) they are replayed as a
/// header on later requests.
#[derive(Debug)]
pub struct AppwriteClient {
    client: Client,
    endpoint: String,
    project_id: String,
    fallback_cookies: RwLock<Option<String>>,
}

impl AppwriteClient {
    pub fn new(config: &BackendConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            fallback_cookies: RwLock::new(None),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn documents_url(&self, database_id: &str, collection_id: &str) -> String {
        format!(
            "{}/databases/{database_id}/collections/{collection_id}/documents",
            self.endpoint
        )
    }

    async fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(PROJECT_HEADER, &self.project_id);
        match self.fallback_cookies.read().await.as_deref() {
            Some(cookies) => request.header(FALLBACK_COOKIES_HEADER, cookies),
            None => request,
        }
    }

    async fn remember_fallback_cookies(&self, response: &Response) {
        let cookies = response
            .headers()
            .get(FALLBACK_COOKIES_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty() && *v != "[]");

        if let Some(cookies) = cookies {
            debug!("Stored fallback session cookies");
            *self.fallback_cookies.write().await = Some(cookies.to_string());
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(error_for_status(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        let truncated: String = body.chars().take(500).collect();
        debug!(error = %e, response = %truncated, "Failed to parse remote store response");
        StoreError::Decode(e.to_string())
    })
}

/// Maps a non-success response to a [`StoreError`], preferring the service's
/// own error message.
#[must_use]
pub fn error_for_status(status: StatusCode, body: &str) -> StoreError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(message),
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        _ => StoreError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl RemoteStore for AppwriteClient {
    fn backend_tag(&self) -> &'static str {
        "appwrite"
    }

    async fn current_identity(&self) -> Result<Identity, StoreError> {
        let url = format!("{}/account", self.endpoint);
        let response = self.prepare(self.client.get(&url)).await.send().await?;

        let account: AccountResponse = decode(response).await?;
        Ok(Identity {
            id: account.id,
            name: account.name.filter(|n| !n.is_empty()),
        })
    }

    async fn create_anonymous_identity(&self) -> Result<Identity, StoreError> {
        let url = format!("{}/account/sessions/anonymous", self.endpoint);
        let response = self
            .prepare(self.client.post(&url).json(&serde_json::json!({})))
            .await
            .send()
            .await?;

        self.remember_fallback_cookies(&response).await;

        let session: SessionResponse = decode(response).await?;
        debug!(user_id = %session.user_id, "Created anonymous session");
        Ok(Identity::new(session.user_id))
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &DocumentId,
        event: &SearchEvent,
        permissions: &[Permission],
    ) -> Result<Document, StoreError> {
        let url = self.documents_url(database_id, collection_id);
        let body = CreateDocumentRequest {
            document_id: document_id.as_str(),
            data: event,
            permissions: permissions.iter().map(ToString::to_string).collect(),
        };

        let response = self
            .prepare(self.client.post(&url).json(&body))
            .await
            .send()
            .await?;

        let raw: RawDocument = decode(response).await?;
        Ok(raw.into())
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let mut url = Url::parse(&self.documents_url(database_id, collection_id))
            .map_err(|e| StoreError::Transport(format!("Invalid endpoint URL: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            for q in query.to_query_strings() {
                pairs.append_pair("queries[]", &q);
            }
        }

        let response = self.prepare(self.client.get(url)).await.send().await?;

        let list: DocumentList = decode(response).await?;
        let listed = list.documents.len();
        let documents: Vec<Document> = list
            .documents
            .into_iter()
            .filter_map(RawDocument::parse)
            .collect();

        debug!(
            listed,
            decoded = documents.len(),
            endpoint = self.endpoint(),
            "Listed documents"
        );
        Ok(documents)
    }
}
