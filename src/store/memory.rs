use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::{DocumentQuery, Permission, RemoteStore, StoreError};
use crate::constants::trending::ORDER_FIELD;
use crate::domain::{Document, DocumentId, Identity, SearchEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub database_id: String,
    pub collection_id: String,
    pub document: Document,
    pub permissions: Vec<Permission>,
}

/// Process-local [`RemoteStore`] with call counters and failure injection.
#[derive(Default)]
pub struct MemoryStore {
    pub documents: Mutex<Vec<StoredDocument>>,
    pub session: Mutex<Option<Identity>>,
    pub identity_calls: AtomicU64,
    pub anonymous_calls: AtomicU64,
    pub create_calls: AtomicU64,
    pub list_calls: AtomicU64,
    pub fail_identity: bool,
    pub fail_anonymous: bool,
    pub fail_create: bool,
    pub fail_list: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an existing session for `identity`.
    #[must_use]
    pub fn with_session(identity: Identity) -> Self {
        Self {
            session: Mutex::new(Some(identity)),
            ..Self::default()
        }
    }

    /// Inserts events directly, bypassing permissions.
    pub async fn seed(&self, database_id: &str, collection_id: &str, events: Vec<SearchEvent>) {
        let mut documents = self.documents.lock().await;
        for event in events {
            let id = format!("seed-{}", documents.len());
            documents.push(StoredDocument {
                database_id: database_id.to_string(),
                collection_id: collection_id.to_string(),
                document: Document { id, event },
                permissions: Vec::new(),
            });
        }
    }

    pub async fn stored(&self) -> Vec<StoredDocument> {
        self.documents.lock().await.clone()
    }

    fn injected(operation: &str) -> StoreError {
        StoreError::Transport(format!("injected {operation} failure"))
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn current_identity(&self) -> Result<Identity, StoreError> {
        self.identity_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_identity {
            return Err(Self::injected("identity"));
        }

        self.session
            .lock()
            .await
            .clone()
            .ok_or_else(|| StoreError::Unauthorized("no active session".to_string()))
    }

    async fn create_anonymous_identity(&self) -> Result<Identity, StoreError> {
        let n = self.anonymous_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_anonymous {
            return Err(Self::injected("anonymous session"));
        }

        let identity = Identity::new(format!("anon-{n}"));
        *self.session.lock().await = Some(identity.clone());
        Ok(identity)
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &DocumentId,
        event: &SearchEvent,
        permissions: &[Permission],
    ) -> Result<Document, StoreError> {
        let n = self.create_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_create {
            return Err(Self::injected("create"));
        }

        let id = match document_id {
            DocumentId::Unique => format!("doc-{n}"),
            DocumentId::Custom(id) => id.clone(),
        };

        let mut documents = self.documents.lock().await;
        if documents.iter().any(|d| d.document.id == id) {
            return Err(StoreError::Rejected {
                status: 409,
                message: format!("Document with the requested ID '{id}' already exists"),
            });
        }

        let document = Document {
            id,
            event: event.clone(),
        };
        documents.push(StoredDocument {
            database_id: database_id.to_string(),
            collection_id: collection_id.to_string(),
            document: document.clone(),
            permissions: permissions.to_vec(),
        });

        Ok(document)
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_list {
            return Err(Self::injected("list"));
        }

        // Newest insertion first so equal timestamps still list most recent first.
        let mut documents: Vec<Document> = self
            .documents
            .lock()
            .await
            .iter()
            .rev()
            .filter(|d| d.database_id == database_id && d.collection_id == collection_id)
            .map(|d| d.document.clone())
            .collect();

        match query.order_desc.as_deref() {
            None => documents.reverse(),
            Some(ORDER_FIELD) => {
                documents.sort_by(|a, b| b.event.created_at.cmp(&a.event.created_at));
            }
            Some(other) => {
                return Err(StoreError::Rejected {
                    status: 400,
                    message: format!("Attribute not found in schema: {other}"),
                });
            }
        }

        if let Some(limit) = query.limit {
            documents.truncate(limit);
        }

        Ok(documents)
    }
}
