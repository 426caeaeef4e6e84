//! Remote document store contract.
//!
//! The tracker only ever talks to the hosted backend through [`RemoteStore`],
//! so the HTTP client and the in-memory store are interchangeable.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::constants::trending::ORDER_FIELD;
use crate::domain::{Document, DocumentId, Identity, SearchEvent};

/// Failure categories for a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected by remote store (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl StoreError {
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Any,
    User(String),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// A single access grant attached to a created document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub action: Action,
    pub role: Role,
}

impl Permission {
    #[must_use]
    pub const fn new(action: Action, role: Role) -> Self {
        Self { action, role }
    }

    /// Grants for a search event: anyone may read it, only the owner may
    /// create, update or delete it.
    #[must_use]
    pub fn for_owner(owner: Option<&Identity>) -> Vec<Self> {
        let mut grants = vec![Self::new(Action::Read, Role::Any)];

        if let Some(identity) = owner {
            for action in [Action::Create, Action::Update, Action::Delete] {
                grants.push(Self::new(action, Role::User(identity.id.clone())));
            }
        }

        grants
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(\"{}\")", self.action.as_str(), self.role)
    }
}

/// Ordering and window for a document listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    pub order_desc: Option<String>,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    /// The most recent `limit` events, newest first.
    #[must_use]
    pub fn recent(limit: usize) -> Self {
        Self {
            order_desc: Some(ORDER_FIELD.to_string()),
            limit: Some(limit),
        }
    }

    /// Query strings in the remote service's JSON query syntax.
    #[must_use]
    pub fn to_query_strings(&self) -> Vec<String> {
        let mut queries = Vec::new();

        if let Some(field) = &self.order_desc {
            queries.push(
                serde_json::json!({ "method": "orderDesc", "attribute": field }).to_string(),
            );
        }

        if let Some(limit) = self.limit {
            queries.push(serde_json::json!({ "method": "limit", "values": [limit] }).to_string());
        }

        queries
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short label used in log fields.
    fn backend_tag(&self) -> &'static str;

    async fn current_identity(&self) -> Result<Identity, StoreError>;

    async fn create_anonymous_identity(&self) -> Result<Identity, StoreError>;

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &DocumentId,
        event: &SearchEvent,
        permissions: &[Permission],
    ) -> Result<Document, StoreError>;

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError>;
}
