//! Remote-store implementation of the `TrackingService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::appwrite::AppwriteClient;
use crate::config::BackendConfig;
use crate::constants::trending::WINDOW;
use crate::domain::{Document, DocumentId, MovieSummary, SearchEvent, TrendingEntry};
use crate::services::tracking_service::{SessionOutcome, TrackError, TrackingService};
use crate::services::trending::aggregate_trending;
use crate::store::{DocumentQuery, Permission, RemoteStore};

/// Where search events live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub database_id: String,
    pub collection_id: String,
}

impl CollectionRef {
    #[must_use]
    pub fn new(database_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            collection_id: collection_id.into(),
        }
    }
}

/// The tracker's capability: either no remote client at all, or a client
/// that may still lack a collection to write to.
#[derive(Clone)]
pub enum Backend {
    Disabled,
    Enabled {
        store: Arc<dyn RemoteStore>,
        collection: Result<CollectionRef, Vec<&'static str>>,
    },
}

pub struct SearchTracker {
    backend: Backend,
}

impl SearchTracker {
    #[must_use]
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(Backend::Disabled)
    }

    #[must_use]
    pub fn with_store(store: Arc<dyn RemoteStore>, collection: CollectionRef) -> Self {
        Self::new(Backend::Enabled {
            store,
            collection: Ok(collection),
        })
    }

    /// Builds a tracker from configuration. Endpoint and project id are
    /// enough for a client; database and collection ids gate reads and writes.
    #[must_use]
    pub fn from_config(config: &BackendConfig) -> Self {
        if !config.has_client() {
            info!("Search tracking disabled: backend endpoint or project id not set");
            return Self::disabled();
        }

        let client = match AppwriteClient::new(config) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Failed to build remote store client, tracking disabled");
                return Self::disabled();
            }
        };

        let collection = if config.has_collection() {
            Ok(CollectionRef::new(&config.database_id, &config.collection_id))
        } else {
            Err(config.missing_collection_fields())
        };

        Self::new(Backend::Enabled {
            store: Arc::new(client),
            collection,
        })
    }

    fn target(&self, operation: &str) -> Result<(&dyn RemoteStore, &CollectionRef), TrackError> {
        match &self.backend {
            Backend::Disabled => {
                debug!(operation, "Skipping, tracking disabled");
                Err(TrackError::Disabled)
            }
            Backend::Enabled {
                collection: Err(missing),
                ..
            } => {
                warn!(operation, missing = ?missing, "Skipping, collection not configured");
                Err(TrackError::NotConfigured(missing.clone()))
            }
            Backend::Enabled {
                store,
                collection: Ok(collection),
            } => Ok((store.as_ref(), collection)),
        }
    }
}

#[async_trait]
impl TrackingService for SearchTracker {
    fn is_enabled(&self) -> bool {
        matches!(self.backend, Backend::Enabled { .. })
    }

    async fn ensure_session(&self) -> SessionOutcome {
        let Backend::Enabled { store, .. } = &self.backend else {
            return SessionOutcome::Disabled;
        };

        match store.current_identity().await {
            Ok(identity) => {
                debug!(user_id = %identity.id, "Reusing existing session");
                return SessionOutcome::Existing(identity);
            }
            Err(e) if e.is_auth() => {
                debug!(error = %e, "No active session, creating anonymous one");
            }
            Err(e) => {
                warn!(error = %e, backend = store.backend_tag(), "Session lookup failed, creating anonymous one");
            }
        }

        match store.create_anonymous_identity().await {
            Ok(identity) => {
                info!(user_id = %identity.id, backend = store.backend_tag(), "Anonymous session created");
                SessionOutcome::Created(identity)
            }
            Err(e) => {
                warn!(error = %e, backend = store.backend_tag(), "Failed to create anonymous session");
                SessionOutcome::Unavailable(e)
            }
        }
    }

    async fn record_search(
        &self,
        search_term: &str,
        top_result: Option<&MovieSummary>,
    ) -> Result<Document, TrackError> {
        let (store, collection) = self.target("record_search")?;

        let session = self.ensure_session().await;
        let event = SearchEvent::new(search_term, top_result);
        let permissions = Permission::for_owner(session.identity());

        match store
            .create_document(
                &collection.database_id,
                &collection.collection_id,
                &DocumentId::unique(),
                &event,
                &permissions,
            )
            .await
        {
            Ok(document) => {
                debug!(
                    document_id = %document.id,
                    search_term,
                    movie_id = ?event.movie_id,
                    "Search recorded"
                );
                Ok(document)
            }
            Err(e) => {
                warn!(error = %e, search_term, backend = store.backend_tag(), "Failed to record search");
                Err(e.into())
            }
        }
    }

    async fn trending(&self, limit: i64) -> Result<Vec<TrendingEntry>, TrackError> {
        let (store, collection) = self.target("trending")?;

        let documents = store
            .list_documents(
                &collection.database_id,
                &collection.collection_id,
                &DocumentQuery::recent(WINDOW),
            )
            .await
            .map_err(|e| {
                warn!(error = %e, backend = store.backend_tag(), "Failed to fetch trending window");
                TrackError::from(e)
            })?;

        let events: Vec<SearchEvent> = documents.into_iter().map(|d| d.event).collect();
        let trending = aggregate_trending(&events, limit);

        debug!(
            window = events.len(),
            entries = trending.len(),
            "Computed trending"
        );
        Ok(trending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_without_client_values_is_disabled() {
        let tracker = SearchTracker::from_config(&BackendConfig::default());
        assert!(!tracker.is_enabled());
    }

    #[test]
    fn from_config_with_client_values_is_enabled() {
        let config = BackendConfig {
            endpoint: "https://cloud.example.io/v1".to_string(),
            project_id: "proj".to_string(),
            ..BackendConfig::default()
        };

        let tracker = SearchTracker::from_config(&config);
        assert!(tracker.is_enabled());
        assert_eq!(
            tracker.target("test").err(),
            Some(TrackError::NotConfigured(vec!["database_id", "collection_id"]))
        );
    }
}
