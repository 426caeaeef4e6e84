//! Domain service for search tracking and trending.
//!
//! Records one event per search action and aggregates recent events into a
//! trending list. Tracking is best effort: every failure is logged where it
//! happens and handed back as a [`TrackError`], never raised as a panic.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::{Document, Identity, MovieSummary, TrendingEntry};
use crate::store::StoreError;

/// Why a tracking call produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("Tracking disabled: no remote client configured")]
    Disabled,

    #[error("Tracking not configured: missing {}", .0.join(", "))]
    NotConfigured(Vec<&'static str>),

    #[error("Remote store error: {0}")]
    Remote(#[from] StoreError),
}

impl TrackError {
    /// True for configuration gaps, false for failed remote calls.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Disabled | Self::NotConfigured(_))
    }
}

/// Result of bootstrapping a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// No remote client; nothing was attempted.
    Disabled,

    /// A session already existed.
    Existing(Identity),

    /// A new anonymous session was created.
    Created(Identity),

    /// Lookup and anonymous creation both failed. Carries the creation error.
    Unavailable(StoreError),
}

impl SessionOutcome {
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Existing(identity) | Self::Created(identity) => Some(identity),
            Self::Disabled | Self::Unavailable(_) => None,
        }
    }
}

/// Domain service trait for search tracking.
#[async_trait::async_trait]
pub trait TrackingService: Send + Sync {
    /// Whether a remote client exists at all.
    fn is_enabled(&self) -> bool;

    /// Makes sure an identity exists, reusing the current session when valid.
    ///
    /// Never fails; see [`SessionOutcome`].
    async fn ensure_session(&self) -> SessionOutcome;

    /// Persists one search event, snapshotting `top_result` when present.
    ///
    /// Every call creates a new record, even for identical searches.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Disabled`] or [`TrackError::NotConfigured`] when
    /// the backend is not usable, [`TrackError::Remote`] if the write fails.
    async fn record_search(
        &self,
        search_term: &str,
        top_result: Option<&MovieSummary>,
    ) -> Result<Document, TrackError>;

    /// Top `limit` movies by search count over the most recent window.
    ///
    /// # Errors
    ///
    /// Same categories as [`TrackingService::record_search`]. Callers that
    /// only want a list use `unwrap_or_default()`.
    async fn trending(&self, limit: i64) -> Result<Vec<TrendingEntry>, TrackError>;
}

/// Records a search on a detached task. The outcome is only logged.
pub fn spawn_record_search(
    service: Arc<dyn TrackingService>,
    search_term: String,
    top_result: Option<MovieSummary>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Ok(document) = service
            .record_search(&search_term, top_result.as_ref())
            .await
        {
            debug!(document_id = %document.id, "Background search recorded");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_error_display() {
        let err = TrackError::NotConfigured(vec!["database_id", "collection_id"]);
        assert_eq!(
            err.to_string(),
            "Tracking not configured: missing database_id, collection_id"
        );
        assert!(err.is_config());

        let err = TrackError::from(StoreError::Transport("connection reset".into()));
        assert_eq!(
            err.to_string(),
            "Remote store error: Transport error: connection reset"
        );
        assert!(!err.is_config());
    }

    #[test]
    fn session_outcome_identity() {
        let identity = Identity::new("u1");
        assert_eq!(
            SessionOutcome::Created(identity.clone()).identity(),
            Some(&identity)
        );
        assert_eq!(SessionOutcome::Disabled.identity(), None);
        assert_eq!(
            SessionOutcome::Unavailable(StoreError::NotFound("x".into())).identity(),
            None
        );
    }
}
