use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MovieId, MovieSummary};

/// One recorded search, as persisted in the remote collection.
///
/// Field names follow the collection's camelCase attribute names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    pub search_term: String,

    #[serde(default)]
    pub movie_id: Option<MovieId>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub poster_path: Option<String>,

    #[serde(default)]
    pub vote_average: Option<f64>,

    pub created_at: DateTime<Utc>,
}

impl SearchEvent {
    /// Builds an event stamped with the current time.
    #[must_use]
    pub fn new(search_term: &str, top_result: Option<&MovieSummary>) -> Self {
        Self::at(search_term, top_result, Utc::now())
    }

    #[must_use]
    pub fn at(
        search_term: &str,
        top_result: Option<&MovieSummary>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            search_term: search_term.to_string(),
            movie_id: top_result.map(|m| m.id),
            title: top_result.and_then(|m| m.title.clone()),
            poster_path: top_result.and_then(|m| m.poster_path.clone()),
            vote_average: top_result
                .and_then(|m| m.vote_average)
                .filter(|v| v.is_finite()),
            created_at,
        }
    }
}

/// A movie's popularity within the trending window. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingEntry {
    pub movie_id: MovieId,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub count: u32,
}

impl TrendingEntry {
    /// Starts a group from the first event seen for a movie.
    #[must_use]
    pub fn first_seen(movie_id: MovieId, event: &SearchEvent) -> Self {
        Self {
            movie_id,
            title: event.title.clone(),
            poster_path: event.poster_path.clone(),
            vote_average: event.vote_average,
            count: 1,
        }
    }
}
