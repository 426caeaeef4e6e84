//! Domain types for movie search tracking.
//!
//! Newtype identifiers and the catalog-facing movie summary live here; the
//! persisted search event and the derived trending entry live in [`events`].

pub mod events;

pub use events::{SearchEvent, TrendingEntry};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Catalog identifier of a movie.
///
/// Wrapping the raw integer keeps movie ids from being mixed up with counts
/// or document ids.
///
/// # Examples
///
/// ```rust
/// use cinetrend::domain::MovieId;
///
/// let id = MovieId::new(603);
/// assert_eq!(id.value(), 603);
/// assert_eq!(id.to_string(), "603");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MovieId(i64);

impl MovieId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl From<MovieId> for i64 {
    fn from(id: MovieId) -> Self {
        id.0
    }
}

impl Serialize for MovieId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = i64::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// One movie as returned by the catalog search API.
///
/// This is the "top result" a search event snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub poster_path: Option<String>,

    /// Only numeric values survive deserialization; anything else is `None`.
    #[serde(default, deserialize_with = "numeric_or_none")]
    pub vote_average: Option<f64>,

    #[serde(default)]
    pub release_date: Option<String>,

    #[serde(default)]
    pub original_language: Option<String>,
}

impl MovieSummary {
    #[must_use]
    pub const fn new(id: MovieId) -> Self {
        Self {
            id,
            title: None,
            poster_path: None,
            vote_average: None,
            release_date: None,
            original_language: None,
        }
    }

    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }
}

/// Keeps a JSON number as `f64` and maps every other JSON value to `None`.
pub fn numeric_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

/// Identity the remote service reports for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Anonymous identities carry no display name.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name.as_deref().is_none_or(str::is_empty)
    }
}

/// Id to assign to a new remote document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentId {
    /// Ask the remote service to allocate one.
    Unique,
    Custom(String),
}

impl DocumentId {
    #[must_use]
    pub const fn unique() -> Self {
        Self::Unique
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unique => "unique()",
            Self::Custom(id) => id,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored search event together with the id the store gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub event: SearchEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn movie_summary_keeps_numeric_vote_average() {
        let movie: MovieSummary = serde_json::from_value(json!({
            "id": 5,
            "title": "Batman",
            "poster_path": "/x.jpg",
            "vote_average": 7.5
        }))
        .unwrap();

        assert_eq!(movie.id, MovieId::new(5));
        assert_eq!(movie.vote_average, Some(7.5));
    }

    #[test]
    fn movie_summary_drops_non_numeric_vote_average() {
        for raw in [json!("7.5"), json!(null), json!(true), json!([7.5])] {
            let movie: MovieSummary =
                serde_json::from_value(json!({ "id": 1, "vote_average": raw.clone() })).unwrap();
            assert_eq!(movie.vote_average, None, "input {raw}");
        }

        let movie: MovieSummary = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(movie.vote_average, None);
    }

    #[test]
    fn integer_vote_average_is_numeric() {
        let movie: MovieSummary =
            serde_json::from_value(json!({ "id": 1, "vote_average": 8 })).unwrap();
        assert_eq!(movie.vote_average, Some(8.0));
    }

    #[test]
    fn release_year_from_date() {
        let mut movie = MovieSummary::new(MovieId::new(1));
        assert_eq!(movie.release_year(), None);

        movie.release_date = Some("1989-06-23".to_string());
        assert_eq!(movie.release_year(), Some("1989"));

        movie.release_date = Some(String::new());
        assert_eq!(movie.release_year(), None);
    }

    #[test]
    fn unique_document_id_wire_form() {
        assert_eq!(DocumentId::unique().as_str(), "unique()");
        assert_eq!(DocumentId::Custom("abc".into()).to_string(), "abc");
    }

    #[test]
    fn identity_without_name_is_anonymous() {
        assert!(Identity::new("u1").is_anonymous());

        let named = Identity {
            id: "u2".into(),
            name: Some("Ana".into()),
        };
        assert!(!named.is_anonymous());
    }
}
