//! Trending aggregation over a window of search events.

use std::collections::HashMap;

use crate::domain::{MovieId, SearchEvent, TrendingEntry};

/// Groups `events` by movie and returns the `limit` most searched movies.
///
/// `events` must already be in window order (newest first). Each entry keeps
/// the descriptive fields of the first event seen for its movie. Equal counts
/// keep first-seen order, so the most recently searched movie wins a tie.
/// Events without a movie id are ignored. A negative `limit` yields nothing.
#[must_use]
pub fn aggregate_trending(events: &[SearchEvent], limit: i64) -> Vec<TrendingEntry> {
    let Ok(limit) = usize::try_from(limit) else {
        return Vec::new();
    };

    let mut index: HashMap<MovieId, usize> = HashMap::new();
    let mut entries: Vec<TrendingEntry> = Vec::new();

    for event in events {
        let Some(movie_id) = event.movie_id else {
            continue;
        };

        if let Some(&i) = index.get(&movie_id) {
            entries[i].count += 1;
        } else {
            index.insert(movie_id, entries.len());
            entries.push(TrendingEntry::first_seen(movie_id, event));
        }
    }

    // sort_by is stable: ties stay in first-seen order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(limit);
    entries
}
