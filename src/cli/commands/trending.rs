use crate::config::Config;
use crate::services::{SearchTracker, TrackingService};

pub async fn cmd_trending(config: &Config, limit: i64) -> anyhow::Result<()> {
    let tracker = SearchTracker::from_config(&config.backend);
    let trending = tracker.trending(limit).await.unwrap_or_default();

    if trending.is_empty() {
        println!("No trending movies yet.");
        return Ok(());
    }

    println!("Trending Movies (top {}):", trending.len());
    println!("{:-<60}", "");

    for (rank, entry) in trending.iter().enumerate() {
        let title = entry.title.as_deref().unwrap_or("Untitled");
        let searches = if entry.count == 1 { "search" } else { "searches" };
        println!("{:>2}. {} - {} {}", rank + 1, title, entry.count, searches);
        if let Some(rating) = entry.vote_average {
            println!("    Rating: {rating:.1} | ID: {}", entry.movie_id);
        } else {
            println!("    ID: {}", entry.movie_id);
        }
    }

    Ok(())
}
