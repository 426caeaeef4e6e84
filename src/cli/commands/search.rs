use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::constants::limits::MAX_SEARCH_RESULTS;
use crate::services::{SearchTracker, TrackingService};

pub async fn cmd_search_movies(config: &Config, query: &str) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        println!("Popular movies:");
    } else {
        println!("Searching for: {query}");
    }

    let tmdb = TmdbClient::new(&config.tmdb);
    let results = tmdb.search_movies(query).await?;

    if !query.trim().is_empty() {
        let tracker = SearchTracker::from_config(&config.backend);
        match tracker.record_search(query.trim(), results.first()).await {
            Err(e) if !e.is_config() => println!("(search not recorded: {e})"),
            _ => {}
        }
    }

    if results.is_empty() {
        println!("No movies found matching '{query}'");
        return Ok(());
    }

    println!();
    println!("{:-<60}", "");

    for movie in results.iter().take(MAX_SEARCH_RESULTS) {
        let title = movie.title.as_deref().unwrap_or("Untitled");
        let year = movie.release_year().unwrap_or("????");
        let rating = movie
            .vote_average
            .map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"));
        let language = movie.original_language.as_deref().unwrap_or("?");

        println!("• {title} ({year})");
        println!("  Rating: {rating} | Language: {language} | ID: {}", movie.id);
    }

    println!();
    println!("See what others search for: cinetrend trending");

    Ok(())
}
