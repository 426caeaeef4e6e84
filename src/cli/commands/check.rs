use crate::config::Config;
use crate::services::{SearchTracker, SessionOutcome, TrackingService};

pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    config.validate()?;

    if config.backend.validate() {
        println!("✓ Backend configuration complete");
    } else {
        println!("✗ Backend configuration incomplete");
        for name in config.backend.missing_fields() {
            println!("  missing: {name}");
        }
    }

    if config.tmdb.api_key.is_empty() {
        println!("✗ TMDB API key not set");
    } else {
        println!("✓ TMDB API key set");
    }

    let tracker = SearchTracker::from_config(&config.backend);
    match tracker.ensure_session().await {
        SessionOutcome::Disabled => println!("• Session: tracking disabled"),
        SessionOutcome::Existing(identity) => {
            let kind = if identity.is_anonymous() {
                "anonymous"
            } else {
                "named"
            };
            println!("✓ Session: reusing {kind} identity {}", identity.id);
        }
        SessionOutcome::Created(identity) => {
            println!("✓ Session: created anonymous identity {}", identity.id);
        }
        SessionOutcome::Unavailable(e) => println!("✗ Session unavailable: {e}"),
    }

    Ok(())
}
