pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod domain;
pub mod services;
pub mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, cmd_check, cmd_search_movies, cmd_trending};
pub use config::Config;
pub use services::{SearchTracker, TrackingService};

pub fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(&config);
    config.validate()?;

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search { query }) => cmd_search_movies(&config, &query.join(" ")).await,

        Some(Commands::Trending { limit }) => cmd_trending(&config, limit).await,

        Some(Commands::Check) => cmd_check(&config).await,

        Some(Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists.");
            }
            Ok(())
        }

        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
