//! CLI module - Command-line interface for Cinetrend
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

use crate::constants::trending::DEFAULT_LIMIT;

/// Cinetrend - Movie search with trending tracking
#[derive(Parser)]
#[command(name = "cinetrend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search movies and record the search
    #[command(alias = "s")]
    Search {
        /// Search query; empty lists popular movies
        query: Vec<String>,
    },

    /// Show the most searched movies
    #[command(alias = "t")]
    Trending {
        /// Number of entries to show
        #[arg(default_value_t = DEFAULT_LIMIT, allow_negative_numbers = true)]
        limit: i64,
    },

    /// Check configuration and session bootstrap
    Check,

    /// Create default config file
    Init,
}

pub use commands::*;
