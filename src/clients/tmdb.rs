use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::TmdbConfig;
use crate::constants::USER_AGENT;
use crate::domain::MovieSummary;

#[derive(Debug, Deserialize)]
struct PagedResponse {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status_message: String,
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    #[must_use]
    pub fn new(config: &TmdbConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Searches by title; a blank query falls back to the popular list.
    pub async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return self.discover_popular().await;
        }

        let mut url = Url::parse(&format!("{}/search/movie", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("include_adult", "false");

        debug!("Searching TMDB for '{}'", query);
        self.fetch(url).await
    }

    pub async fn discover_popular(&self) -> Result<Vec<MovieSummary>> {
        let mut url = Url::parse(&format!("{}/discover/movie", self.base_url))?;
        url.query_pairs_mut().append_pair("sort_by", "popularity.desc");

        debug!("Fetching popular movies from TMDB");
        self.fetch(url).await
    }

    async fn fetch(&self, url: Url) -> Result<Vec<MovieSummary>> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .context("Failed to connect to TMDB")?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<StatusBody>(&body)
                .map_or(body, |b| b.status_message);
            bail!("TMDB request failed: status={status}, message={message}");
        }

        let page: PagedResponse =
            serde_json::from_str(&body).context("Failed to parse TMDB response")?;
        Ok(page.results)
    }
}
