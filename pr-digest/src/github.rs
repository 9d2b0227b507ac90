#![doc = "GitHub REST client: implements the core's PullRequestSource for merged-PR search, PR details and PR files."]
//
//! # GitHub integration
//!
//! - Construct [`GitHubClient`] from the resolved [`GitHubSettings`] (token, owner/repo, API URL).
//! - Search and file listing are page-wise (100 per page) with a fixed pause between pages;
//!   there is no retry. A non-2xx response fails the call with its status and body.
//! - See [`pr_digest_core::contract::PullRequestSource`] for the trait contract.

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use pr_digest_core::contract::{
    ClientError, MergeWindow, PullRequestDetails, PullRequestSource, RawFileChange,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::settings::GitHubSettings;

const PER_PAGE: usize = 100;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    number: u64,
}

pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    search_page_delay: Duration,
    files_page_delay: Duration,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("pr-digest"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.token))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        tracing::info!(
            api_url = %settings.api_url,
            owner = %settings.owner,
            repo = %settings.repo,
            "Initialized GitHubClient"
        );
        Ok(GitHubClient {
            http,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            search_page_delay: Duration::from_millis(150),
            files_page_delay: Duration::from_millis(120),
        })
    }

    /// Override the pauses between result pages.
    pub fn with_page_delays(mut self, search: Duration, files: Duration) -> Self {
        self.search_page_delay = search;
        self.files_page_delay = files;
        self
    }

    /// The search query for PRs of this repository merged inside `window`.
    pub fn merged_query(&self, window: &MergeWindow) -> String {
        format!(
            "repo:{}/{} is:pr is:merged merged:>={} merged:<{}",
            self.owner,
            self.repo,
            window.since.to_rfc3339_opts(SecondsFormat::Millis, true),
            window.until.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    fn pulls_url(&self, number: u64) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, self.owner, self.repo, number
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        tracing::debug!(url, ?query, "GitHub request");
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(url, %status, body = %body, "GitHub API error");
            return Err(format!("GitHub API error: {status} {body}").into());
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn search_merged(
        &self,
        window: MergeWindow,
        max_results: usize,
    ) -> Result<Vec<u64>, ClientError> {
        let url = format!("{}/search/issues", self.api_url);
        let q = self.merged_query(&window);
        let mut numbers: Vec<u64> = Vec::new();
        let mut page = 1usize;

        while numbers.len() < max_results {
            let data: SearchResponse = self
                .get_json(
                    &url,
                    &[
                        ("q", q.clone()),
                        ("per_page", PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let page_len = data.items.len();
            numbers.extend(data.items.into_iter().map(|item| item.number));

            if page_len < PER_PAGE || numbers.len() >= max_results {
                break;
            }
            page += 1;
            tokio::time::sleep(self.search_page_delay).await;
        }

        numbers.truncate(max_results);
        tracing::info!(count = numbers.len(), pages = page, "Searched merged pull requests");
        Ok(numbers)
    }

    async fn pull_request(&self, number: u64) -> Result<PullRequestDetails, ClientError> {
        self.get_json(&self.pulls_url(number), &[]).await
    }

    async fn pull_request_files(&self, number: u64) -> Result<Vec<RawFileChange>, ClientError> {
        let url = format!("{}/files", self.pulls_url(number));
        let mut files: Vec<RawFileChange> = Vec::new();
        let mut page = 1usize;

        loop {
            let page_files: Vec<RawFileChange> = self
                .get_json(
                    &url,
                    &[("per_page", PER_PAGE.to_string()), ("page", page.to_string())],
                )
                .await?;
            let page_len = page_files.len();
            files.extend(page_files);

            if page_len < PER_PAGE {
                break;
            }
            page += 1;
            tokio::time::sleep(self.files_page_delay).await;
        }

        tracing::debug!(number, files = files.len(), "Fetched pull request files");
        Ok(files)
    }
}
