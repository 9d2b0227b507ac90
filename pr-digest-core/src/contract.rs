#![allow(unused)]

//! # contract: boundary records and collaborator traits
//!
//! The digest pipeline talks to three outside parties: the code-hosting API that
//! lists merged pull requests and their files, an optional summarization model, and
//! the chat webhook that receives the report. Each one is a trait here so the
//! orchestration in [`crate::digest`] can run against real clients or mocks.
//!
//! ## Records
//! - [`RawFileChange`] and [`PullRequestDetails`] are deserialized straight from the
//!   hosting API. Optional fields are defaulted once, during deserialization, so the
//!   classifier never re-checks them.
//!
//! ## Mocking & Testing
//! - All traits are annotated for `mockall`; mocks are exported behind the
//!   `test-export-mocks` feature for use from integration tests and the CLI crate.
//!
//! ## Errors
//! - Trait methods return [`ClientError`], a boxed `Send + Sync` error, so transport
//!   details stay inside the implementor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::{automock, predicate::*};
use serde::{Deserialize, Deserializer, Serialize};

use crate::report::ReportMessage;
use crate::summary::LlmInput;

/// Error type shared by all collaborator traits.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

/// Treats an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One file touched by a pull request, as reported by the hosting API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFileChange {
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    /// Absent for binary files and renames without a diff.
    #[serde(default)]
    pub patch: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additions: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deletions: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

impl RawFileChange {
    /// Patch text, treating an empty string the same as a missing patch.
    pub fn patch_text(&self) -> Option<&str> {
        self.patch.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestUser {
    #[serde(default)]
    pub login: Option<String>,
}

/// Pull request metadata, as returned by the hosting API's "get pull request" call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestDetails {
    pub number: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<PullRequestUser>,
}

impl PullRequestDetails {
    pub fn author(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.login.as_deref())
            .unwrap_or("unknown")
    }
}

/// The time range whose merged pull requests make up one digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl MergeWindow {
    /// Window ending at `until`. A span too large to represent starts at the
    /// earliest representable instant.
    pub fn lookback(until: DateTime<Utc>, hours: i64) -> Self {
        let since = chrono::Duration::try_hours(hours)
            .and_then(|span| until.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        MergeWindow { since, until }
    }
}

/// Read access to merged pull requests on the code-hosting service.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Numbers of pull requests merged inside `window`, at most `max_results` of them.
    async fn search_merged(
        &self,
        window: MergeWindow,
        max_results: usize,
    ) -> Result<Vec<u64>, ClientError>;

    async fn pull_request(&self, number: u64) -> Result<PullRequestDetails, ClientError>;

    /// Every changed file of the pull request, across all result pages.
    async fn pull_request_files(&self, number: u64) -> Result<Vec<RawFileChange>, ClientError>;
}

/// Produces a free-text summary of a batch of pull requests.
///
/// `Ok(None)` means the summarizer chose not to answer (disabled, empty output);
/// callers fall back to the rule-based summary in both that case and on error.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, input: &LlmInput) -> Result<Option<String>, ClientError>;
}

/// Destination for the rendered report.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn post(&self, message: &ReportMessage) -> Result<(), ClientError>;
}
