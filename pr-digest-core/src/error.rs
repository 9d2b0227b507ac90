use thiserror::Error;

use crate::contract::ClientError;

/// Failures that abort a digest run. Summarizer failures are not among them.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("searching merged pull requests failed: {0}")]
    Search(#[source] ClientError),

    #[error("fetching pull request #{number} failed: {source}")]
    PullRequest {
        number: u64,
        #[source]
        source: ClientError,
    },

    #[error("posting the report failed: {0}")]
    Post(#[source] ClientError),
}
