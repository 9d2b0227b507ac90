//! Report sinks: the Slack incoming webhook, and stdout for dry runs.

use async_trait::async_trait;
use pr_digest_core::contract::{ClientError, ReportSink};
use pr_digest_core::report::ReportMessage;

pub struct SlackWebhook {
    http: reqwest::Client,
    url: String,
}

impl SlackWebhook {
    pub fn new(url: &str) -> Self {
        SlackWebhook {
            http: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl ReportSink for SlackWebhook {
    async fn post(&self, message: &ReportMessage) -> Result<(), ClientError> {
        tracing::info!(blocks = message.blocks.len(), "Posting report to Slack");
        let response = self.http.post(&self.url).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "Slack webhook rejected the report");
            return Err(format!("Slack webhook error: {status} {body}").into());
        }
        Ok(())
    }
}

/// Prints the webhook payload instead of sending it.
pub struct StdoutSink;

#[async_trait]
impl ReportSink for StdoutSink {
    async fn post(&self, message: &ReportMessage) -> Result<(), ClientError> {
        println!("{}", serde_json::to_string_pretty(message)?);
        Ok(())
    }
}
