//! High-level pipeline: orchestrates fetch → analyze → summarize → post for one run.
//!
//! One call to [`run_digest`] is one scheduled invocation:
//!   - Searches the hosting API for PRs merged in the lookback window
//!   - Fetches each PR's details and changed files and classifies the files
//!   - Splits PRs into included/excluded and counts domain and signal tags
//!   - Asks the [`Summarizer`] for a summary, falling back to the rule summary
//!   - Renders the report and hands it to the [`ReportSink`]
//!
//! # Error Handling
//! Hosting API and sink failures stop the run with a [`DigestError`]. Summarizer
//! failures are logged and replaced by the rule summary.
//!
//! # Callable From
//! - The CLI crate, with the GitHub/LLM/Slack clients
//! - Integration tests, with the `mockall` mocks from [`crate::contract`]

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::try_join;
use tracing::{debug, error, info, warn};

use crate::analysis::{analyze_files, count_tags, partition, PullRequestDigest, TagCounts};
use crate::classify::PatchPolicy;
use crate::config::RuleConfig;
use crate::contract::{MergeWindow, PullRequestSource, ReportSink, Summarizer};
use crate::error::DigestError;
use crate::report::{build_report_message, ReportMessage};
use crate::rules::CompiledRules;
use crate::summary::{
    build_llm_input, build_rule_summary, format_period_label, LlmInputLimits,
    NO_MERGED_PRS_SUMMARY,
};

pub const DEFAULT_LOOKBACK_HOURS: i64 = 168;
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Run-level knobs that do not come from the rule file.
#[derive(Debug, Clone)]
pub struct DigestSettings {
    pub lookback_hours: i64,
    pub max_results: usize,
    pub timezone: Tz,
    pub limits: LlmInputLimits,
    /// Pause between consecutive PRs.
    pub pr_delay: Duration,
}

impl Default for DigestSettings {
    fn default() -> Self {
        DigestSettings {
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            max_results: DEFAULT_MAX_RESULTS,
            timezone: Tz::UTC,
            limits: LlmInputLimits::default(),
            pr_delay: Duration::from_millis(120),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    Model,
    Rules,
    /// Nothing was merged; the fixed "no merged PRs" text was sent.
    Empty,
}

/// What a run did, for logging and tests.
#[derive(Debug, Clone)]
pub struct DigestReport {
    pub period_label: String,
    pub included_prs: Vec<u64>,
    pub excluded_prs: Vec<u64>,
    pub domain_counts: TagCounts,
    pub signal_counts: TagCounts,
    pub summary_source: SummarySource,
    pub message: ReportMessage,
}

pub async fn run_digest<P, S, R>(
    settings: &DigestSettings,
    rules: &RuleConfig,
    source: &P,
    summarizer: &S,
    sink: &R,
) -> Result<DigestReport, DigestError>
where
    P: PullRequestSource + ?Sized,
    S: Summarizer + ?Sized,
    R: ReportSink + ?Sized,
{
    run_digest_at(Utc::now(), settings, rules, source, summarizer, sink).await
}

/// [`run_digest`] with an explicit end of the window.
pub async fn run_digest_at<P, S, R>(
    now: DateTime<Utc>,
    settings: &DigestSettings,
    rules: &RuleConfig,
    source: &P,
    summarizer: &S,
    sink: &R,
) -> Result<DigestReport, DigestError>
where
    P: PullRequestSource + ?Sized,
    S: Summarizer + ?Sized,
    R: ReportSink + ?Sized,
{
    let window = MergeWindow::lookback(now, settings.lookback_hours);
    let period_label = format_period_label(window.since, window.until, settings.timezone);
    let compiled = CompiledRules::compile(rules);
    let policy = PatchPolicy::from(rules);
    let top_pr_count = rules.top_pr_count();

    info!(period = %period_label, "[DIGEST] Starting digest run");

    let numbers = source
        .search_merged(window, settings.max_results)
        .await
        .map_err(|e| {
            error!(error = %e, "[DIGEST][ERROR] Searching merged PRs failed");
            DigestError::Search(e)
        })?;
    info!(count = numbers.len(), "[DIGEST] Found merged PRs");

    if numbers.is_empty() {
        let message = build_report_message(
            &period_label,
            NO_MERGED_PRS_SUMMARY,
            &TagCounts::default(),
            &[],
            &[],
            top_pr_count,
        );
        post(sink, &message).await?;
        info!("[DIGEST] No merged PRs found, empty report sent");
        return Ok(DigestReport {
            period_label,
            included_prs: Vec::new(),
            excluded_prs: Vec::new(),
            domain_counts: TagCounts::default(),
            signal_counts: TagCounts::default(),
            summary_source: SummarySource::Empty,
            message,
        });
    }

    let mut digests = Vec::with_capacity(numbers.len());
    for (i, number) in numbers.iter().copied().enumerate() {
        if i > 0 && !settings.pr_delay.is_zero() {
            tokio::time::sleep(settings.pr_delay).await;
        }
        let (details, files) = try_join(
            source.pull_request(number),
            source.pull_request_files(number),
        )
        .await
        .map_err(|e| {
            error!(number, error = %e, "[DIGEST][ERROR] Fetching PR failed");
            DigestError::PullRequest { number, source: e }
        })?;

        let analysis = analyze_files(&files, &compiled, &policy);
        debug!(
            number,
            included = analysis.included_files.len(),
            excluded = analysis.excluded_files.len(),
            domains = ?analysis.domain_tags,
            signals = ?analysis.signal_tags,
            "[DIGEST] Analyzed PR"
        );
        digests.push(PullRequestDigest::new(details, analysis));
    }

    let split = partition(digests);
    let domain_counts = count_tags(
        split
            .included
            .iter()
            .map(|pr| pr.analysis.domain_tags.as_slice()),
    );
    let signal_counts = count_tags(
        split
            .included
            .iter()
            .map(|pr| pr.analysis.signal_tags.as_slice()),
    );
    info!(
        included = split.included.len(),
        excluded = split.excluded.len(),
        "[DIGEST] Partitioned PRs"
    );

    let llm_input = build_llm_input(
        &period_label,
        &split.included,
        &domain_counts,
        &signal_counts,
        settings.limits,
        settings.timezone,
    );

    let (summary_text, summary_source) = match summarizer.summarize(&llm_input).await {
        Ok(Some(text)) if !text.trim().is_empty() => (text, SummarySource::Model),
        Ok(_) => {
            info!("[DIGEST] No model summary, using rule summary");
            (
                build_rule_summary(split.included.len(), &domain_counts),
                SummarySource::Rules,
            )
        }
        Err(e) => {
            warn!(error = %e, "[DIGEST] Summarizer failed, using rule summary");
            (
                build_rule_summary(split.included.len(), &domain_counts),
                SummarySource::Rules,
            )
        }
    };

    let message = build_report_message(
        &period_label,
        &summary_text,
        &domain_counts,
        &split.included,
        &split.excluded,
        top_pr_count,
    );
    post(sink, &message).await?;
    info!("[DIGEST] Report sent");

    Ok(DigestReport {
        period_label,
        included_prs: split.included.iter().map(|pr| pr.number).collect(),
        excluded_prs: split.excluded.iter().map(|pr| pr.number).collect(),
        domain_counts,
        signal_counts,
        summary_source,
        message,
    })
}

async fn post<R: ReportSink + ?Sized>(sink: &R, message: &ReportMessage) -> Result<(), DigestError> {
    sink.post(message).await.map_err(|e| {
        error!(error = %e, "[DIGEST][ERROR] Posting report failed");
        DigestError::Post(e)
    })
}
