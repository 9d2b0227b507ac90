//! Text building for the digest: the JSON handed to the summarization model, the
//! prompts around it, and the rule-based summary used when no model answers.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::Serialize;

use crate::analysis::{DiffStat, PullRequestDigest, TagCounts};

pub const NO_MERGED_PRS_SUMMARY: &str = "No pull requests were merged in this period.";

pub const SUMMARY_SYSTEM_PROMPT: &str = "You write summaries of merged pull requests. \
Use only the data you are given and do not exaggerate. Write concise bullets formatted for Slack mrkdwn.

Output rules:
- Write the section headers \"*Code changes*\", \"*Business policy changes*\" and \"*Major changes/additions*\" on their own lines
- Group every section by weekday, writing the weekday line as \"Monday:\"
- Take the weekday from mergedDayLabel/mergedDate in the JSON
- Write the items under a weekday as indented \"- \" bullets
- Order weekdays by date, oldest first
- If a section has no items, write only \"- None\" under it
- Leave one blank line between sections

Do not guess: leave out anything the data does not support.";

pub const DOMAIN_LABELS: &[(&str, &str)] = &[
    ("checkout", "Checkout/Orders"),
    ("promotion", "Promotions"),
    ("content", "Content"),
    ("auth", "Auth/Signup"),
    ("settings", "Settings/Profile"),
    ("notification", "Notifications"),
    ("analytics", "Analytics"),
    ("feature-flag", "Feature flags"),
    ("i18n", "Copy/Translations"),
];

pub const SIGNAL_LABELS: &[(&str, &str)] = &[
    ("pricing", "Pricing/Discounts"),
    ("payment", "Payments"),
    ("policy", "Policy/Terms"),
    ("experiment", "Experiments/Rollouts"),
    ("growth", "Growth/Conversion"),
    ("notification", "Notifications"),
];

fn label<'a>(labels: &[(&str, &'a str)], key: &'a str) -> &'a str {
    labels
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key)
}

pub fn domain_label(key: &str) -> &str {
    label(DOMAIN_LABELS, key)
}

pub fn signal_label(key: &str) -> &str {
    label(SIGNAL_LABELS, key)
}

/// Caps applied to each PR before it is sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmInputLimits {
    pub max_body_chars: usize,
    pub max_files_per_pr: usize,
}

impl Default for LlmInputLimits {
    fn default() -> Self {
        LlmInputLimits {
            max_body_chars: 1500,
            max_files_per_pr: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmInput {
    pub period: String,
    pub total_prs: usize,
    pub domain_counts: TagCounts,
    pub signal_counts: TagCounts,
    pub prs: Vec<LlmPullRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmPullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub body: String,
    pub domains: Vec<String>,
    pub signals: Vec<String>,
    pub diff_stat: DiffStat,
    pub merged_at: String,
    pub merged_date: String,
    pub merged_day_label: String,
    pub files: Vec<String>,
}

pub fn build_llm_input(
    period: &str,
    included_prs: &[PullRequestDigest],
    domain_counts: &TagCounts,
    signal_counts: &TagCounts,
    limits: LlmInputLimits,
    tz: Tz,
) -> LlmInput {
    let prs = included_prs
        .iter()
        .map(|pr| LlmPullRequest {
            number: pr.number,
            title: pr.title.clone(),
            url: pr.url.clone(),
            body: truncate_text(&clean_body(&pr.body), limits.max_body_chars),
            domains: pr.analysis.domain_tags.clone(),
            signals: pr.analysis.signal_tags.clone(),
            diff_stat: pr.analysis.diff_stat,
            merged_at: pr
                .merged_at
                .map(|at| at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
                .unwrap_or_default(),
            merged_date: pr
                .merged_at
                .map(|at| format_in_zone(at, tz, "%Y-%m-%d"))
                .unwrap_or_default(),
            merged_day_label: pr
                .merged_at
                .map(|at| format_in_zone(at, tz, "%A"))
                .unwrap_or_default(),
            files: pr
                .analysis
                .included_files
                .iter()
                .take(limits.max_files_per_pr)
                .map(|f| f.filename.clone())
                .collect(),
        })
        .collect();

    LlmInput {
        period: period.to_string(),
        total_prs: included_prs.len(),
        domain_counts: domain_counts.clone(),
        signal_counts: signal_counts.clone(),
        prs,
    }
}

/// Fallback summary derived from counts alone.
pub fn build_rule_summary(included_count: usize, domain_counts: &TagCounts) -> String {
    let mut lines = vec![format!(
        "- {included_count} pull requests were merged in this period."
    )];
    let domain_line = format_counts(domain_counts, DOMAIN_LABELS);
    if !domain_line.is_empty() {
        lines.push(format!("- Main domains: {domain_line}"));
    }
    lines.push("- Business impact: medium (estimated from code paths and keywords)".to_string());
    lines.join("\n")
}

/// Top five tags by count, highest first, as `"Label N"` joined with `", "`.
pub fn format_counts(counts: &TagCounts, labels: &[(&str, &str)]) -> String {
    let mut entries: Vec<(&str, usize)> = counts.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
        .into_iter()
        .take(5)
        .map(|(key, count)| format!("{} {count}", label(labels, key)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_period_label(since: DateTime<Utc>, until: DateTime<Utc>, tz: Tz) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M";
    format!(
        "{} ~ {} ({})",
        format_in_zone(since, tz, FORMAT),
        format_in_zone(until, tz, FORMAT),
        tz.name()
    )
}

pub fn build_summary_user_prompt<T: Serialize>(input: &T) -> String {
    let json = serde_json::to_string_pretty(input).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Write a summary based on the following JSON.\n\
The summary must contain the section headers below and follow Slack mrkdwn rules.\n\n\
- *Code changes*\n\
- *Business policy changes*\n\
- *Major changes/additions*\n\n\
Additional rules:\n\
- Group every section by weekday, writing the weekday line as \"Monday:\"\n\
- Take the weekday from mergedDayLabel/mergedDate in the JSON\n\
- Write the items under a weekday as indented \"- \" bullets\n\
- Order weekdays by date, oldest first\n\n\
JSON:\n{json}"
    )
}

fn format_in_zone(at: DateTime<Utc>, tz: Tz, format: &str) -> String {
    at.with_timezone(&tz).format(format).to_string()
}

fn html_comment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"))
}

/// Strip HTML comments (PR template hints) and surrounding whitespace.
pub fn clean_body(body: &str) -> String {
    html_comment().replace_all(body, "").trim().to_string()
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
