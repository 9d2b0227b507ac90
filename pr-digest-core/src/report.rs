//! Slack Block Kit rendering of a digest.

use serde::{Deserialize, Serialize};

use crate::analysis::{PullRequestDigest, TagCounts};
use crate::summary::{format_counts, DOMAIN_LABELS};

const FALLBACK_TOP_PR_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMessage {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: Text },
    Section { text: Text },
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Block::Header { text } | Block::Section { text } => &text.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    PlainText,
    Mrkdwn,
}

fn header(text: String) -> Block {
    Block::Header {
        text: Text {
            kind: TextKind::PlainText,
            text,
        },
    }
}

fn section(text: String) -> Block {
    Block::Section {
        text: Text {
            kind: TextKind::Mrkdwn,
            text,
        },
    }
}

/// Escape the three characters Slack treats as control sequences in mrkdwn.
pub fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn pr_list(prs: &[PullRequestDigest], limit: usize, suffix: &str) -> String {
    prs.iter()
        .take(limit)
        .map(|pr| {
            format!(
                "- <{}|#{} {}>{suffix}",
                pr.url,
                pr.number,
                escape_mrkdwn(&pr.title)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lay out a digest: header, summary, domain breakdown, then the included and
/// excluded PR lists. Empty sections are left out. A `top_pr_count` of zero lists
/// up to ten PRs per section.
pub fn build_report_message(
    period_label: &str,
    summary_text: &str,
    domain_counts: &TagCounts,
    included_prs: &[PullRequestDigest],
    excluded_prs: &[PullRequestDigest],
    top_pr_count: usize,
) -> ReportMessage {
    let limit = if top_pr_count > 0 {
        top_pr_count
    } else {
        FALLBACK_TOP_PR_COUNT
    };

    let mut blocks = vec![
        header(format!("PR summary ({period_label})")),
        section(summary_text.to_string()),
    ];

    let domain_line = format_counts(domain_counts, DOMAIN_LABELS);
    if !domain_line.is_empty() {
        blocks.push(section(format!("*Domain breakdown*\n{domain_line}")));
    }

    if !included_prs.is_empty() {
        blocks.push(section(format!(
            "*Included PRs ({})*\n{}",
            included_prs.len(),
            pr_list(included_prs, limit, "")
        )));
    }

    if !excluded_prs.is_empty() {
        blocks.push(section(format!(
            "*Excluded PRs ({})*\n{}",
            excluded_prs.len(),
            pr_list(excluded_prs, limit, " (excluded)")
        )));
    }

    ReportMessage { blocks }
}
