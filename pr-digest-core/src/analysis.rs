//! Per-PR aggregation of classified files, and cross-PR partitioning and tag counts.
//!
//! Everything here is a pure function of its inputs. [`analyze_files`] is a fold
//! over [`classify`] results, so PRs can be analyzed in any order or in parallel.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::classify::{classify, Classification, ExcludedFile, FileTags, IncludedFile, PatchPolicy};
use crate::contract::{PullRequestDetails, RawFileChange};
use crate::rules::CompiledRules;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStat {
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
}

impl DiffStat {
    fn plus(self, file: &IncludedFile) -> DiffStat {
        DiffStat {
            additions: self.additions.saturating_add(file.additions),
            deletions: self.deletions.saturating_add(file.deletions),
            changes: self.changes.saturating_add(file.changes),
        }
    }
}

/// Aggregate for one PR. Tags are deduplicated, first occurrence first;
/// `diff_stat` sums `included_files` only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub included_files: Vec<IncludedFile>,
    pub excluded_files: Vec<ExcludedFile>,
    pub domain_tags: Vec<String>,
    pub signal_tags: Vec<String>,
    pub diff_stat: DiffStat,
}

impl AnalysisResult {
    /// Fold one classification into the aggregate.
    pub fn with(mut self, classification: Classification) -> Self {
        match classification {
            Classification::Excluded(excluded) => self.excluded_files.push(excluded),
            Classification::Included { file, tags } => {
                self.diff_stat = self.diff_stat.plus(&file);
                self.included_files.push(file);
                let FileTags { domains, signals } = tags;
                union_into(&mut self.domain_tags, domains);
                union_into(&mut self.signal_tags, signals);
            }
        }
        self
    }

    pub fn has_included_files(&self) -> bool {
        !self.included_files.is_empty()
    }
}

impl AsRef<AnalysisResult> for AnalysisResult {
    fn as_ref(&self) -> &AnalysisResult {
        self
    }
}

fn union_into(target: &mut Vec<String>, tags: Vec<String>) {
    for tag in tags {
        if !target.contains(&tag) {
            target.push(tag);
        }
    }
}

pub fn analyze_files(
    files: &[RawFileChange],
    rules: &CompiledRules,
    policy: &PatchPolicy,
) -> AnalysisResult {
    files
        .iter()
        .map(|file| classify(file, rules, policy))
        .fold(AnalysisResult::default(), AnalysisResult::with)
}

/// A merged pull request together with the analysis of its files.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestDigest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub body: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub author: String,
    pub analysis: AnalysisResult,
}

impl PullRequestDigest {
    pub fn new(details: PullRequestDetails, analysis: AnalysisResult) -> Self {
        let author = details.author().to_string();
        PullRequestDigest {
            number: details.number,
            title: details.title,
            url: details.html_url,
            body: details.body.unwrap_or_default(),
            merged_at: details.merged_at,
            author,
            analysis,
        }
    }
}

impl AsRef<AnalysisResult> for PullRequestDigest {
    fn as_ref(&self) -> &AnalysisResult {
        &self.analysis
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition<P> {
    pub included: Vec<P>,
    pub excluded: Vec<P>,
}

/// Split PRs by whether any of their files survived classification. Order is kept
/// within each side.
pub fn partition<P: AsRef<AnalysisResult>>(prs: Vec<P>) -> Partition<P> {
    let (included, excluded): (Vec<P>, Vec<P>) = prs
        .into_iter()
        .partition(|pr| pr.as_ref().has_included_files());
    Partition { included, excluded }
}

/// Tag occurrence counts, keyed in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCounts {
    entries: Vec<(String, usize)>,
}

impl TagCounts {
    pub fn get(&self, tag: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn increment(&mut self, tag: &str) {
        match self.entries.iter_mut().find(|(name, _)| name == tag) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((tag.to_string(), 1)),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for TagCounts {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        TagCounts {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for TagCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

/// Count, for every tag, how many of the given sets contain it.
pub fn count_tags<'a, I, T>(tag_sets: I) -> TagCounts
where
    I: IntoIterator<Item = &'a [T]>,
    T: AsRef<str> + 'a,
{
    let mut counts = TagCounts::default();
    for set in tag_sets {
        let mut seen: Vec<&str> = Vec::with_capacity(set.len());
        for tag in set {
            let tag = tag.as_ref();
            if !seen.contains(&tag) {
                seen.push(tag);
                counts.increment(tag);
            }
        }
    }
    counts
}
