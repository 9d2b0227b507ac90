//! Per-file inclusion decision and tagging.
//!
//! Exclusion checks run in a fixed order and the first hit decides the reason:
//! missing filename, excluded path, missing patch, too many changed lines, too many
//! patch characters. Tags are only computed for files that survive all checks.

use serde::{Deserialize, Serialize};

use crate::config::RuleConfig;
use crate::contract::RawFileChange;
use crate::rules::CompiledRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusionReason {
    MissingFilename,
    ExcludedPath,
    NoPatch,
    LargePatch,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::MissingFilename => "missing-filename",
            ExclusionReason::ExcludedPath => "excluded-path",
            ExclusionReason::NoPatch => "no-patch",
            ExclusionReason::LargePatch => "large-patch",
        }
    }
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size limits above which a file's patch is not analyzed. `None` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchPolicy {
    pub max_patch_lines: Option<u64>,
    pub max_patch_chars: Option<usize>,
}

impl From<&RuleConfig> for PatchPolicy {
    fn from(config: &RuleConfig) -> Self {
        PatchPolicy {
            max_patch_lines: config.max_patch_lines,
            max_patch_chars: config.max_patch_chars,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTags {
    pub domains: Vec<String>,
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludedFile {
    pub filename: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedFile {
    pub filename: String,
    pub reason: ExclusionReason,
}

/// Outcome of [`classify`] for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Included { file: IncludedFile, tags: FileTags },
    Excluded(ExcludedFile),
}

impl Classification {
    pub fn is_included(&self) -> bool {
        matches!(self, Classification::Included { .. })
    }

    pub fn reason(&self) -> Option<ExclusionReason> {
        match self {
            Classification::Included { .. } => None,
            Classification::Excluded(excluded) => Some(excluded.reason),
        }
    }
}

/// Replace every backslash with a forward slash.
pub fn normalize_path(filename: &str) -> String {
    filename.replace('\\', "/")
}

fn exclusion_reason(
    filename: &str,
    file: &RawFileChange,
    rules: &CompiledRules,
    policy: &PatchPolicy,
) -> Option<ExclusionReason> {
    if filename.is_empty() {
        return Some(ExclusionReason::MissingFilename);
    }
    if rules.is_excluded(filename) {
        return Some(ExclusionReason::ExcludedPath);
    }
    let patch = match file.patch_text() {
        Some(patch) => patch,
        None => return Some(ExclusionReason::NoPatch),
    };
    if policy.max_patch_lines.is_some_and(|max| file.changes > max) {
        return Some(ExclusionReason::LargePatch);
    }
    if policy
        .max_patch_chars
        .is_some_and(|max| patch.encode_utf16().count() > max)
    {
        return Some(ExclusionReason::LargePatch);
    }
    None
}

fn match_tags(filename: &str, patch: &str, rules: &CompiledRules) -> FileTags {
    let domains = rules
        .domains
        .iter()
        .filter(|rule| rule.matches(filename))
        .map(|rule| rule.name.clone())
        .collect();

    let haystack = format!("{filename}\n{patch}").to_lowercase();
    let signals = rules
        .signals
        .iter()
        .filter(|rule| rule.matches(&haystack))
        .map(|rule| rule.name.clone())
        .collect();

    FileTags { domains, signals }
}

pub fn classify(file: &RawFileChange, rules: &CompiledRules, policy: &PatchPolicy) -> Classification {
    let filename = normalize_path(&file.filename);

    if let Some(reason) = exclusion_reason(&filename, file, rules, policy) {
        return Classification::Excluded(ExcludedFile { filename, reason });
    }

    let tags = match_tags(&filename, file.patch_text().unwrap_or_default(), rules);
    Classification::Included {
        file: IncludedFile {
            filename,
            additions: file.additions,
            deletions: file.deletions,
            changes: file.changes,
            status: file.status.clone(),
        },
        tags,
    }
}
