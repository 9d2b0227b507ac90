use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Number of PRs listed per report section when the rule file does not say.
pub const DEFAULT_TOP_PR_COUNT: usize = 10;

/// Raw classification rules as written in the rule file (camelCase keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    #[serde(default)]
    pub max_patch_lines: Option<u64>,
    #[serde(default)]
    pub max_patch_chars: Option<usize>,
    #[serde(default)]
    pub domain_map: Vec<DomainRuleConfig>,
    #[serde(default)]
    pub signal_keywords: Vec<SignalRuleConfig>,
    #[serde(default)]
    pub top_pr_count: Option<usize>,
}

/// A business area and the glob patterns that place a file in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRuleConfig {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// A risk/topic label and the keywords that raise it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRuleConfig {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl RuleConfig {
    pub fn top_pr_count(&self) -> usize {
        self.top_pr_count.unwrap_or(DEFAULT_TOP_PR_COUNT)
    }

    pub fn trace_loaded(&self) {
        info!(
            exclude_paths = self.exclude_paths.len(),
            domains = self.domain_map.len(),
            signals = self.signal_keywords.len(),
            max_patch_lines = ?self.max_patch_lines,
            max_patch_chars = ?self.max_patch_chars,
            "Loaded RuleConfig"
        );
        debug!(?self, "RuleConfig loaded (full debug)");
    }
}

fn domain(name: &str, patterns: &[&str]) -> DomainRuleConfig {
    DomainRuleConfig {
        name: name.to_string(),
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

fn signal(name: &str, keywords: &[&str]) -> SignalRuleConfig {
    SignalRuleConfig {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

/// Built-in rules, used when no rule file is given or it cannot be read.
impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            exclude_paths: [
                "**/__generated__/**",
                "**/*.snap",
                "**/dist/**",
                "**/build/**",
                "**/*.min.*",
                "**/*.map",
                "**/*.lock",
                "**/coverage/**",
                "**/*.png",
                "**/*.jpg",
                "**/*.jpeg",
                "**/*.gif",
                "**/*.svg",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            max_patch_lines: Some(400),
            max_patch_chars: Some(12_000),
            domain_map: vec![
                domain(
                    "checkout",
                    &[
                        "src/**/checkout/**",
                        "src/**/payment/**",
                        "src/**/tossPayments/**",
                        "src/**/order/**",
                    ],
                ),
                domain(
                    "promotion",
                    &["src/**/promotion/**", "src/**/coupon/**", "src/**/discount/**"],
                ),
                domain(
                    "content",
                    &["src/**/feed/**", "src/**/post/**", "src/**/creator/**"],
                ),
                domain(
                    "auth",
                    &["src/**/auth/**", "src/**/login/**", "src/**/signup/**"],
                ),
                domain("settings", &["src/**/settings/**", "src/**/profile/**"]),
                domain("notification", &["src/**/notification/**", "src/**/push/**"]),
                domain(
                    "analytics",
                    &[
                        "src/**/analytics/**",
                        "src/**/tracking/**",
                        "src/**/metrics/**",
                    ],
                ),
                domain(
                    "feature-flag",
                    &[
                        "src/**/featureFlags/**",
                        "src/**/experiment/**",
                        "src/**/abTest/**",
                    ],
                ),
                domain("i18n", &["src/**/locales/**", "src/**/i18n/**"]),
            ],
            signal_keywords: vec![
                signal(
                    "pricing",
                    &[
                        "price",
                        "pricing",
                        "discount",
                        "coupon",
                        "promo",
                        "promotion",
                        "fee",
                        "commission",
                        "rate",
                        "amount",
                    ],
                ),
                signal(
                    "payment",
                    &[
                        "payment",
                        "checkout",
                        "billing",
                        "refund",
                        "settlement",
                        "toss",
                        "card",
                    ],
                ),
                signal(
                    "policy",
                    &["policy", "terms", "consent", "agreement", "privacy"],
                ),
                signal(
                    "experiment",
                    &[
                        "featureFlag",
                        "feature_flag",
                        "experiment",
                        "abtest",
                        "rollout",
                    ],
                ),
                signal(
                    "growth",
                    &[
                        "signup",
                        "onboarding",
                        "retention",
                        "activation",
                        "conversion",
                    ],
                ),
                signal(
                    "notification",
                    &["push", "notification", "fcm", "apns", "inbox"],
                ),
            ],
            top_pr_count: Some(8),
        }
    }
}
