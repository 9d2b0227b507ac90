//! Resolves everything a run needs from action inputs, environment variables and
//! command-line overrides, in that order of precedence: flag, `INPUT_*`, plain env,
//! built-in default.

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use pr_digest_core::digest::{DigestSettings, DEFAULT_LOOKBACK_HOURS, DEFAULT_MAX_RESULTS};
use std::path::PathBuf;
use tracing::info;

use crate::inputs::{assert_required, env_fallback, resolve_input_value};
use crate::llm::{
    LlmSettings, DEFAULT_ANTHROPIC_MODEL, DEFAULT_GEMINI_MODEL, DEFAULT_LLM_PROVIDER,
    DEFAULT_OPENAI_MODEL,
};
use crate::load_config::{resolve_config_path, DEFAULT_CONFIG_PATH};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub api_url: String,
    pub token: String,
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub config: Option<PathBuf>,
    pub lookback_hours: Option<i64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub github: GitHubSettings,
    /// `None` only for dry runs.
    pub slack_webhook_url: Option<String>,
    pub llm: LlmSettings,
    pub digest: DigestSettings,
    pub config_path: Option<PathBuf>,
}

/// Split `owner/repo`.
pub fn parse_repository(full_name: &str) -> Result<(String, String)> {
    match full_name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => bail!("GITHUB_REPOSITORY must look like owner/repo, got {full_name:?}"),
    }
}

fn input_or_env(name: &str, env: &[&str], default: Option<&str>) -> String {
    let fallback = env_fallback(env).or_else(|| default.map(str::to_string));
    resolve_input_value(name, fallback)
}

impl RunSettings {
    pub fn resolve(overrides: &RunOverrides) -> Result<Self> {
        let token = input_or_env("github-token", &["GITHUB_TOKEN"], None);
        assert_required("github-token", &token)?;

        let webhook = input_or_env(
            "pr-summary-slack-webhook-url",
            &["PR_SUMMARY_SLACK_WEBHOOK_URL", "SLACK_WEBHOOK_URL"],
            None,
        );
        if !overrides.dry_run {
            assert_required("pr-summary-slack-webhook-url", &webhook)?;
        }

        let repository = std::env::var("GITHUB_REPOSITORY")
            .map_err(|_| anyhow!("GITHUB_REPOSITORY is not set"))?;
        let (owner, repo) = parse_repository(&repository)?;
        let api_url = env_fallback(&["GITHUB_API_URL"])
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        let lookback_hours = match overrides.lookback_hours {
            Some(hours) => hours,
            None => input_or_env(
                "lookback-hours",
                &["LOOKBACK_HOURS"],
                Some(DEFAULT_LOOKBACK_HOURS.to_string().as_str()),
            )
            .parse::<i64>()
            .context("lookback-hours must be a whole number of hours")?,
        };
        if lookback_hours <= 0 {
            bail!("lookback-hours must be positive, got {lookback_hours}");
        }
        let representable = chrono::Duration::try_hours(lookback_hours)
            .and_then(|span| Utc::now().checked_sub_signed(span))
            .is_some();
        if !representable {
            bail!("lookback-hours {lookback_hours} reaches past the earliest supported date");
        }

        let max_results = input_or_env(
            "max-results",
            &["MAX_RESULTS"],
            Some(DEFAULT_MAX_RESULTS.to_string().as_str()),
        )
        .parse::<usize>()
        .context("max-results must be a non-negative integer")?;

        let timezone_name = input_or_env("timezone", &["TIMEZONE"], Some(DEFAULT_TIMEZONE));
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|e| anyhow!("unknown timezone {timezone_name:?}: {e}"))?;

        let llm = LlmSettings {
            provider: input_or_env("llm-provider", &["LLM_PROVIDER"], Some(DEFAULT_LLM_PROVIDER))
                .to_lowercase(),
            openai_api_key: input_or_env("openai-api-key", &["OPENAI_API_KEY"], None),
            anthropic_api_key: input_or_env("anthropic-api-key", &["ANTHROPIC_API_KEY"], None),
            gemini_api_key: input_or_env("gemini-api-key", &["GEMINI_API_KEY"], None),
            openai_model: input_or_env("openai-model", &["OPENAI_MODEL"], Some(DEFAULT_OPENAI_MODEL)),
            anthropic_model: input_or_env(
                "anthropic-model",
                &["ANTHROPIC_MODEL"],
                Some(DEFAULT_ANTHROPIC_MODEL),
            ),
            gemini_model: input_or_env("gemini-model", &["GEMINI_MODEL"], Some(DEFAULT_GEMINI_MODEL)),
        };

        let config_path = match &overrides.config {
            Some(path) => Some(path.clone()),
            None => {
                let raw = input_or_env("config-path", &["PR_SUMMARY_CONFIG"], Some(DEFAULT_CONFIG_PATH));
                let workspace = match env_fallback(&["GITHUB_WORKSPACE"]) {
                    Some(dir) => PathBuf::from(dir),
                    None => std::env::current_dir().context("cannot determine current directory")?,
                };
                resolve_config_path(&raw, &workspace)
            }
        };

        let digest = DigestSettings {
            lookback_hours,
            max_results,
            timezone,
            ..DigestSettings::default()
        };

        info!(
            repository = %repository,
            lookback_hours,
            max_results,
            timezone = %timezone_name,
            provider = %llm.provider,
            dry_run = overrides.dry_run,
            "Resolved run settings"
        );

        Ok(RunSettings {
            github: GitHubSettings {
                api_url,
                token,
                owner,
                repo,
            },
            slack_webhook_url: (!webhook.is_empty()).then_some(webhook),
            llm,
            digest,
            config_path,
        })
    }
}
