/// # pr-digest CLI Interface (Module)
///
/// Command parsing and orchestration for the `pr-digest` binary. Classification,
/// aggregation and rendering live in [`pr-digest-core`]; this module resolves settings,
/// builds the HTTP collaborators and hands them to the core digest run.
///
/// ## Commands
/// - `run`: fetch merged PRs for the lookback window, summarize, and post to Slack
///   (or print the payload with `--dry-run`).
/// - `analyze`: classify a local JSON array of GitHub file records and print the
///   analysis. No network access.
///
/// For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`pr-digest-core`]: ../../pr_digest_core/
use crate::github::GitHubClient;
use crate::llm::build_summarizer;
use crate::load_config::load_rule_config;
use crate::settings::{RunOverrides, RunSettings};
use crate::slack::{SlackWebhook, StdoutSink};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pr_digest_core::analysis::analyze_files;
use pr_digest_core::classify::PatchPolicy;
use pr_digest_core::contract::{RawFileChange, ReportSink};
use pr_digest_core::digest::run_digest;
use pr_digest_core::rules::CompiledRules;
use std::path::PathBuf;

/// CLI for pr-digest: periodic digests of merged pull requests.
#[derive(Parser)]
#[clap(
    name = "pr-digest",
    version,
    about = "Summarize recently merged pull requests and post the digest to Slack"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the digest for the lookback window and post it
    Run {
        /// Rule file (JSON or YAML); overrides the config-path input
        #[clap(long)]
        config: Option<PathBuf>,
        /// Hours to look back from now
        #[clap(long)]
        lookback_hours: Option<i64>,
        /// Print the Slack payload instead of posting it
        #[clap(long)]
        dry_run: bool,
    },
    /// Classify a JSON array of GitHub file records and print the analysis
    Analyze {
        /// Path to the JSON file with the file records
        #[clap(long)]
        files: PathBuf,
        /// Rule file (JSON or YAML); built-in rules when omitted
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Run { .. } => "run",
            Commands::Analyze { .. } => "analyze",
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Run {
            config,
            lookback_hours,
            dry_run,
        } => {
            let overrides = RunOverrides {
                config,
                lookback_hours,
                dry_run,
            };
            let settings = RunSettings::resolve(&overrides)?;
            let rules = load_rule_config(settings.config_path.as_deref());
            tracing::info!(command = "run", dry_run, "Starting digest run");

            let source = GitHubClient::new(&settings.github)
                .map_err(|e| anyhow::Error::msg(format!("GitHub client setup failed: {e}")))?;
            let summarizer = build_summarizer(&settings.llm);
            let sink: Box<dyn ReportSink> = match (&settings.slack_webhook_url, dry_run) {
                (Some(url), false) => Box::new(SlackWebhook::new(url)),
                _ => Box::new(StdoutSink),
            };

            match run_digest(&settings.digest, &rules, &source, &*summarizer, &*sink).await {
                Ok(report) => {
                    tracing::info!(
                        command = "run",
                        included = report.included_prs.len(),
                        excluded = report.excluded_prs.len(),
                        summary_source = ?report.summary_source,
                        "Digest complete"
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "run", error = %e, "Digest failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::Analyze { files, config } => {
            let rules = load_rule_config(config.as_deref());
            let raw = std::fs::read_to_string(&files)
                .with_context(|| format!("Failed to read file records {:?}", files))?;
            let records: Vec<RawFileChange> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse file records {:?}", files))?;

            let analysis = analyze_files(
                &records,
                &CompiledRules::compile(&rules),
                &PatchPolicy::from(&rules),
            );
            tracing::info!(
                command = "analyze",
                included = analysis.included_files.len(),
                excluded = analysis.excluded_files.len(),
                "Analysis complete"
            );
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(())
        }
    }
}
