/// `load_config` module: reads the rule file (exclude paths, domain map, signal keywords)
/// into the core's [`RuleConfig`].
///
/// # Responsibilities
/// - Parse the user-supplied rule file. JSON is the usual format; since JSON is a subset
///   of YAML, the file is parsed with `serde_yaml` and YAML rule files work as well.
/// - Resolve relative rule-file paths against the CI workspace.
/// - Never abort a scheduled run over a bad rule file: [`load_rule_config`] logs the
///   problem and falls back to the built-in rules.
///
/// # Errors
/// [`read_rule_config`] returns `anyhow::Error` with the path and cause; the fallback
/// wrapper only logs it.
use anyhow::{Context, Result};
use pr_digest_core::config::RuleConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "scripts/pr-summary.config.json";

/// Strict loader: any read or parse failure is an error.
pub fn read_rule_config<P: AsRef<Path>>(path: P) -> Result<RuleConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading rule configuration from file");

    let content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read config file {:?}", path_ref))?;
    info!(config_path = ?path_ref, "Config file read successfully");

    let config: RuleConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {:?}", path_ref))?;
    info!(config_path = ?path_ref, "Parsed rule config successfully");

    Ok(config)
}

/// Loads the rule file at `path`, or the built-in rules when `path` is `None` or the
/// file cannot be read or parsed.
pub fn load_rule_config(path: Option<&Path>) -> RuleConfig {
    let config = match path {
        None => {
            info!("No rule config path given, using built-in rules");
            RuleConfig::default()
        }
        Some(path) => match read_rule_config(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = ?e, config_path = ?path, "Rule config unusable");
                warn!(config_path = ?path, "Falling back to built-in rules");
                RuleConfig::default()
            }
        },
    };
    config.trace_loaded();
    config
}

/// Absolute paths are kept; relative ones are joined onto `workspace`. An empty
/// value means "no rule file".
pub fn resolve_config_path(value: &str, workspace: &Path) -> Option<PathBuf> {
    if value.is_empty() {
        return None;
    }
    let path = Path::new(value);
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(workspace.join(path))
    }
}
