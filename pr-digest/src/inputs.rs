//! GitHub Actions style inputs: `with: { lookback-hours: 24 }` arrives in the
//! environment as `INPUT_LOOKBACK-HOURS`.

use anyhow::{bail, Result};

fn input_key(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

fn input_value(name: &str) -> String {
    std::env::var(input_key(name))
        .map(|raw| raw.trim().to_string())
        .unwrap_or_default()
}

/// The trimmed `INPUT_<NAME>` value, or `fallback` rendered as a string when the
/// input is missing or blank. No fallback gives an empty string.
pub fn resolve_input_value<T: ToString>(name: &str, fallback: Option<T>) -> String {
    let value = input_value(name);
    if !value.is_empty() {
        return value;
    }
    fallback.map(|f| f.to_string()).unwrap_or_default()
}

/// First set, non-empty environment variable among `names`.
pub fn env_fallback(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

pub fn assert_required(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        tracing::error!(input = name, "Required input missing");
        bail!("{name} input is required");
    }
    Ok(())
}
