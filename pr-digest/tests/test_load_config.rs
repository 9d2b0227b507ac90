use pr_digest::load_config::{load_rule_config, read_rule_config, resolve_config_path};
use pr_digest_core::config::RuleConfig;
use std::fs::write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A JSON rule file, the format most repositories ship.
#[test]
fn test_read_rule_config_json() {
    let config_json = r#"{
        "excludePaths": ["**/dist/**", "**/*.snap"],
        "maxPatchLines": 250,
        "maxPatchChars": 8000,
        "domainMap": [
            { "name": "checkout", "patterns": ["src/checkout/**"] },
            { "name": "auth", "patterns": ["src/auth/**", "**/login*"] }
        ],
        "signalKeywords": [{ "name": "pricing", "keywords": ["price", "discount"] }],
        "topPrCount": 5
    }"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_json).unwrap();

    let config = read_rule_config(config_file.path()).expect("Config should load");

    assert_eq!(config.exclude_paths, vec!["**/dist/**", "**/*.snap"]);
    assert_eq!(config.max_patch_lines, Some(250));
    assert_eq!(config.max_patch_chars, Some(8000));
    assert_eq!(config.domain_map.len(), 2);
    assert_eq!(config.domain_map[1].patterns, vec!["src/auth/**", "**/login*"]);
    assert_eq!(config.signal_keywords[0].keywords, vec!["price", "discount"]);
    assert_eq!(config.top_pr_count(), 5);
}

/// YAML rule files are accepted with the same keys.
#[test]
fn test_read_rule_config_yaml() {
    let config_yaml = r#"
excludePaths:
  - "**/generated/**"
domainMap:
  - name: notification
    patterns:
      - "src/notify/**"
signalKeywords: []
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = read_rule_config(config_file.path()).expect("YAML config should load");

    assert_eq!(config.exclude_paths, vec!["**/generated/**"]);
    assert_eq!(config.domain_map[0].name, "notification");
    assert!(config.signal_keywords.is_empty());
    assert_eq!(config.max_patch_lines, None);
}

#[test]
fn test_read_rule_config_missing_file_is_an_error() {
    let err = read_rule_config("definitely/not/here.json").unwrap_err();
    assert!(
        err.to_string().contains("Failed to read config file"),
        "unexpected error: {err}"
    );
}

#[test]
fn test_read_rule_config_wrong_shape_is_an_error() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), r#"{ "excludePaths": "not-a-list" }"#).unwrap();

    let err = read_rule_config(config_file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_load_rule_config_falls_back_to_builtin_rules() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "{ this is not valid").unwrap();

    assert_eq!(load_rule_config(Some(config_file.path())), RuleConfig::default());
    assert_eq!(
        load_rule_config(Some(Path::new("missing/rules.json"))),
        RuleConfig::default()
    );
    assert_eq!(load_rule_config(None), RuleConfig::default());
}

#[test]
fn test_load_rule_config_uses_file_when_valid() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), r#"{ "excludePaths": ["docs/**"] }"#).unwrap();

    let config = load_rule_config(Some(config_file.path()));
    assert_eq!(config.exclude_paths, vec!["docs/**"]);
    assert!(config.domain_map.is_empty());
}

#[test]
fn test_resolve_config_path() {
    let workspace = Path::new("/work/repo");

    assert_eq!(
        resolve_config_path("scripts/rules.json", workspace),
        Some(PathBuf::from("/work/repo/scripts/rules.json"))
    );
    assert_eq!(
        resolve_config_path("/etc/rules.json", workspace),
        Some(PathBuf::from("/etc/rules.json"))
    );
    assert_eq!(resolve_config_path("", workspace), None);
}
