use pretty_assertions::assert_eq;

use pr_digest_core::analysis::{analyze_files, count_tags, partition, AnalysisResult, DiffStat};
use pr_digest_core::classify::{ExclusionReason, PatchPolicy};
use pr_digest_core::config::{DomainRuleConfig, RuleConfig, SignalRuleConfig};
use pr_digest_core::contract::RawFileChange;
use pr_digest_core::rules::CompiledRules;

fn fixture_rules() -> RuleConfig {
    RuleConfig {
        exclude_paths: vec!["**/dist/**".into(), "node_modules/**".into()],
        max_patch_lines: Some(5),
        max_patch_chars: Some(40),
        domain_map: vec![
            DomainRuleConfig {
                name: "checkout".into(),
                patterns: vec!["src/**/checkout/**".into(), "src/checkout/**".into()],
            },
            DomainRuleConfig {
                name: "analytics".into(),
                patterns: vec!["src/analytics/**".into()],
            },
        ],
        signal_keywords: vec![
            SignalRuleConfig {
                name: "pricing".into(),
                keywords: vec!["price".into(), "discount".into()],
            },
            SignalRuleConfig {
                name: "notification".into(),
                keywords: vec!["email".into()],
            },
        ],
        top_pr_count: None,
    }
}

fn change(filename: &str, patch: &str, additions: u64, deletions: u64, changes: u64) -> RawFileChange {
    RawFileChange {
        filename: filename.to_string(),
        patch: Some(patch.to_string()),
        additions,
        deletions,
        changes,
        status: String::new(),
    }
}

fn fixture_files() -> Vec<RawFileChange> {
    vec![
        change("", "x", 0, 0, 1),
        change("node_modules/pkg/index.js", "x", 0, 0, 1),
        change("src/checkout/cart.ts", "", 0, 0, 1),
        change("src/checkout/large.ts", "x", 0, 0, 10),
        change("src/analytics/long.ts", &"x".repeat(50), 0, 0, 1),
        RawFileChange {
            status: "modified".to_string(),
            ..change("src/checkout/price.ts", "+ price change", 3, 1, 4)
        },
        change("src/notify/email.ts", "+ send email", 1, 0, 1),
        change("src\\checkout\\promo.ts", "+ discount", 2, 0, 2),
    ]
}

fn sorted(mut tags: Vec<String>) -> Vec<String> {
    tags.sort();
    tags
}

#[test]
fn analyzes_the_reference_fixture() {
    let config = fixture_rules();
    let rules = CompiledRules::compile(&config);
    let policy = PatchPolicy::from(&config);

    let result = analyze_files(&fixture_files(), &rules, &policy);

    assert_eq!(result.included_files.len(), 3);
    assert_eq!(result.excluded_files.len(), 5);
    assert_eq!(sorted(result.domain_tags.clone()), vec!["checkout"]);
    assert_eq!(sorted(result.signal_tags.clone()), vec!["notification", "pricing"]);
    assert_eq!(
        result.diff_stat,
        DiffStat {
            additions: 6,
            deletions: 1,
            changes: 7
        }
    );

    let mut reasons: Vec<&str> = result.excluded_files.iter().map(|f| f.reason.as_str()).collect();
    reasons.sort();
    assert_eq!(
        reasons,
        vec![
            "excluded-path",
            "large-patch",
            "large-patch",
            "missing-filename",
            "no-patch"
        ]
    );

    let included: Vec<&str> = result.included_files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(
        included,
        vec!["src/checkout/price.ts", "src/notify/email.ts", "src/checkout/promo.ts"]
    );
    assert_eq!(result.included_files[0].status, "modified");
}

#[test]
fn totals_ignore_excluded_files() {
    let config = fixture_rules();
    let rules = CompiledRules::compile(&config);
    let files = vec![
        change("web/dist/bundle.js", "+ x", 500, 400, 900),
        change("src/a.ts", "+ x", 2, 1, 3),
    ];

    let result = analyze_files(&files, &rules, &PatchPolicy::default());

    let expected = result
        .included_files
        .iter()
        .fold((0, 0, 0), |acc, f| (acc.0 + f.additions, acc.1 + f.deletions, acc.2 + f.changes));
    assert_eq!(
        (result.diff_stat.additions, result.diff_stat.deletions, result.diff_stat.changes),
        expected
    );
    assert_eq!(expected, (2, 1, 3));
    assert_eq!(result.excluded_files[0].reason, ExclusionReason::ExcludedPath);
}

#[test]
fn tags_from_several_files_appear_once() {
    let config = fixture_rules();
    let rules = CompiledRules::compile(&config);
    let files = vec![
        change("src/checkout/a.ts", "+ price", 1, 0, 1),
        change("src/checkout/b.ts", "+ discount", 1, 0, 1),
    ];

    let result = analyze_files(&files, &rules, &PatchPolicy::default());

    assert_eq!(result.domain_tags, vec!["checkout"]);
    assert_eq!(result.signal_tags, vec!["pricing"]);
}

#[test]
fn totals_saturate_instead_of_overflowing() {
    let files = vec![
        change("src/a.ts", "+a", u64::MAX, 1, u64::MAX),
        change("src/b.ts", "+b", 5, u64::MAX, 7),
    ];
    let rules = CompiledRules::default();

    let result = analyze_files(&files, &rules, &PatchPolicy::default());

    assert_eq!(
        result.diff_stat,
        DiffStat {
            additions: u64::MAX,
            deletions: u64::MAX,
            changes: u64::MAX,
        }
    );
}

#[test]
fn empty_file_list_gives_an_empty_result() {
    let rules = CompiledRules::compile(&fixture_rules());
    let result = analyze_files(&[], &rules, &PatchPolicy::default());
    assert_eq!(result, AnalysisResult::default());
    assert_eq!(result.diff_stat, DiffStat::default());
}

#[test]
fn analysis_does_not_depend_on_file_order() {
    let config = fixture_rules();
    let rules = CompiledRules::compile(&config);
    let policy = PatchPolicy::from(&config);
    let mut files = fixture_files();

    let forward = analyze_files(&files, &rules, &policy);
    files.reverse();
    let backward = analyze_files(&files, &rules, &policy);

    assert_eq!(forward.diff_stat, backward.diff_stat);
    assert_eq!(sorted(forward.domain_tags), sorted(backward.domain_tags));
    assert_eq!(sorted(forward.signal_tags), sorted(backward.signal_tags));
    assert_eq!(forward.included_files.len(), backward.included_files.len());
}

fn with_files(n: usize) -> AnalysisResult {
    let rules = CompiledRules::default();
    let files: Vec<RawFileChange> = (0..n)
        .map(|i| change(&format!("src/{i}.ts"), "+ x", 1, 0, 1))
        .collect();
    analyze_files(&files, &rules, &PatchPolicy::default())
}

#[test]
fn partition_keeps_order_on_both_sides() {
    let prs = vec![
        ("a", with_files(0)),
        ("b", with_files(1)),
        ("c", with_files(0)),
        ("d", with_files(2)),
    ];
    struct Pr(&'static str, AnalysisResult);
    impl AsRef<AnalysisResult> for Pr {
        fn as_ref(&self) -> &AnalysisResult {
            &self.1
        }
    }

    let split = partition(prs.into_iter().map(|(n, a)| Pr(n, a)).collect());

    assert_eq!(split.included.iter().map(|p| p.0).collect::<Vec<_>>(), vec!["b", "d"]);
    assert_eq!(split.excluded.iter().map(|p| p.0).collect::<Vec<_>>(), vec!["a", "c"]);
}

#[test]
fn partition_of_nothing_is_empty() {
    let split = partition(Vec::<AnalysisResult>::new());
    assert!(split.included.is_empty());
    assert!(split.excluded.is_empty());
}

#[test]
fn count_tags_counts_sets_not_occurrences() {
    let sets: Vec<Vec<&str>> = vec![vec!["a", "b"], vec!["a"]];
    let counts = count_tags(sets.iter().map(Vec::as_slice));
    assert_eq!(counts.get("a"), Some(2));
    assert_eq!(counts.get("b"), Some(1));
    assert_eq!(counts.iter().collect::<Vec<_>>(), vec![("a", 2), ("b", 1)]);
    assert_eq!(serde_json::to_string(&counts).unwrap(), r#"{"a":2,"b":1}"#);

    let repeated: Vec<Vec<&str>> = vec![vec!["a", "a"]];
    assert_eq!(count_tags(repeated.iter().map(Vec::as_slice)).get("a"), Some(1));
}

#[test]
fn count_tags_of_nothing_is_empty() {
    let counts = count_tags(Vec::<&[String]>::new());
    assert!(counts.is_empty());
    assert_eq!(serde_json::to_string(&counts).unwrap(), "{}");
}

#[test]
fn count_tags_keys_follow_first_appearance() {
    let sets: Vec<Vec<&str>> = vec![vec!["z"], vec!["a", "z"], vec!["m"]];
    let counts = count_tags(sets.iter().map(Vec::as_slice));
    assert_eq!(
        counts.iter().map(|(k, _)| k).collect::<Vec<_>>(),
        vec!["z", "a", "m"]
    );
}
