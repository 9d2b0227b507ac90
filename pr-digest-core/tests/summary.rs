use chrono::{TimeZone, Utc};
use chrono_tz::Tz;

use pr_digest_core::analysis::{count_tags, AnalysisResult, DiffStat, PullRequestDigest, TagCounts};
use pr_digest_core::classify::IncludedFile;
use pr_digest_core::summary::{
    build_llm_input, build_rule_summary, build_summary_user_prompt, clean_body, format_counts,
    format_period_label, truncate_text, LlmInputLimits, DOMAIN_LABELS,
};

fn included(name: &str) -> IncludedFile {
    IncludedFile {
        filename: name.to_string(),
        additions: 1,
        deletions: 0,
        changes: 1,
        status: "added".to_string(),
    }
}

fn sample_pr() -> PullRequestDigest {
    PullRequestDigest {
        number: 1,
        title: "Test".to_string(),
        url: "https://example.com/pr/1".to_string(),
        body: "Hello <!--comment-->world 123".to_string(),
        merged_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        author: "octocat".to_string(),
        analysis: AnalysisResult {
            included_files: vec![included("a.ts"), included("b.ts"), included("c.ts")],
            excluded_files: vec![],
            domain_tags: vec!["checkout".to_string()],
            signal_tags: vec!["pricing".to_string()],
            diff_stat: DiffStat {
                additions: 1,
                deletions: 0,
                changes: 1,
            },
        },
    }
}

fn counts(pairs: &[(&str, usize)]) -> TagCounts {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn llm_input_cleans_truncates_and_limits_files() {
    let prs = vec![sample_pr()];
    let input = build_llm_input(
        "period",
        &prs,
        &counts(&[("checkout", 1)]),
        &counts(&[("pricing", 1)]),
        LlmInputLimits {
            max_body_chars: 5,
            max_files_per_pr: 2,
        },
        "Asia/Seoul".parse::<Tz>().unwrap(),
    );

    assert_eq!(input.period, "period");
    assert_eq!(input.total_prs, 1);
    assert_eq!(input.prs[0].body, "Hello…");
    assert_eq!(input.prs[0].files, vec!["a.ts", "b.ts"]);
    assert_eq!(input.prs[0].merged_date, "2024-01-01");
    assert_eq!(input.prs[0].merged_day_label, "Monday");
    assert_eq!(input.prs[0].merged_at, "2024-01-01T00:00:00Z");
}

#[test]
fn llm_input_day_label_follows_the_timezone() {
    let mut pr = sample_pr();
    pr.merged_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap());
    let input = build_llm_input(
        "p",
        &[pr],
        &TagCounts::default(),
        &TagCounts::default(),
        LlmInputLimits::default(),
        "Asia/Seoul".parse::<Tz>().unwrap(),
    );
    assert_eq!(input.prs[0].merged_date, "2024-01-02");
    assert_eq!(input.prs[0].merged_day_label, "Tuesday");
}

#[test]
fn llm_input_leaves_dates_empty_without_merge_time() {
    let mut pr = sample_pr();
    pr.merged_at = None;
    let input = build_llm_input(
        "p",
        &[pr],
        &TagCounts::default(),
        &TagCounts::default(),
        LlmInputLimits::default(),
        Tz::UTC,
    );
    assert_eq!(input.prs[0].merged_at, "");
    assert_eq!(input.prs[0].merged_date, "");
    assert_eq!(input.prs[0].merged_day_label, "");
}

#[test]
fn llm_input_serializes_camel_case() {
    let input = build_llm_input(
        "p",
        &[sample_pr()],
        &counts(&[("checkout", 1)]),
        &TagCounts::default(),
        LlmInputLimits::default(),
        Tz::UTC,
    );
    let json = serde_json::to_value(&input).unwrap();
    assert_eq!(json["totalPrs"], 1);
    assert_eq!(json["domainCounts"]["checkout"], 1);
    assert_eq!(json["prs"][0]["diffStat"]["additions"], 1);
    assert_eq!(json["prs"][0]["mergedDayLabel"], "Monday");
}

#[test]
fn rule_summary_mentions_total_and_domains() {
    let summary = build_rule_summary(2, &counts(&[("checkout", 2)]));
    assert!(summary.contains("- 2 pull requests were merged in this period."));
    assert!(summary.contains("Main domains: Checkout/Orders 2"));
    assert!(summary.contains("Business impact"));
}

#[test]
fn rule_summary_skips_domain_line_without_counts() {
    let summary = build_rule_summary(0, &TagCounts::default());
    assert!(!summary.contains("Main domains"));
    assert_eq!(summary.lines().count(), 2);
}

#[test]
fn format_counts_sorts_by_count_and_uses_labels() {
    let result = format_counts(&counts(&[("a", 2), ("b", 1), ("c", 1)]), &[("a", "A"), ("b", "B")]);
    assert_eq!(result, "A 2, B 1, c 1");
}

#[test]
fn format_counts_keeps_the_top_five() {
    let tags: Vec<Vec<String>> = (0..7)
        .map(|i| (0..=i).map(|j| format!("t{j}")).collect())
        .collect();
    let result = format_counts(&count_tags(tags.iter().map(Vec::as_slice)), DOMAIN_LABELS);
    assert_eq!(result, "t0 7, t1 6, t2 5, t3 4, t4 3");
}

#[test]
fn period_label_uses_the_timezone() {
    let label = format_period_label(
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 30, 0).unwrap(),
        "Asia/Seoul".parse::<Tz>().unwrap(),
    );
    assert_eq!(label, "2024-01-02 09:00 ~ 2024-01-02 12:30 (Asia/Seoul)");
}

#[test]
fn user_prompt_embeds_pretty_json_and_headers() {
    let prompt = build_summary_user_prompt(&serde_json::json!({ "totalPrs": 1 }));
    assert!(prompt.contains("JSON:"));
    assert!(prompt.contains("*Code changes*"));
    assert!(prompt.contains("\"totalPrs\": 1"));
}

#[test]
fn body_helpers() {
    assert_eq!(clean_body("  <!-- a\nmulti-line hint -->\nDetails  "), "Details");
    assert_eq!(truncate_text("short", 10), "short");
    assert_eq!(truncate_text("", 0), "");
    assert_eq!(truncate_text("할인가격", 2), "할인…");
}
