use pr_digest::slack::SlackWebhook;
use pr_digest_core::analysis::TagCounts;
use pr_digest_core::contract::ReportSink;
use pr_digest_core::report::build_report_message;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn posts_blocks_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(json!({
            "blocks": [
                { "type": "header", "text": { "type": "plain_text", "text": "PR summary (this week)" } },
                { "type": "section", "text": { "type": "mrkdwn", "text": "quiet week" } }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let message = build_report_message("this week", "quiet week", &TagCounts::default(), &[], &[], 8);
    let sink = SlackWebhook::new(&format!("{}/hook", server.uri()));

    sink.post(&message).await.expect("post succeeds");
}

#[tokio::test]
async fn rejected_post_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_blocks"))
        .mount(&server)
        .await;

    let message = build_report_message("this week", "quiet week", &TagCounts::default(), &[], &[], 8);
    let sink = SlackWebhook::new(&format!("{}/hook", server.uri()));

    let err = sink.post(&message).await.unwrap_err();
    assert!(err.to_string().contains("400"));
    assert!(err.to_string().contains("invalid_blocks"));
}
