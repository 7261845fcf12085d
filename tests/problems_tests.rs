use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Url;

mod common;

const PROBLEM_SET: &str = r#"{"activityName":"Custom Parsons Problem","problems":[{"prompt":"Split a bill.","blocks":[{"id":"a","code":"let tip = cost * rate;"},{"id":"b","code":"let total = cost + tip;"},{"id":"c","code":"let total = cost - tip;"}],"correctOrder":["a","b"]}]}"#;

/// Build a `/generate-problems` URI with the JSON base64-encoded and query-escaped.
fn problems_uri(spec_json: &str) -> String {
    let mut url = Url::parse("http://localhost/generate-problems").unwrap();
    url.query_pairs_mut()
        .append_pair("specification", &STANDARD.encode(spec_json));
    format!("{}?{}", url.path(), url.query().unwrap_or_default())
}

#[tokio::test]
async fn test_problem_set_is_relayed_byte_identical() {
    let client = common::MockClient::replying(PROBLEM_SET);
    let app = common::create_test_app(client.clone());

    let uri = problems_uri(r#"{"topics":["Arithmetic"],"num_problems":1}"#);
    let (status, body) = common::get(&app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), PROBLEM_SET);
}

#[tokio::test]
async fn test_prompt_carries_topics_count_and_user_turn() {
    let spec = r#"{"topics":["Loops","Recursion"],"num_problems":3}"#;
    let client = common::MockClient::replying(PROBLEM_SET);
    let app = common::create_test_app(client.clone());

    let (status, _) = common::get(&app, &problems_uri(spec)).await;
    assert_eq!(status, StatusCode::OK);

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    let messages = &calls[0];
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "system");
    assert!(messages[0].content.contains("based on the following topics: Loops, Recursion."));
    assert!(messages[0].content.contains("exactly 3 problems."));
    assert!(messages[0].content.contains("No block should contain comments."));
    assert_eq!(messages[1].role, "user");
    assert_eq!(messages[1].content, spec);
}

#[tokio::test]
async fn test_missing_num_problems_defaults_to_one() {
    let client = common::MockClient::replying(PROBLEM_SET);
    let app = common::create_test_app(client.clone());

    let (status, _) = common::get(&app, &problems_uri(r#"{"topics":["Strings"]}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(client.calls()[0][0].content.contains("exactly 1 problems."));
}

#[tokio::test]
async fn test_missing_topics_builds_prompt_with_empty_list() {
    let client = common::MockClient::replying(PROBLEM_SET);
    let app = common::create_test_app(client.clone());

    let (status, _) = common::get(&app, &problems_uri(r#"{"num_problems":2}"#)).await;

    assert_eq!(status, StatusCode::OK);
    let system = &client.calls()[0][0].content;
    assert!(system.contains("based on the following topics: ."));
    assert!(system.contains("exactly 2 problems."));
}

#[tokio::test]
async fn test_bad_base64_returns_500_without_upstream_call() {
    let client = common::MockClient::replying(PROBLEM_SET);
    let app = common::create_test_app(client.clone());

    let (status, body) = common::get_json(&app, "/generate-problems?specification=%25%25not-base64%25%25").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("Error generating problems"), "{detail}");
    assert!(detail.contains("invalid base64"), "{detail}");
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_bad_spec_json_returns_500() {
    let client = common::MockClient::replying(PROBLEM_SET);
    let app = common::create_test_app(client.clone());

    let (status, body) = common::get_json(&app, &problems_uri("topics: [loops]")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error generating problems: invalid specification JSON"), "{detail}");
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_returns_500_with_message() {
    let client = common::MockClient::failing(429, "Rate limit reached");
    let app = common::create_test_app(client);

    let (status, body) = common::get_json(&app, &problems_uri(r#"{"topics":["Maps"]}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["detail"],
        "Error generating problems: OpenAI HTTP 429: Rate limit reached"
    );
}

#[tokio::test]
async fn test_unvalidated_shape_passes_through_by_default() {
    let odd = r#"{"activityName":"x","problems":"not a list"}"#;
    let client = common::MockClient::replying(odd);
    let app = common::create_test_app(client);

    let (status, body) = common::get(&app, &problems_uri(r#"{"num_problems":1}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), odd);
}

#[tokio::test]
async fn test_validation_rejects_wrong_problem_count_when_enabled() {
    let client = common::MockClient::replying(PROBLEM_SET);
    let app = common::create_test_app_with(client, true);

    let (status, body) = common::get_json(&app, &problems_uri(r#"{"num_problems":2}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("model returned an invalid problem set: expected 2 problems, got 1"), "{detail}");
}

#[tokio::test]
async fn test_validation_accepts_and_still_relays_verbatim() {
    let client = common::MockClient::replying(PROBLEM_SET);
    let app = common::create_test_app_with(client, true);

    let (status, body) = common::get(&app, &problems_uri(r#"{"num_problems":1}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), PROBLEM_SET);
}
