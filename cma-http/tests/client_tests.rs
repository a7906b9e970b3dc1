mod common;

use cma_core::{ActionDescriptor, CmaError, Headers, Params, VERSION_HEADER};
use cma_http::{ClientConfig, create_client};
use common::{bound_config, first_header, mock_config};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Construction ────────────────────────────────────────────────

#[test]
fn missing_token_fails_before_any_request() {
    let err = create_client(ClientConfig::default()).unwrap_err();
    assert!(matches!(err, CmaError::Config(_)));
}

#[test]
fn client_carries_defaults_and_user_agent() {
    let config = ClientConfig {
        application: Some("blog/1.0".to_string()),
        ..ClientConfig::new("token")
    };
    let client = create_client(config.clone()).unwrap();
    assert_eq!(client.user_agent(), Some(config.user_agent().as_str()));
    assert!(client.defaults().is_empty());
}

// ── Bound calls over HTTP ───────────────────────────────────────

#[tokio::test]
async fn bound_entry_get_uses_configured_space_and_environment() {
    let server = MockServer::start().await;
    let config = bound_config(&server);
    Mock::given(method("GET"))
        .and(path("/spaces/A/environments/master/entries/e1"))
        .and(header("X-Contentful-User-Agent", config.user_agent().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sys": {"id": "e1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(config).unwrap();
    let entry = client
        .bind("Entry", "get")
        .call(Params::new().with("entryId", "e1"), None, Headers::new())
        .await
        .unwrap();

    assert_eq!(entry, json!({"sys": {"id": "e1"}}));
}

#[tokio::test]
async fn explicit_space_wins_over_configured_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces/B"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sys": {"id": "B"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(bound_config(&server)).unwrap();
    client
        .call("Space", "get", Params::new().with("spaceId", "B"), None, Headers::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn get_many_sends_normalized_selection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces/A/environments/master/entries"))
        .and(query_param("select", "fields.title,sys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 0, "skip": 0, "limit": 100, "items": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(bound_config(&server)).unwrap();
    client
        .bind("Entry", "getMany")
        .call(
            Params::new().with("query", json!({"select": "fields.title"})),
            None,
            Headers::new(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn update_sends_version_header_and_body_without_sys() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/spaces/A/environments/master/entries/e1"))
        .and(header(VERSION_HEADER, "3"))
        .and(body_json(json!({"fields": {"title": {"en-US": "Hi"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sys": {"version": 4}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(bound_config(&server)).unwrap();
    let updated = client
        .bind("Entry", "update")
        .call(
            Params::new().with("entryId", "e1"),
            Some(json!({"sys": {"id": "e1", "version": 3}, "fields": {"title": {"en-US": "Hi"}}}).into()),
            Headers::new(),
        )
        .await
        .unwrap();

    assert_eq!(updated["sys"]["version"], 4);
}

#[tokio::test]
async fn remote_errors_surface_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "sys": {"type": "Error", "id": "NotFound"},
            "message": "The resource could not be found."
        })))
        .mount(&server)
        .await;

    let client = create_client(bound_config(&server)).unwrap();
    let err = client
        .bind("Entry", "delete")
        .call(Params::new().with("entryId", "gone"), None, Headers::new())
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(404));
    assert!(err.to_string().contains("NotFound"));
}

#[tokio::test]
async fn caller_user_agent_in_lowercase_is_replaced() {
    let server = MockServer::start().await;
    let config = mock_config(&server);
    Mock::given(method("GET"))
        .and(path("/spaces/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sys": {"id": "s1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = Headers::new();
    headers.insert("x-contentful-user-agent".to_string(), "stale".to_string());
    let client = create_client(config.clone()).unwrap();
    client
        .raw(
            ActionDescriptor::new("Space", "get")
                .params(Params::new().with("spaceId", "s1"))
                .headers(headers),
        )
        .await
        .unwrap();

    assert_eq!(
        first_header(&server, "x-contentful-user-agent").await,
        Some(config.user_agent())
    );
}

#[tokio::test]
async fn unknown_endpoint_sends_nothing() {
    let server = MockServer::start().await;
    let client = create_client(mock_config(&server)).unwrap();

    let err = client
        .raw(ActionDescriptor::new("Entry", "explode"))
        .await
        .unwrap_err();

    assert!(err.is_routing_error());
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Asset processing over HTTP ──────────────────────────────────

fn asset(url: Option<&str>) -> serde_json::Value {
    let mut file = json!({"upload": "https://upload.example/a.png", "fileName": "a.png"});
    if let Some(url) = url {
        file["url"] = json!(url);
    }
    json!({
        "sys": {"id": "a1", "version": 2},
        "fields": {"file": {"en-US": file}}
    })
}

#[tokio::test]
async fn process_for_all_locales_polls_until_processed() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/spaces/A/environments/master/assets/a1/files/en-US/process"))
        .and(header(VERSION_HEADER, "2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/spaces/A/environments/master/assets/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(asset(None)))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/spaces/A/environments/master/assets/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(asset(Some("//assets.example/a.png"))))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(bound_config(&server)).unwrap();
    let processed = client
        .bind("Asset", "processForAllLocales")
        .call(
            Params::new()
                .with("asset", asset(None))
                .with("options", json!({"processingCheckWait": 5})),
            None,
            Headers::new(),
        )
        .await
        .unwrap();

    assert_eq!(processed["fields"]["file"]["en-US"]["url"], "//assets.example/a.png");
    assert!(first_header(&server, "x-contentful-user-agent").await.is_some());
}

#[tokio::test]
async fn processing_times_out_after_the_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(asset(None)))
        .expect(3)
        .mount(&server)
        .await;

    let client = create_client(bound_config(&server)).unwrap();
    let err = client
        .bind("Asset", "processForLocale")
        .call(
            Params::new()
                .with("asset", asset(None))
                .with("locale", "en-US")
                .with(
                    "options",
                    json!({"processingCheckWait": 1, "processingCheckRetries": 2}),
                ),
            None,
            Headers::new(),
        )
        .await
        .unwrap_err();

    assert!(err.is_processing_timeout());
}
