use serde_json::json;
use std::time::Duration;
use taxsync_core::error::TaxError;
use taxsync_core::remote::{Method, Operation, Params, StateSyncClient};
use taxsync_interaction::HttpStateSyncClient;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_read_without_params_sends_bare_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [["Engineer", true, 120000.0, 1, 0]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpStateSyncClient::new(server.uri());
    let fields = client.call(Operation::GetJobs, Params::new()).await.unwrap();

    assert_eq!(
        fields.raw("jobs"),
        Some(&json!([["Engineer", true, 120000.0, 1, 0]]))
    );
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_read_with_params_uses_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_period_multiplier"))
        .and(query_param("period", "biweekly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"multiplier": 26})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpStateSyncClient::new(format!("{}/", server.uri()));
    let fields = client
        .invoke(
            "get_period_multiplier",
            Method::Read,
            Params::new().with("period", "biweekly"),
        )
        .await
        .unwrap();

    assert_eq!(fields.get::<i64>("multiplier").unwrap(), 26);
}

#[tokio::test]
async fn test_write_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add_deduct"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"desc": "Charity", "amount": 250.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpStateSyncClient::new(server.uri());
    let result = client
        .call(
            Operation::AddDeduct,
            Params::new().with("desc", "Charity").with("amount", 250.0),
        )
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_non_success_status_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/remove_job"))
        .respond_with(ResponseTemplate::new(422).set_body_string("index: field required"))
        .mount(&server)
        .await;

    let client = HttpStateSyncClient::new(server.uri());
    let err = client
        .call(Operation::RemoveJob, Params::new())
        .await
        .unwrap_err();

    assert_eq!(err, TaxError::protocol(422, "index: field required"));
}

#[tokio::test]
async fn test_success_false_is_application_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/set_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let client = HttpStateSyncClient::new(server.uri());
    let err = client
        .call(Operation::SetStatus, Params::new().with("status", "Q"))
        .await
        .unwrap_err();

    assert!(err.is_application());
    assert!(err.to_string().contains("set_status"));
}

#[tokio::test]
async fn test_write_without_success_flag_is_application_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add_rcredit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let client = HttpStateSyncClient::new(server.uri());
    let err = client
        .call(
            Operation::AddRcredit,
            Params::new().with("desc", "EITC").with("amount", 600.0),
        )
        .await
        .unwrap_err();

    assert!(err.is_application());
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpStateSyncClient::new(format!("http://{}", addr)).with_timeout(Duration::from_secs(2));
    let err = client
        .call(Operation::Calculate, Params::new())
        .await
        .unwrap_err();

    assert!(err.is_transport(), "unexpected error: {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calculate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = HttpStateSyncClient::new(server.uri());
    let err = client
        .call(Operation::Calculate, Params::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TaxError::Serialization { .. }));
}
