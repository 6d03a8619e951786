//! GraphQL client against a mock HTTP server.

use std::time::{Duration, Instant};

use linctl::{CancellationToken, Error, GraphQLClient, GraphQLRequest, TransportError};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

const TOKEN: &str = "Bearer test-token";

/// Test fixture that owns a mock server and a client pointed at it.
struct Fixture {
    server: ServerGuard,
    client: GraphQLClient,
}

impl Fixture {
    async fn new() -> Self {
        let server = Server::new_async().await;
        let client = GraphQLClient::builder()
            .endpoint(format!("{}/graphql", server.url()))
            .auth_header(TOKEN)
            .build()
            .expect("client");
        Self { server, client }
    }

    async fn mock_json(&mut self, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", "/graphql")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

/// A TCP listener that accepts connections and never answers.
async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}/graphql")
}

#[tokio::test]
async fn sends_post_with_json_and_auth_headers() {
    let mut fx = Fixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/graphql")
        .match_header("content-type", "application/json")
        .match_header("authorization", TOKEN)
        .match_header("x-request-id", Matcher::Regex("^[0-9a-f-]{36}$".to_string()))
        .with_status(200)
        .with_body(r#"{"data":{"viewer":{"id":"u1"}}}"#)
        .create_async()
        .await;

    fx.client
        .execute("{ viewer { id } }", None)
        .await
        .expect("execute");
    mock.assert_async().await;
}

#[tokio::test]
async fn success_exposes_data() {
    #[derive(Deserialize)]
    struct Viewer {
        id: String,
    }
    #[derive(Deserialize)]
    struct Data {
        viewer: Viewer,
    }

    let mut fx = Fixture::new().await;
    let _m = fx
        .mock_json(200, r#"{"data":{"viewer":{"id":"u1"}}}"#)
        .await;

    let resp = fx.client.execute("{ viewer { id } }", None).await.unwrap();
    assert!(!resp.has_errors());
    assert!(resp.errors.is_none());
    let data: Data = resp.data_as().unwrap().unwrap();
    assert_eq!(data.viewer.id, "u1");
}

#[tokio::test]
async fn graphql_errors_are_returned_not_raised() {
    let mut fx = Fixture::new().await;
    let _m = fx
        .mock_json(200, r#"{"data":null,"errors":[{"message":"bad field"}]}"#)
        .await;

    let resp = fx
        .client
        .execute("{ viewer { invalid } }", None)
        .await
        .expect("GraphQL errors must not fail execute");
    assert!(resp.data().is_none());
    assert_eq!(resp.errors().len(), 1);
    assert_eq!(resp.errors()[0].message, "bad field");
}

#[tokio::test]
async fn partial_data_and_errors_both_survive() {
    let mut fx = Fixture::new().await;
    let _m = fx
        .mock_json(
            200,
            r#"{
                "data": {"viewer": {"id": "u1", "organization": null}},
                "errors": [{
                    "message": "Field 'invalid' doesn't exist on type 'Viewer'",
                    "locations": [{"line": 1, "column": 10}],
                    "path": ["viewer", "organization"],
                    "extensions": {"code": "FIELD_NOT_FOUND"}
                }]
            }"#,
        )
        .await;

    let resp = fx.client.execute("{ viewer { id } }", None).await.unwrap();
    let data: Value = resp.data_as().unwrap().unwrap();
    assert_eq!(data["viewer"]["id"], "u1");
    let err = &resp.errors()[0];
    assert_eq!(err.locations()[0].line, 1);
    assert_eq!(err.locations()[0].column, 10);
    assert_eq!(err.extension("code"), Some(json!("FIELD_NOT_FOUND")));
}

#[tokio::test]
async fn unauthorized_is_http_status_error() {
    let mut fx = Fixture::new().await;
    let _m = fx.mock_json(401, "Unauthorized").await;

    let err = fx
        .client
        .execute("{ viewer { id } }", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 401, .. }));
    assert_eq!(err.body(), Some("Unauthorized"));
}

#[tokio::test]
async fn non_2xx_wins_even_with_valid_envelope() {
    let mut fx = Fixture::new().await;
    let _m = fx
        .mock_json(
            401,
            r#"{"data":{"viewer":{"id":"u1"}},"errors":[{"message":"Authentication required"}]}"#,
        )
        .await;

    let err = fx
        .client
        .execute("{ viewer { id } }", None)
        .await
        .unwrap_err();
    match err {
        Error::HttpStatus { status, envelope, .. } => {
            assert_eq!(status, 401);
            let envelope = envelope.expect("parsed envelope attached");
            assert_eq!(envelope.errors()[0].message, "Authentication required");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn large_error_body_is_truncated() {
    let mut fx = Fixture::new().await;
    let body = "x".repeat(4096);
    let _m = fx.mock_json(500, &body).await;

    let err = fx.client.execute("{ a }", None).await.unwrap_err();
    let snippet = err.body().unwrap();
    assert!(snippet.len() < body.len());
    assert!(snippet.starts_with("xxxx"));
}

#[tokio::test]
async fn invalid_json_body_is_decode_error() {
    let mut fx = Fixture::new().await;
    let _m = fx.mock_json(200, "<html>maintenance</html>").await;

    let err = fx.client.execute("{ a }", None).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(err.body(), Some("<html>maintenance</html>"));
}

#[tokio::test]
async fn wrong_envelope_shape_is_decode_error() {
    let mut fx = Fixture::new().await;
    let _m = fx.mock_json(200, r#"{"data":null,"errors":"oops"}"#).await;

    let err = fx.client.execute("{ a }", None).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn invalid_utf8_body_is_decode_error() {
    let mut fx = Fixture::new().await;
    let mut body = br#"{"data":{"name":""#.to_vec();
    body.push(0xFF);
    body.extend_from_slice(br#""}}"#);
    let _m = fx
        .server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    let err = fx.client.execute("{ name }", None).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn envelope_extras_survive_reserialization() {
    let mut fx = Fixture::new().await;
    let body = r#"{"data":{"a":1},"extensions":{"cost":123456789012345678901234567890},"hasNext":false}"#;
    let _m = fx.mock_json(200, body).await;

    let resp = fx.client.execute("{ a }", None).await.unwrap();
    assert_eq!(serde_json::to_string(&resp).unwrap(), body);
}

#[tokio::test]
async fn absent_variables_are_not_sent() {
    let mut fx = Fixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/graphql")
        .match_body(Matcher::Json(json!({ "query": "{ viewer { id } }" })))
        .with_status(200)
        .with_body(r#"{"data":{}}"#)
        .create_async()
        .await;

    fx.client.execute("{ viewer { id } }", None).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn variables_round_trip_verbatim() {
    let mut fx = Fixture::new().await;
    let query = "query($id: String!) { issue(id: $id) { id } }";
    let mock = fx
        .server
        .mock("POST", "/graphql")
        .match_body(Matcher::Json(json!({
            "query": query,
            "variables": { "id": "x" }
        })))
        .with_status(200)
        .with_body(r#"{"data":{"issue":{"id":"x"}}}"#)
        .create_async()
        .await;

    let mut vars = Map::new();
    vars.insert("id".to_string(), json!("x"));
    let resp = fx.client.execute(query, Some(vars)).await.unwrap();
    mock.assert_async().await;
    assert!(resp.data().is_some());
}

#[tokio::test]
async fn operation_name_is_sent_when_set() {
    let mut fx = Fixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({ "operationName": "Me" })))
        .with_status(200)
        .with_body(r#"{"data":{}}"#)
        .create_async()
        .await;

    let request = GraphQLRequest::new("query Me { viewer { id } }")
        .unwrap()
        .with_operation_name(Some("Me".to_string()));
    fx.client.execute_request(&request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn blank_query_never_reaches_server() {
    let mut fx = Fixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/graphql")
        .expect(0)
        .create_async()
        .await;

    let err = fx.client.execute("   ", None).await.unwrap_err();
    assert!(matches!(err, Error::EmptyQuery { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn concurrent_executes_share_one_client() {
    let mut fx = Fixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(r#"{"data":{"ok":true}}"#)
        .expect(5)
        .create_async()
        .await;

    let calls = (0..5).map(|_| {
        let client = fx.client.clone();
        async move { client.execute("{ ok }", None).await }
    });
    let results = futures::future::join_all(calls).await;
    assert!(results.iter().all(|r| r.is_ok()));
    mock.assert_async().await;
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GraphQLClient::builder()
        .endpoint(format!("http://{addr}/graphql"))
        .auth_header(TOKEN)
        .build()
        .unwrap();
    let err = client.execute("{ a }", None).await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Http(_))));
}

#[tokio::test]
async fn cancellation_returns_promptly() {
    let endpoint = silent_server().await;
    let client = GraphQLClient::builder()
        .endpoint(endpoint)
        .auth_header(TOKEN)
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = client
        .execute_with_cancel("{ a }", None, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn deadline_surfaces_as_timeout() {
    let endpoint = silent_server().await;
    let client = GraphQLClient::builder()
        .endpoint(endpoint)
        .auth_header(TOKEN)
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = client.execute("{ a }", None).await.unwrap_err();
    match err {
        Error::Transport(e) => assert!(e.is_timeout(), "expected timeout, got {e}"),
        other => panic!("expected transport error, got {other:?}"),
    }
}
