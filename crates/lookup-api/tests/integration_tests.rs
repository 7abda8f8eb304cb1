//! # Integration Tests for lookup-api
//!
//! Drives the full router with `oneshot`. wiremock plays the data layer;
//! inbound tokens are HS256 JWTs minted here. Zero-call expectations
//! (`.expect(0)`) prove that rejected requests never reach the data layer.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroize::Zeroizing;

use lookup_api::auth::TokenVerifier;
use lookup_api::config::{AppConfig, AuthSettings, RoutingMode};
use lookup_api::state::AppState;
use lookup_data_client::{
    DataLayerClient, DataLayerConfig, IdentityTokenProvider, StaticTokenProvider, TokenError,
};

const SECRET: &[u8] = b"integration-secret";
const AUDIENCE: &str = "https://lookup-codes-ol.a.run.app";
const OUTBOUND: &str = "Bearer outbound-token";

// -- Helpers -----------------------------------------------------------------

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn mint(claims: Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

/// `Authorization` value for a valid token issued to `sub`.
fn bearer(sub: &str) -> String {
    let token = mint(json!({"sub": sub, "aud": AUDIENCE, "exp": now() + 600}));
    format!("Bearer {token}")
}

struct RecordingProvider {
    audiences: Mutex<Vec<String>>,
}

#[async_trait]
impl IdentityTokenProvider for RecordingProvider {
    async fn fetch_identity_token(&self, audience: &str) -> Result<Zeroizing<String>, TokenError> {
        self.audiences.lock().unwrap().push(audience.to_string());
        Ok(Zeroizing::new("outbound-token".to_string()))
    }
}

struct FailingProvider;

#[async_trait]
impl IdentityTokenProvider for FailingProvider {
    async fn fetch_identity_token(&self, _audience: &str) -> Result<Zeroizing<String>, TokenError> {
        Err(TokenError::Status {
            status: 500,
            body: "metadata server unavailable".into(),
        })
    }
}

fn data_layer_base(mock_server: &MockServer) -> String {
    format!("{}/codes", mock_server.uri())
}

fn build_app(
    mode: RoutingMode,
    mock_server: &MockServer,
    tokens: Arc<dyn IdentityTokenProvider>,
    auth: bool,
) -> axum::Router {
    let data_layer = DataLayerConfig::new(&data_layer_base(mock_server)).unwrap();
    let config = AppConfig {
        port: 8080,
        context_root: "lookup-codes".into(),
        routing_mode: mode,
        auth: auth.then(|| AuthSettings {
            audience: AUDIENCE.into(),
            secret_key: Some(Zeroizing::new("integration-secret".into())),
            jwks_url: None,
            issuers: Vec::new(),
        }),
        data_layer: data_layer.clone(),
    };
    config.validate().unwrap();

    let client = DataLayerClient::new(data_layer, tokens).unwrap();
    let verifier = auth.then(|| TokenVerifier::from_secret(SECRET, AUDIENCE));
    lookup_api::app(AppState::new(config, client, verifier))
}

/// Identity-scoped app with auth enabled and a static outbound token.
fn identity_app(mock_server: &MockServer) -> axum::Router {
    build_app(
        RoutingMode::Identity,
        mock_server,
        Arc::new(StaticTokenProvider::new("outbound-token")),
        true,
    )
}

/// Project-scoped app with auth enabled and a static outbound token.
fn project_app(mock_server: &MockServer) -> axum::Router {
    build_app(
        RoutingMode::Project,
        mock_server,
        Arc::new(StaticTokenProvider::new("outbound-token")),
        true,
    )
}

async fn send(
    app: axum::Router,
    method: Method,
    uri: &str,
    authorization: Option<&str>,
    body: Option<&str>,
) -> axum::http::Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("Authorization", value);
    }
    let request = match body {
        Some(b) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json_of(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// Mount a catch-all mock that must never be hit.
async fn forbid_data_layer_calls(mock_server: &MockServer) {
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(mock_server)
        .await;
}

// -- Health Probes & Documentation ---------------------------------------------

#[tokio::test]
async fn test_health_probes_need_no_credentials() {
    let mock_server = MockServer::start().await;

    let response = send(identity_app(&mock_server), Method::GET, "/health/liveness", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");

    let response =
        send(identity_app(&mock_server), Method::GET, "/health/readiness", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn test_openapi_served_for_configured_root() {
    let mock_server = MockServer::start().await;

    let response = send(identity_app(&mock_server), Method::GET, "/openapi.json", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json_of(response).await;
    assert_eq!(spec["info"]["title"], "Lookup Codes orchestration API");
    assert!(spec["paths"]["/lookup-codes/{item_id}"].is_object());
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    let response = send(identity_app(&mock_server), Method::GET, "/nope", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json_of(response).await, json!({"message": "Not found"}));
}

// -- Preflight & CORS ------------------------------------------------------------

#[tokio::test]
async fn test_options_returns_empty_200_without_credentials() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    for uri in ["/lookup-codes", "/lookup-codes/X9", "/somewhere/else"] {
        let response = send(identity_app(&mock_server), Method::OPTIONS, uri, None, None).await;
        assert_eq!(response.status(), StatusCode::OK, "OPTIONS {uri}");
        assert_eq!(body_string(response).await, "", "OPTIONS {uri}");
    }
}

#[tokio::test]
async fn test_cors_preflight_mirrors_origin_with_credentials() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    let response = identity_app(&mock_server)
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/lookup-codes")
                .header("Origin", "https://console.example.com")
                .header("Access-Control-Request-Method", "POST")
                .header("Access-Control-Request-Headers", "authorization,content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "https://console.example.com"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn test_cors_headers_on_authenticated_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/codes/user-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = identity_app(&mock_server)
        .oneshot(
            Request::builder()
                .uri("/lookup-codes")
                .header("Origin", "https://console.example.com")
                .header("Authorization", bearer("user-123"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://console.example.com"
    );
}

// -- Authentication --------------------------------------------------------------

#[tokio::test]
async fn test_bad_or_missing_token_is_401_and_never_forwarded() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    let wrong_audience = format!(
        "Bearer {}",
        mint(json!({"sub": "user-123", "aud": "https://other.a.run.app", "exp": now() + 600}))
    );
    let expired = format!(
        "Bearer {}",
        mint(json!({"sub": "user-123", "aud": AUDIENCE, "exp": now() - 3600}))
    );

    let cases: [(Method, &str, Option<&str>, Option<&str>); 6] = [
        (Method::GET, "/lookup-codes", None, None),
        (Method::GET, "/lookup-codes", Some("Bearer not-a-jwt"), None),
        (Method::GET, "/lookup-codes/X9", Some("Basic dXNlcjpwYXNz"), None),
        (Method::POST, "/lookup-codes", Some(wrong_audience.as_str()), Some(r#"{"code":"A1","value":"hello"}"#)),
        (Method::PUT, "/lookup-codes/X9", Some(expired.as_str()), Some(r#"{"value":"v2"}"#)),
        // Invalid body and missing credential: auth is checked first.
        (Method::POST, "/lookup-codes", None, Some(r#"{"code":""}"#)),
    ];

    for (m, uri, auth, body) in cases {
        let response = send(identity_app(&mock_server), m.clone(), uri, auth, body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{m} {uri}");
        assert_eq!(
            body_json_of(response).await,
            json!({"message": "Unauthorized"})
        );
    }
}

// -- Identity-scoped: read ---------------------------------------------------------

#[tokio::test]
async fn test_get_collection_scoped_to_subject() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/codes/user-123"))
        .and(header("authorization", OUTBOUND))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"code": "A1", "value": "hello"}])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = send(
        identity_app(&mock_server),
        Method::GET,
        "/lookup-codes",
        Some(&bearer("user-123")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json_of(response).await,
        json!([{"code": "A1", "value": "hello"}])
    );
}

#[tokio::test]
async fn test_get_item_scoped_to_subject() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/codes/user-456/X9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "X9", "value": "v"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = send(
        identity_app(&mock_server),
        Method::GET,
        "/lookup-codes/X9",
        Some(&bearer("user-456")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json_of(response).await["code"], "X9");
}

#[tokio::test]
async fn test_get_relays_downstream_error_body_as_200() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/codes/user-123/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "no such item"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = send(
        identity_app(&mock_server),
        Method::GET,
        "/lookup-codes/missing",
        Some(&bearer("user-123")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json_of(response).await, json!({"error": "no such item"}));
}

#[tokio::test]
async fn test_non_json_downstream_body_is_500() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let response = send(
        identity_app(&mock_server),
        Method::GET,
        "/lookup-codes",
        Some(&bearer("user-123")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json_of(response).await,
        json!({"message": "Internal server error"})
    );
}

// -- Identity-scoped: create -------------------------------------------------------

#[tokio::test]
async fn test_post_forwards_body_to_subject_scope() {
    let mock_server = MockServer::start().await;
    let payload = json!({"code": "A1", "value": "hello"});
    Mock::given(method("POST"))
        .and(path("/codes/user-123"))
        .and(header("authorization", OUTBOUND))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "A1", "created": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = send(
        identity_app(&mock_server),
        Method::POST,
        "/lookup-codes",
        Some(&bearer("user-123")),
        Some(r#"{"code":"A1","value":"hello"}"#),
    )
    .await;
    // Downstream 201 is relayed as 200 with the downstream body.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json_of(response).await,
        json!({"id": "A1", "created": true})
    );
}

#[tokio::test]
async fn test_post_invalid_payloads_are_400_with_zero_calls() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    let bodies = [
        Some(r#"{"code":"A1"}"#),
        Some(r#"{"value":"hello"}"#),
        Some(r#"{"code":"A1","value":42}"#),
        Some(r#"{"code":"A1","value":null}"#),
        Some(r#"{"code":"","value":"hello"}"#),
        Some(r#"{"code":"A1","value":"hello","extra":true}"#),
        Some(r#"["A1","hello"]"#),
        Some("not json"),
        None,
    ];

    for body in bodies {
        let response = send(
            identity_app(&mock_server),
            Method::POST,
            "/lookup-codes",
            Some(&bearer("user-123")),
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(
            body_json_of(response).await,
            json!({"message": "Invalid data provided"})
        );
    }
}

// -- Identity-scoped: update -------------------------------------------------------

#[tokio::test]
async fn test_put_path_item_id_overrides_body_code() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/codes/user-123/X9"))
        .and(body_json(json!({"code": "X9", "value": "v2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "X9", "value": "v2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = send(
        identity_app(&mock_server),
        Method::PUT,
        "/lookup-codes/X9",
        Some(&bearer("user-123")),
        Some(r#"{"code":"ignored","value":"v2"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json_of(response).await["code"], "X9");
}

#[tokio::test]
async fn test_put_without_code_takes_it_from_path() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/codes/user-123/X9"))
        .and(body_json(json!({"code": "X9", "value": "v2"})))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"error": "conflict"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = send(
        identity_app(&mock_server),
        Method::PUT,
        "/lookup-codes/X9",
        Some(&bearer("user-123")),
        Some(r#"{"value":"v2"}"#),
    )
    .await;
    // Downstream status is not inspected on update.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json_of(response).await, json!({"error": "conflict"}));
}

#[tokio::test]
async fn test_put_without_body_is_no_data() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    for body in [None, Some(""), Some("null"), Some("{broken")] {
        let response = send(
            identity_app(&mock_server),
            Method::PUT,
            "/lookup-codes/X9",
            Some(&bearer("user-123")),
            body,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(
            body_json_of(response).await,
            json!({"message": "No data provided"})
        );
    }
}

#[tokio::test]
async fn test_put_invalid_value_is_400_with_zero_calls() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    for body in [r#"{"code":"X9"}"#, r#"{"value":7}"#, r#"[1]"#] {
        let response = send(
            identity_app(&mock_server),
            Method::PUT,
            "/lookup-codes/X9",
            Some(&bearer("user-123")),
            Some(body),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(
            body_json_of(response).await,
            json!({"message": "Invalid data provided"})
        );
    }
}

// -- Identity-scoped: delete -------------------------------------------------------

#[tokio::test]
async fn test_delete_is_idempotent_from_the_callers_view() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/codes/user-123/X9"))
        .and(header("authorization", OUTBOUND))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/codes/user-123/X9"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let first = send(
        identity_app(&mock_server),
        Method::DELETE,
        "/lookup-codes/X9",
        Some(&bearer("user-123")),
        None,
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json_of(first).await, json!({"message": "Item deleted"}));

    let second = send(
        identity_app(&mock_server),
        Method::DELETE,
        "/lookup-codes/X9",
        Some(&bearer("user-123")),
        None,
    )
    .await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json_of(second).await, json!({"message": "Item not found"}));
}

#[tokio::test]
async fn test_delete_other_statuses_are_500() {
    for downstream in [204, 400, 500, 503] {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(downstream))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = send(
            identity_app(&mock_server),
            Method::DELETE,
            "/lookup-codes/X9",
            Some(&bearer("user-123")),
            None,
        )
        .await;
        assert_eq!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "downstream {downstream}"
        );
        assert_eq!(
            body_json_of(response).await,
            json!({"message": "Error deleting item"})
        );
    }
}

#[tokio::test]
async fn test_delete_without_item_id_is_400_with_zero_calls() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    let response = send(
        identity_app(&mock_server),
        Method::DELETE,
        "/lookup-codes",
        Some(&bearer("user-123")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json_of(response).await,
        json!({"message": "Item ID is required"})
    );
}

// -- Outbound token ------------------------------------------------------------------

#[tokio::test]
async fn test_outbound_token_audience_is_data_layer_url() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let provider = Arc::new(RecordingProvider {
        audiences: Mutex::new(Vec::new()),
    });
    let app = build_app(RoutingMode::Identity, &mock_server, provider.clone(), true);

    for _ in 0..2 {
        let response = send(
            app.clone(),
            Method::GET,
            "/lookup-codes",
            Some(&bearer("user-123")),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // A fresh token per request, never cached.
    let base = data_layer_base(&mock_server);
    assert_eq!(*provider.audiences.lock().unwrap(), vec![base.clone(), base]);
}

#[tokio::test]
async fn test_outbound_token_failure_is_500_with_zero_calls() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    let app = build_app(
        RoutingMode::Identity,
        &mock_server,
        Arc::new(FailingProvider),
        true,
    );
    let response = send(
        app,
        Method::POST,
        "/lookup-codes",
        Some(&bearer("user-123")),
        Some(r#"{"code":"A1","value":"hello"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json_of(response).await,
        json!({"message": "Internal server error"})
    );
}

// -- Project-scoped ------------------------------------------------------------------

#[tokio::test]
async fn test_project_routes_map_to_data_layer_paths() {
    let mock_server = MockServer::start().await;
    for (m, p) in [
        ("GET", "/codes"),
        ("GET", "/codes/p1"),
        ("GET", "/codes/p1/X9"),
    ] {
        Mock::given(method(m))
            .and(path(p))
            .and(header("authorization", OUTBOUND))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"path": p})))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    for (uri, expected) in [
        ("/lookup-codes", "/codes"),
        ("/lookup-codes/p1", "/codes/p1"),
        ("/lookup-codes/p1/X9", "/codes/p1/X9"),
    ] {
        let response = send(
            project_app(&mock_server),
            Method::GET,
            uri,
            Some(&bearer("user-123")),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        assert_eq!(body_json_of(response).await["path"], expected);
    }
}

#[tokio::test]
async fn test_project_post_put_delete() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/codes/p1"))
        .and(body_json(json!({"code": "A1", "value": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": "post"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/codes/p1/X9"))
        .and(body_json(json!({"code": "X9", "value": "v2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": "put"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/codes/p1/X9"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = bearer("user-123");

    let response = send(
        project_app(&mock_server),
        Method::POST,
        "/lookup-codes/p1",
        Some(&auth),
        Some(r#"{"code":"A1","value":"hello"}"#),
    )
    .await;
    assert_eq!(body_json_of(response).await, json!({"ok": "post"}));

    let response = send(
        project_app(&mock_server),
        Method::PUT,
        "/lookup-codes/p1/X9",
        Some(&auth),
        Some(r#"{"code":"ignored","value":"v2"}"#),
    )
    .await;
    assert_eq!(body_json_of(response).await, json!({"ok": "put"}));

    let response = send(
        project_app(&mock_server),
        Method::DELETE,
        "/lookup-codes/p1/X9",
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(body_json_of(response).await, json!({"message": "Item deleted"}));
}

#[tokio::test]
async fn test_project_delete_without_item_is_400() {
    let mock_server = MockServer::start().await;
    forbid_data_layer_calls(&mock_server).await;

    let response = send(
        project_app(&mock_server),
        Method::DELETE,
        "/lookup-codes/p1",
        Some(&bearer("user-123")),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json_of(response).await,
        json!({"message": "Item ID is required"})
    );
}

#[tokio::test]
async fn test_project_mode_with_auth_disabled_needs_no_token() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/codes/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_app(
        RoutingMode::Project,
        &mock_server,
        Arc::new(StaticTokenProvider::new("outbound-token")),
        false,
    );
    let response = send(app, Method::GET, "/lookup-codes/p1", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
