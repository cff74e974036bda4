//! Router-level tests: status codes, JSON bodies and CORS.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::creation_body;
use ministry_core::domains::provisioning::{AdminBootstrapSettings, ADMIN_EMAIL};
use ministry_core::kernel::test_dependencies::{MockIdentityAdmin, MockProfileStore};
use ministry_core::kernel::TestDependencies;
use ministry_core::server::build_app;

fn app(test_deps: &TestDependencies) -> Router {
    build_app(test_deps.server_deps())
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn options_preflight_returns_ok_with_cors_headers() {
    let test_deps = TestDependencies::new();

    for uri in ["/create-user", "/cleanup-users", "/create-admin-user"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .header(header::ORIGIN, "https://app.igreja.org")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(
                header::ACCESS_CONTROL_REQUEST_HEADERS,
                "authorization, x-client-info, apikey, content-type",
            )
            .body(Body::empty())
            .unwrap();

        let response = app(&test_deps).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        for name in ["authorization", "x-client-info", "apikey", "content-type"] {
            assert!(allowed.contains(name), "missing {name} in {allowed}");
        }
    }

    assert!(test_deps.identity.create_calls().is_empty());
}

#[tokio::test]
async fn responses_carry_allow_origin() {
    let test_deps = TestDependencies::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/cleanup-users")
        .header(header::ORIGIN, "https://app.igreja.org")
        .body(Body::empty())
        .unwrap();

    let response = app(&test_deps).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

// ============================================================================
// POST /create-user
// ============================================================================

#[tokio::test]
async fn create_user_returns_user_id() {
    let test_deps = TestDependencies::new();
    let body = creation_body("lucas@igreja.org", Uuid::new_v4());

    let response = app(&test_deps)
        .oneshot(post_json("/create-user", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let user_id: Uuid = serde_json::from_value(body["user_id"].clone()).unwrap();
    assert!(test_deps.identity.exists(user_id));
    assert!(body.get("resumed").is_none());

    let profile = test_deps.profiles.profile(user_id).unwrap();
    assert_eq!(profile.phone, None);
    assert_eq!(profile.cpf, None);
}

#[tokio::test]
async fn create_user_rejects_malformed_body() {
    let test_deps = TestDependencies::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/create-user")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app(&test_deps).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(test_deps.identity.create_calls().is_empty());
}

#[tokio::test]
async fn create_user_rejects_missing_fields() {
    let test_deps = TestDependencies::new();

    let response = app(&test_deps)
        .oneshot(post_json("/create-user", &json!({ "email": "x@igreja.org" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn provider_error_message_is_returned() {
    let test_deps = TestDependencies::new().with_identity(
        MockIdentityAdmin::new().with_create_error("Unable to validate email address: invalid format"),
    );
    let body = creation_body("sem-arroba", Uuid::new_v4());

    let response = app(&test_deps)
        .oneshot(post_json("/create-user", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        "Unable to validate email address: invalid format"
    );
    assert_eq!(body["completed_steps"], json!([]));
}

#[tokio::test]
async fn profile_failure_reports_partial_progress() {
    let test_deps = TestDependencies::new()
        .with_profiles(MockProfileStore::new().with_failing_profiles());
    let body = creation_body("parcial@igreja.org", Uuid::new_v4());

    let response = app(&test_deps)
        .oneshot(post_json("/create-user", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "connection to profile store lost");
    assert_eq!(body["completed_steps"], json!(["create_identity"]));
    assert!(body.get("rolled_back").is_none());

    let user_id: Uuid = serde_json::from_value(body["user_id"].clone()).unwrap();
    assert!(test_deps.identity.exists(user_id));
}

#[tokio::test]
async fn resumed_create_is_flagged() {
    let test_deps = TestDependencies::new();
    let user_id = Uuid::new_v4();
    let mut body = creation_body("retomada@igreja.org", Uuid::new_v4());
    body["user_id"] = json!(user_id);

    let response = app(&test_deps)
        .oneshot(post_json("/create-user", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user_id"], json!(user_id));
    assert_eq!(body["resumed"], true);
}

// ============================================================================
// POST /cleanup-users
// ============================================================================

#[tokio::test]
async fn cleanup_reports_counts_and_results() {
    let identity = MockIdentityAdmin::new()
        .with_user(ADMIN_EMAIL)
        .with_user("a@igreja.org")
        .with_user("b@igreja.org");
    let test_deps = TestDependencies::new().with_identity(identity);

    let response = app(&test_deps)
        .oneshot(post_empty("/cleanup-users"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted_count"], 2);
    assert_eq!(body["failed_count"], 0);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn cleanup_list_failure_is_server_error() {
    let test_deps =
        TestDependencies::new().with_identity(MockIdentityAdmin::new().with_failing_list());

    let response = app(&test_deps)
        .oneshot(post_empty("/cleanup-users"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("failed to list users"));
}

// ============================================================================
// POST /create-admin-user
// ============================================================================

#[tokio::test]
async fn admin_bootstrap_returns_admin_id() {
    let test_deps = TestDependencies::new();

    let response = app(&test_deps)
        .oneshot(post_empty("/create-admin-user"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["created"], true);
    assert!(body.get("warnings").is_none());
    assert!(test_deps.identity.find_by_email(ADMIN_EMAIL).is_some());
}

#[tokio::test]
async fn admin_bootstrap_warnings_do_not_fail_response() {
    let test_deps =
        TestDependencies::new().with_profiles(MockProfileStore::new().with_failing_roles());

    let response = app(&test_deps)
        .oneshot(post_empty("/create-admin-user"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn disabled_admin_bootstrap_is_forbidden() {
    let test_deps = TestDependencies::new().with_admin_bootstrap(AdminBootstrapSettings {
        enabled: false,
        password: "admin123".to_string(),
    });

    let response = app(&test_deps)
        .oneshot(post_empty("/create-admin-user"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Admin bootstrap is disabled");
}

// ============================================================================
// GET /health
// ============================================================================

#[tokio::test]
async fn health_reports_store_status() {
    let healthy = TestDependencies::new();
    let response = app(&healthy)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");

    let unhealthy =
        TestDependencies::new().with_profiles(MockProfileStore::new().with_failing_ping());
    let response = app(&unhealthy)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["database"]["status"], "error");
}
