use super::*;
use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use reqwest::StatusCode as ReqwestStatus;
use serde_json::{Value, json};

// =============================================================================
// Mock auth API
// =============================================================================

fn user_json(id: i64, username: &str, email: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": email,
        "isLogin": true,
        "createdTime": "2025-01-02T03:04:05.000001"
    })
}

async fn login(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.contains_key("authorization") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "login must not carry a token"})),
        );
    }
    if body["email"] == "ada@example.com" && body["password"] == "secret1" {
        (
            StatusCode::OK,
            Json(json!({
                "user": user_json(1, "ada", "ada@example.com"),
                "accessToken": "tok",
                "tokenType": "Bearer"
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid email or password"})),
        )
    }
}

async fn register(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.contains_key("authorization") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "register must not carry a token"})),
        );
    }
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Email already registered"})),
        );
    }
    if body["username"] == "x" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [
                {"loc": ["body", "username"], "msg": "String should have at least 3 characters"},
                {"loc": ["body", "email"], "msg": "value is not a valid email address"}
            ]})),
        );
    }
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    (
        StatusCode::CREATED,
        Json(json!({
            "user": user_json(2, &username, &email),
            "accessToken": "fresh"
        })),
    )
}

async fn current_user(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    if auth == "Bearer tok" {
        (StatusCode::OK, Json(user_json(1, "ada", "ada@example.com")))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid authentication credentials"})),
        )
    }
}

fn mock_api() -> Router {
    Router::new().nest(
        "/api/auth",
        Router::new()
            .route("/login", post(login))
            .route("/register", post(register))
            .route("/user", get(current_user)),
    )
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

async fn client() -> AuthClient {
    let api_url = serve(mock_api()).await;
    AuthClient::new(&api_url, TokenStore::in_memory())
}

fn ada() -> LoginRequest {
    LoginRequest {
        email: "ada@example.com".to_string(),
        password: "secret1".to_string(),
    }
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_returns_user_and_persists_token() {
    let client = client().await;

    let res = client.login(&ada()).await.unwrap();

    assert_eq!(res.user.id, 1);
    assert_eq!(res.user.username, "ada");
    assert_eq!(res.token_type, "Bearer");
    assert_eq!(client.tokens().get().as_deref(), Some("tok"));
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn login_failure_carries_server_detail_and_stores_nothing() {
    let client = client().await;
    let bad = LoginRequest {
        email: "ada@example.com".to_string(),
        password: "wrong-pass".to_string(),
    };

    let err = client.login(&bad).await.unwrap_err();

    match &err {
        AuthError::Api { status, detail } => {
            assert_eq!(*status, ReqwestStatus::UNAUTHORIZED);
            assert_eq!(detail.as_deref(), Some("Invalid email or password"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.detail(), Some("Invalid email or password"));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn login_is_sent_without_stale_token() {
    let client = client().await;
    client.tokens().set("stale").unwrap();

    let res = client.login(&ada()).await.unwrap();

    assert_eq!(res.access_token, "tok");
    assert_eq!(client.tokens().get().as_deref(), Some("tok"));
}

// =============================================================================
// register
// =============================================================================

#[tokio::test]
async fn register_persists_token_and_defaults_token_type() {
    let client = client().await;
    let req = RegisterRequest {
        username: "grace".to_string(),
        email: "grace@example.com".to_string(),
        password: "secret1".to_string(),
    };

    let res = client.register(&req).await.unwrap();

    assert_eq!(res.user.username, "grace");
    assert_eq!(res.token_type, "bearer");
    assert_eq!(client.tokens().get().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn register_conflict_surfaces_detail() {
    let client = client().await;
    let req = RegisterRequest {
        username: "grace".to_string(),
        email: "taken@example.com".to_string(),
        password: "secret1".to_string(),
    };

    let err = client.register(&req).await.unwrap_err();

    assert_eq!(err.detail(), Some("Email already registered"));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn register_validation_list_is_joined() {
    let client = client().await;
    let req = RegisterRequest {
        username: "x".to_string(),
        email: "nope".to_string(),
        password: "secret1".to_string(),
    };

    let err = client.register(&req).await.unwrap_err();

    assert_eq!(
        err.detail(),
        Some("String should have at least 3 characters; value is not a valid email address")
    );
}

// =============================================================================
// get_current_user
// =============================================================================

#[tokio::test]
async fn current_user_uses_stored_token() {
    let client = client().await;
    client.login(&ada()).await.unwrap();

    let user = client.get_current_user().await.unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(client.tokens().get().as_deref(), Some("tok"));
}

#[tokio::test]
async fn current_user_without_token_is_rejected() {
    let client = client().await;

    let err = client.get_current_user().await.unwrap_err();

    assert_eq!(err.detail(), Some("Invalid authentication credentials"));
}

// =============================================================================
// logout / is_authenticated
// =============================================================================

#[tokio::test]
async fn logout_removes_token_locally() {
    let client = client().await;
    client.login(&ada()).await.unwrap();

    client.logout().unwrap();

    assert!(!client.is_authenticated());
    assert!(client.get_current_user().await.is_err());
}

#[test]
fn is_authenticated_only_checks_presence() {
    let client = AuthClient::new("http://127.0.0.1:9", TokenStore::in_memory());
    assert!(!client.is_authenticated());
    client.tokens().set("not-even-a-jwt").unwrap();
    assert!(client.is_authenticated());
}

// =============================================================================
// Odd responses
// =============================================================================

#[tokio::test]
async fn non_json_error_has_no_detail() {
    let app = Router::new().route(
        "/api/auth/login",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let client = AuthClient::new(&serve(app).await, TokenStore::in_memory());

    let err = client.login(&ada()).await.unwrap_err();

    assert!(matches!(
        err,
        AuthError::Api { status, detail: None } if status == ReqwestStatus::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let app = Router::new().route("/api/auth/login", post(|| async { "not json" }));
    let client = AuthClient::new(&serve(app).await, TokenStore::in_memory());

    let err = client.login(&ada()).await.unwrap_err();

    assert!(matches!(err, AuthError::Decode(_)));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let client = AuthClient::new("http://127.0.0.1:9/api", TokenStore::in_memory());

    let err = client.login(&ada()).await.unwrap_err();

    assert!(matches!(err, AuthError::Transport(_)));
    assert_eq!(err.detail(), None);
}

#[test]
fn base_url_trailing_slash_is_ignored() {
    let client = AuthClient::new("http://example.com/api/", TokenStore::in_memory());
    assert_eq!(client.endpoint("/login"), "http://example.com/api/auth/login");
}

// =============================================================================
// extract_detail
// =============================================================================

#[test]
fn extract_detail_string() {
    assert_eq!(
        extract_detail(r#"{"detail":"nope"}"#).as_deref(),
        Some("nope")
    );
}

#[test]
fn extract_detail_falls_back_to_error_then_message() {
    assert_eq!(extract_detail(r#"{"error":"bad"}"#).as_deref(), Some("bad"));
    assert_eq!(extract_detail(r#"{"message":"meh"}"#).as_deref(), Some("meh"));
}

#[test]
fn extract_detail_ignores_blank_and_non_json() {
    assert_eq!(extract_detail(r#"{"detail":"   "}"#), None);
    assert_eq!(extract_detail("<html>502</html>"), None);
    assert_eq!(extract_detail(r#"{"detail":[]}"#), None);
}
