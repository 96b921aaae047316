//! End-to-end tests for the /auth API: registration, login, refresh
//! rotation, rate limiting, anti-forgery, and session eviction.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use agenda_server::build_app;
use agenda_server::config::AppConfig;

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.signing_secret = "e2e-test-signing-secret-32-bytes!".to_string();
    config
}

fn app() -> Router {
    build_app(&test_config()).expect("app builds")
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.1")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("response")
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Extracts the value of a named cookie from a response's Set-Cookie
/// headers, if present.
fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| {
            let (pair, _) = raw.split_once(';').unwrap_or((raw, ""));
            let (cookie_name, value) = pair.split_once('=')?;
            (cookie_name == name).then(|| value.to_string())
        })
}

async fn register(app: &Router, username: &str, password: &str) {
    let response = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            &json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn login(app: &Router, username: &str, password: &str, client: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .expect("request");
    send(app, request).await
}

#[tokio::test]
async fn healthz_is_ok() {
    let response = send(
        &app(),
        Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_returns_profile_and_rejects_duplicates() {
    let app = app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            &json!({ "username": "alice", "password": "a long enough password" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert!(body.get("passwordHash").is_none());

    let duplicate = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            &json!({ "username": "alice", "password": "another long password" }),
        ),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_returns_tokens_session_cookie_and_csrf_seed() {
    let app = app();
    register(&app, "alice", "a long enough password").await;

    let response = login(&app, "alice", "a long enough password", "203.0.113.1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = set_cookie_value(&response, "AGENDA_SESSION").expect("session cookie");
    assert!(!session.is_empty());
    assert!(set_cookie_value(&response, "XSRF-TOKEN").is_some());

    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["tokenType"], "Bearer");
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert!(!body["refreshToken"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_credentials_are_a_generic_401() {
    let app = app();
    register(&app, "alice", "a long enough password").await;

    let wrong_pw = login(&app, "alice", "wrong password here", "203.0.113.1").await;
    let no_user = login(&app, "mallory", "wrong password here", "203.0.113.1").await;

    assert_eq!(wrong_pw.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(no_user.status(), StatusCode::UNAUTHORIZED);

    let a = body_json(wrong_pw).await;
    let b = body_json(no_user).await;
    assert_eq!(a, b, "responses must not reveal which half failed");
    assert_eq!(a["message"], "Invalid credentials");
}

#[tokio::test]
async fn bearer_probe_accepts_valid_token_and_rejects_garbage() {
    let app = app();
    register(&app, "alice", "a long enough password").await;

    let response = login(&app, "alice", "a long enough password", "203.0.113.1").await;
    let access = body_json(response).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    let me = send(
        &app,
        Request::builder()
            .uri("/auth/me")
            .header(header::AUTHORIZATION, format!("Bearer {access}"))
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["username"], "alice");

    let anonymous = send(
        &app,
        Request::builder()
            .uri("/auth/me")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let forged = send(
        &app,
        Request::builder()
            .uri("/auth/me")
            .header(header::AUTHORIZATION, "Bearer not-a-real-token")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_and_replay_fails() {
    let app = app();
    register(&app, "alice", "a long enough password").await;

    let response = login(&app, "alice", "a long enough password", "203.0.113.1").await;
    let first = body_json(response).await["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    let rotated = send(
        &app,
        json_request("POST", "/auth/refresh", &json!({ "refreshToken": first })),
    )
    .await;
    assert_eq!(rotated.status(), StatusCode::OK);
    let rotated_body = body_json(rotated).await;
    let second = rotated_body["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(first, second);
    assert_eq!(rotated_body["username"], "alice");

    // The consumed value is dead; the rejection does not say why.
    let replay = send(
        &app,
        json_request("POST", "/auth/refresh", &json!({ "refreshToken": first })),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(replay).await["message"],
        "Invalid or expired refresh token"
    );

    // The replacement works.
    let again = send(
        &app,
        json_request("POST", "/auth/refresh", &json!({ "refreshToken": second })),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_rate_limit_fires_per_client_key() {
    let app = app();
    register(&app, "alice", "a long enough password").await;

    // Default bucket: 5 attempts. Failures drain it like successes would.
    for _ in 0..5 {
        let response = login(&app, "alice", "bad password attempt", "198.51.100.7").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Empty bucket: even the right password is refused, before hashing.
    let limited = login(&app, "alice", "a long enough password", "198.51.100.7").await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key(header::RETRY_AFTER));

    // Another client key is unaffected.
    let other = login(&app, "alice", "a long enough password", "198.51.100.8").await;
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_requires_anti_forgery_pair() {
    let app = app();
    register(&app, "alice", "a long enough password").await;

    let response = login(&app, "alice", "a long enough password", "203.0.113.1").await;
    let session = set_cookie_value(&response, "AGENDA_SESSION").expect("session cookie");
    let xsrf = set_cookie_value(&response, "XSRF-TOKEN").expect("csrf cookie");
    let refresh_token = body_json(response).await["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    // Cookie without the echoing header: forged-request shape, rejected.
    let forged = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/auth/logout")
            .header(
                header::COOKIE,
                format!("AGENDA_SESSION={session}; XSRF-TOKEN={xsrf}"),
            )
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(forged.status(), StatusCode::FORBIDDEN);

    // Proper double submit: logout succeeds and clears the cookie.
    let logout = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/auth/logout")
            .header(
                header::COOKIE,
                format!("AGENDA_SESSION={session}; XSRF-TOKEN={xsrf}"),
            )
            .header("X-XSRF-TOKEN", &xsrf)
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::OK);
    let cleared = set_cookie_value(&logout, "AGENDA_SESSION").expect("removal cookie");
    assert!(cleared.is_empty());

    // Logout revoked the refresh token.
    let after = send(
        &app,
        json_request(
            "POST",
            "/auth/refresh",
            &json!({ "refreshToken": refresh_token }),
        ),
    )
    .await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn second_login_redirects_evicted_session() {
    let app = app();
    register(&app, "alice", "a long enough password").await;

    let first = login(&app, "alice", "a long enough password", "203.0.113.1").await;
    let old_session = set_cookie_value(&first, "AGENDA_SESSION").expect("first session");

    let second = login(&app, "alice", "a long enough password", "203.0.113.2").await;
    let new_session = set_cookie_value(&second, "AGENDA_SESSION").expect("second session");
    assert_ne!(old_session, new_session);

    // The evicted session is redirected to the session-expired endpoint.
    let evicted = send(
        &app,
        Request::builder()
            .uri("/auth/session")
            .header(header::COOKIE, format!("AGENDA_SESSION={old_session}"))
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(evicted.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        evicted.headers().get(header::LOCATION).unwrap(),
        "/auth/session-expired"
    );

    // Eviction is reported once; afterwards the id is simply unknown.
    let gone = send(
        &app,
        Request::builder()
            .uri("/auth/session")
            .header(header::COOKIE, format!("AGENDA_SESSION={old_session}"))
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(gone.status(), StatusCode::UNAUTHORIZED);

    // The new session still resolves.
    let live = send(
        &app,
        Request::builder()
            .uri("/auth/session")
            .header(header::COOKIE, format!("AGENDA_SESSION={new_session}"))
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(body_json(live).await["username"], "alice");
}

#[tokio::test]
async fn session_expired_endpoint_explains_itself() {
    let response = send(
        &app(),
        Request::builder()
            .uri("/auth/session-expired")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("another location")
    );
}
