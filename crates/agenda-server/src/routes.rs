//! Route table.

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use agenda_auth::http::{AuthApi, login, logout, probe, refresh, register};
use agenda_auth::middleware::csrf::csrf_guard;

/// Builds the application router.
///
/// The anti-forgery guard wraps the auth routes; the token cookie is seeded
/// on the first response, so a frontend that starts with any request can
/// make protected calls afterwards.
pub fn build_router(api: AuthApi) -> Router {
    let auth = Router::new()
        .route("/auth/register", post(register::register))
        .route("/auth/login", post(login::login))
        .route("/auth/refresh", post(refresh::refresh))
        .route("/auth/logout", post(logout::logout))
        .route("/auth/me", get(probe::me))
        .route("/auth/session", get(probe::session_info))
        .route("/auth/session-expired", get(probe::session_expired))
        .layer(middleware::from_fn(csrf_guard))
        .with_state(api);

    Router::new()
        .route("/healthz", get(healthz))
        .merge(auth)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe.
async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
