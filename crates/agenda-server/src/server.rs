//! Server assembly and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tracing::info;

use agenda_auth::http::AuthApi;
use agenda_auth::middleware::auth::AuthState;
use agenda_auth::{AuthService, JwtService, SessionRegistry};
use agenda_auth_memory::{InMemoryRefreshTokenStorage, InMemoryUserStorage};

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::sweep::spawn_refresh_token_sweeper;

/// Wires the auth engine to its storage backends and returns the handler
/// state plus the service handle (the sweeper needs the latter).
///
/// # Errors
///
/// Returns an error if service construction fails.
pub fn build_auth(config: &AppConfig) -> anyhow::Result<(AuthApi, Arc<AuthService>)> {
    let users = Arc::new(InMemoryUserStorage::new());
    let refresh_storage = Arc::new(InMemoryRefreshTokenStorage::new());
    let jwt = Arc::new(JwtService::new(&config.auth));
    let sessions = Arc::new(SessionRegistry::new());

    let service = Arc::new(AuthService::new(
        &config.auth,
        users,
        refresh_storage,
        jwt.clone(),
        sessions.clone(),
    )?);

    let api = AuthApi {
        service: service.clone(),
        auth_state: AuthState::new(jwt, sessions),
    };
    Ok((api, service))
}

/// Builds the full application router for the given configuration.
///
/// # Errors
///
/// Returns an error if the auth engine cannot be constructed.
pub fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let (api, _service) = build_auth(config)?;
    Ok(build_router(api))
}

pub struct AgendaServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl ServerBuilder {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Assembles the server and spawns its background tasks.
    ///
    /// # Errors
    ///
    /// Returns an error on an invalid listen address or a failed auth
    /// engine construction.
    pub fn build(self) -> anyhow::Result<AgendaServer> {
        let addr = self.config.addr()?;
        let (api, service) = build_auth(&self.config)?;

        spawn_refresh_token_sweeper(service, self.config.auth.sweep_interval);

        Ok(AgendaServer {
            addr,
            app: build_router(api),
        })
    }
}

impl AgendaServer {
    /// Binds the listener and serves until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if binding or serving fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("listening on {}", self.addr);
        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
