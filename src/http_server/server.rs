//! # HTTP Server
//!
//! Main HTTP server combining the auth and event routers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::crypto::PasswordPolicy;
use crate::auth::jwt::JwtConfig;
use crate::auth::service::AuthService;
use crate::auth::session::{InMemorySessionRepository, SessionConfig};
use crate::auth::user::InMemoryUserRepository;
use crate::events::labels::InMemoryLabelRepository;
use crate::events::service::EventService;
use crate::events::store::InMemoryEventRepository;

use super::auth_routes::auth_routes;
use super::config::HttpServerConfig;
use super::event_routes::event_routes;

/// Shared application state for all routers
pub struct AppState {
    pub auth: AuthService<InMemoryUserRepository, InMemorySessionRepository>,
    pub events: EventService<InMemoryEventRepository, InMemoryLabelRepository>,
}

impl AppState {
    /// Create application state with in-memory storage
    pub fn new(jwt_config: JwtConfig) -> Self {
        Self {
            auth: AuthService::new(
                InMemoryUserRepository::new(),
                InMemorySessionRepository::new(),
                jwt_config,
                SessionConfig::default(),
                PasswordPolicy::default(),
            ),
            events: EventService::new(
                InMemoryEventRepository::new(),
                InMemoryLabelRepository::new(),
            ),
        }
    }
}

/// HTTP server for the eventum API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new() -> Self {
        Self::with_config(HttpServerConfig::default())
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: HttpServerConfig) -> Self {
        let router = Self::build_router(&config);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig) -> Router {
        let jwt_config = JwtConfig {
            secret: config.jwt_secret.clone(),
            ..JwtConfig::default()
        };
        let state = Arc::new(AppState::new(jwt_config));

        let cors = if config.cors_origins.is_empty() {
            // No origins configured: permissive, for development
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            use tower_http::cors::AllowOrigin;
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/health", get(health_handler))
            .nest("/auth", auth_routes(state.clone()))
            .nest("/events", event_routes(state))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{}", e)))?;

        info!(%addr, "starting eventum HTTP server");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
