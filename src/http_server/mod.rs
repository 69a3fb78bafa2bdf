//! # Eventum HTTP Server Module
//!
//! Axum-based API server combining the auth and event routers.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/auth/*` - Registration, login, token lifecycle
//! - `/events/*` - Event CRUD for the authenticated user

pub mod auth_routes;
pub mod config;
pub mod event_routes;
pub mod server;

pub use config::{ConfigError, HttpServerConfig};
pub use server::{AppState, HttpServer};
