//! Auth HTTP Routes
//!
//! HTTP endpoints for registration, login and token lifecycle.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::errors::AuthError;
use crate::auth::jwt::TokenResponse;
use crate::auth::user::{LoginRequest, RegisterRequest, User};

use super::server::AppState;

/// Auth routes with shared state
pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
        .route("/logout", post(logout_handler))
        .route("/user", get(get_user_handler))
        .with_state(state)
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code(),
        }
    }
}

type AuthFailure = (StatusCode, Json<ErrorResponse>);

fn auth_failure(err: AuthError) -> AuthFailure {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err)))
}

/// Extract the bearer token from the Authorization header
pub(super) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(AuthError::AuthenticationRequired)
}

// ==================
// Handlers
// ==================

/// Register handler
async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthFailure> {
    match state.auth.register(request) {
        Ok((user, tokens)) => {
            let response = AuthResponse {
                user: UserResponse::from(&user),
                tokens,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => Err(auth_failure(e)),
    }
}

/// Login handler
async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthFailure> {
    match state.auth.login(request) {
        Ok((user, tokens)) => Ok(Json(AuthResponse {
            user: UserResponse::from(&user),
            tokens,
        })),
        Err(e) => Err(auth_failure(e)),
    }
}

/// Refresh token handler
async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AuthFailure> {
    state
        .auth
        .refresh(&request.refresh_token)
        .map(Json)
        .map_err(auth_failure)
}

/// Logout handler
async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, AuthFailure> {
    state
        .auth
        .logout(&request.refresh_token)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(auth_failure)
}

/// Get current user handler (requires Authorization header)
async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, AuthFailure> {
    let token = bearer_token(&headers).map_err(auth_failure)?;
    let user_id = state.auth.authenticate(token).map_err(auth_failure)?;
    let user = state.auth.get_user(user_id).map_err(auth_failure)?;
    Ok(Json(UserResponse::from(&user)))
}
