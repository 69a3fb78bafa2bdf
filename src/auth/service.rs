//! # Auth Service
//!
//! Registration, login and token lifecycle combining the user repository,
//! session manager and JWT manager. The event endpoints only ever see the
//! opaque user identity this service resolves from an access token.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::crypto::PasswordPolicy;
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager, TokenResponse};
use super::session::{SessionConfig, SessionManager, SessionRepository};
use super::user::{LoginRequest, RegisterRequest, User, UserRepository};

/// Auth service combining all auth components
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: Arc<U>,
    session_manager: SessionManager<S>,
    jwt_manager: JwtManager,
    password_policy: PasswordPolicy,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(
        user_repo: U,
        session_repo: S,
        jwt_config: JwtConfig,
        session_config: SessionConfig,
        password_policy: PasswordPolicy,
    ) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
            session_manager: SessionManager::new(session_config, session_repo),
            jwt_manager: JwtManager::new(jwt_config),
            password_policy,
        }
    }

    /// Register a new user
    pub fn register(&self, request: RegisterRequest) -> AuthResult<(User, TokenResponse)> {
        if self.user_repo.exists(&request.username, &request.email)? {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = User::new(request, &self.password_policy)?;
        self.user_repo.create(&user)?;

        debug!(user_id = %user.id, "user registered");
        let tokens = self.issue_tokens(&user)?;
        Ok((user, tokens))
    }

    /// Authenticate a user by username and password
    pub fn login(&self, request: LoginRequest) -> AuthResult<(User, TokenResponse)> {
        let user = self
            .user_repo
            .find_by_username(&request.username)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.verify_password(&request.password)? {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issue_tokens(&user)?;
        Ok((user, tokens))
    }

    /// Exchange a refresh token for a new token pair (invalidates the old one)
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        let (session, new_refresh_token) = self.session_manager.refresh_session(refresh_token)?;

        let user = self
            .user_repo
            .find_by_id(session.user_id)?
            .ok_or(AuthError::InvalidCredentials)?;

        let access_token = self.jwt_manager.generate_access_token(&user)?;
        Ok(TokenResponse::new(
            access_token,
            new_refresh_token,
            self.jwt_manager.get_expiration(),
        ))
    }

    /// Logout (invalidate session)
    pub fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        let session = self.session_manager.validate_refresh_token(refresh_token)?;
        self.session_manager.revoke_session(session.id)
    }

    /// Get user by ID
    pub fn get_user(&self, user_id: Uuid) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)?
            .ok_or(AuthError::InvalidCredentials)
    }

    /// Resolve the authenticated user identity from an access token
    pub fn authenticate(&self, token: &str) -> AuthResult<Uuid> {
        let claims = self.jwt_manager.validate_token(token)?;
        JwtManager::get_user_id(&claims)
    }

    fn issue_tokens(&self, user: &User) -> AuthResult<TokenResponse> {
        let (_, refresh_token) = self.session_manager.create_session(user.id)?;
        let access_token = self.jwt_manager.generate_access_token(user)?;
        Ok(TokenResponse::new(
            access_token,
            refresh_token,
            self.jwt_manager.get_expiration(),
        ))
    }
}
