//! # Eventum Auth Module
//!
//! User registration, password hashing, JWT access tokens and
//! refresh-token sessions.

pub mod crypto;
pub mod errors;
pub mod jwt;
pub mod service;
pub mod session;
pub mod user;

pub use crypto::PasswordPolicy;
pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtClaims, JwtConfig, JwtManager, TokenResponse};
pub use service::AuthService;
pub use session::{InMemorySessionRepository, Session, SessionConfig, SessionManager};
pub use user::{InMemoryUserRepository, LoginRequest, RegisterRequest, User, UserRepository};
