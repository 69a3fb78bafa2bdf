//! eventum - a small multi-tenant event scheduling API
//!
//! Users register, authenticate via JSON Web Tokens and manage personal
//! calendar events with optional recurrence, labels and overlap constraints.

pub mod auth;
pub mod cli;
pub mod events;
pub mod http_server;
