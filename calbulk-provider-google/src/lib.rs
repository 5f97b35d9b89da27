//! Google Calendar provider for calbulk.
//!
//! Talks to the Calendar v3 REST API with `reqwest` and keeps the OAuth
//! session on disk:
//!   ~/.config/calbulk/google/app_config.toml
//!   ~/.config/calbulk/google/session.toml

pub mod api;
pub mod app_config;
pub mod auth;
mod convert;
pub mod session;
pub mod userinfo;
mod wire;

pub use api::GoogleCalendarService;
pub use session::Session;
