//! Core library for volunteam: find volunteer events on a map and sign up.
//!
//! - `api`: HTTP clients for the mock backend and the image host
//! - `cache`: JSON key-value cache on local disk
//! - `auth`: sign-in with auto-registration, session restore and logout
//! - `sync`: event list fetch with cache/default fallback, volunteering,
//!   creating events
//! - `config`: settings loaded once at startup

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod sync;
pub mod utils;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, Backend, ImageClient, ImageHost, UploadedImage};
pub use auth::{AuthError, Authenticator, Session, SessionStore, ValidationError};
pub use cache::{CacheError, CacheManager};
pub use config::Config;
pub use models::{Event, EventStatus, Position, User};
pub use sync::{EventBoard, EventDraft, EventSource, EventSync, ImageSource, SyncError};
