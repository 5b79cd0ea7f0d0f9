//! REST clients for the volunteam mock backend and the image host.
//!
//! The backend is a plain JSON-over-HTTP service exposing `users` and
//! `events` collections. The image host accepts base64 uploads and returns
//! a public URL. Neither client retries; callers decide what to do on
//! failure.
//!
//! The flows are written against the `Backend` and `ImageHost` traits so
//! they can run against in-memory fakes.

pub mod client;
pub mod error;
pub mod image;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::models::{Event, User};

pub use client::ApiClient;
pub use error::ApiError;
pub use image::ImageClient;

/// The `users` and `events` collections of the backend.
pub trait Backend {
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, ApiError>> + Send;

    fn create_user(&self, user: &User) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn list_events(&self) -> impl Future<Output = Result<Vec<Event>, ApiError>> + Send;

    fn create_event(&self, event: &Event) -> impl Future<Output = Result<Event, ApiError>> + Send;

    /// Returns the event as acknowledged by the server.
    fn patch_event(
        &self,
        id: &str,
        partial: &serde_json::Value,
    ) -> impl Future<Output = Result<Event, ApiError>> + Send;
}

/// Result of a successful image upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UploadedImage {
    pub url: String,
    pub size: u64,
    pub name: String,
}

pub trait ImageHost {
    /// Upload a base64-encoded image.
    fn upload(
        &self,
        base64_image: &str,
    ) -> impl Future<Output = Result<UploadedImage, ApiError>> + Send;
}
