//! Event synchronization module.
//!
//! This module provides:
//! - `EventSync`: the backend → cache → defaults fetch chain, plus the
//!   volunteer and create-event actions
//! - `EventBoard`: the in-memory list those actions update
//! - `EventDraft`: the create-event form

pub mod board;
pub mod draft;
pub mod events;

use thiserror::Error;

use crate::api::ApiError;

pub use board::{EventBoard, FetchTicket, LocalWrite};
pub use draft::{DraftField, EventDraft, ImageSource, ValidDraft};
pub use events::{CreatedEvent, EventFeed, EventSource, EventSync};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Event is full")]
    EventFull,

    #[error("Volunteer request failed: {0}")]
    VolunteerFailed(#[source] ApiError),

    #[error("Invalid {0}")]
    InvalidDraft(DraftField),

    #[error("Could not read picture: {0}")]
    ImageUnreadable(#[source] std::io::Error),

    #[error("Picture upload failed: {0}")]
    UploadFailed(#[source] ApiError),

    #[error("Could not save event: {0}")]
    CreateFailed(#[source] ApiError),

    #[error("Could not encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SyncError {
    /// Message for the alert shown to the user. Internal detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::UnknownEvent(_) => "This event is no longer available.".to_string(),
            SyncError::EventFull => "Team is full".to_string(),
            SyncError::VolunteerFailed(_) | SyncError::Encode(_) => {
                "Could not register you for this event.".to_string()
            }
            SyncError::InvalidDraft(field) => format!("Please enter a valid {}.", field),
            SyncError::ImageUnreadable(_) => "Could not open the picture.".to_string(),
            SyncError::UploadFailed(_) | SyncError::CreateFailed(_) => {
                "Could not save the event.".to_string()
            }
        }
    }
}
