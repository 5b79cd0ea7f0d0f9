//! Data models for volunteam entities.
//!
//! - `User`, `PersonName`: accounts stored on the backend
//! - `Event`, `Position`, `EventStatus`: volunteer events shown on the map
//! - `default_events`: the built-in markers used on a brand-new install

pub mod event;
pub mod user;

pub use event::{default_events, Event, EventStatus, Position};
pub use user::{PersonName, User};
