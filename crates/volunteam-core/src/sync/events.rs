//! Event list synchronization and the volunteer/create actions.
//!
//! Fetching never fails from the caller's point of view: the backend is
//! tried first, then the cached list, then the built-in defaults.

use base64::Engine;
use tracing::{debug, error, info, warn};

use crate::api::{Backend, ImageHost, UploadedImage};
use crate::auth::Session;
use crate::cache::CacheManager;
use crate::models::{default_events, Event, User};
use crate::utils::generate_id;

use super::board::EventBoard;
use super::draft::{EventDraft, ImageSource};
use super::SyncError;

/// Where an event list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    Remote,
    /// Last successful fetch; `age` is for display ("5m ago")
    Cache { age: String, stale: bool },
    Defaults,
}

/// A saved event, plus the uploaded picture when it came from a local file.
#[derive(Debug, Clone)]
pub struct CreatedEvent {
    pub event: Event,
    pub picture: Option<UploadedImage>,
}

#[derive(Debug, Clone)]
pub struct EventFeed {
    pub events: Vec<Event>,
    pub source: EventSource,
}

pub struct EventSync<'a, B, I> {
    backend: &'a B,
    images: &'a I,
    cache: &'a CacheManager,
    offline: bool,
}

impl<'a, B: Backend, I: ImageHost> EventSync<'a, B, I> {
    pub fn new(backend: &'a B, images: &'a I, cache: &'a CacheManager) -> Self {
        Self {
            backend,
            images,
            cache,
            offline: false,
        }
    }

    /// Skip the backend and serve from the cache or defaults only.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Always produces a list: backend, then cache, then defaults.
    pub async fn fetch_events(&self) -> Vec<Event> {
        self.load_events().await.events
    }

    pub async fn load_events(&self) -> EventFeed {
        if self.offline {
            debug!("Offline mode, skipping backend");
        } else {
            match self.backend.list_events().await {
                Ok(events) if !events.is_empty() => {
                    info!(count = events.len(), "Events fetched");
                    if let Err(e) = self.cache.save_events(&events) {
                        warn!(error = %e, "Failed to cache events");
                    }
                    return EventFeed {
                        events,
                        source: EventSource::Remote,
                    };
                }
                Ok(_) => warn!("Backend returned no events, falling back"),
                Err(e) if e.is_unreachable() => {
                    warn!(error = %e, "Backend unreachable, falling back to cache")
                }
                Err(e) => error!(error = %e, "Event fetch failed, falling back to cache"),
            }
        }

        match self.cache.load_events() {
            Ok(Some(cached)) => {
                let age = cached.age_display();
                let stale = cached.is_stale();
                debug!(count = cached.data.len(), age = %age, stale, "Serving cached events");
                return EventFeed {
                    events: cached.data,
                    source: EventSource::Cache { age, stale },
                };
            }
            Ok(None) => debug!("No cached events"),
            Err(e) => warn!(error = %e, "Failed to read events cache"),
        }

        EventFeed {
            events: default_events(),
            source: EventSource::Defaults,
        }
    }

    /// Fetch and apply the result to `board` without clobbering newer local writes.
    pub async fn refresh(&self, board: &EventBoard) -> EventSource {
        let ticket = board.begin_fetch();
        let feed = self.load_events().await;
        board.apply_fetch(ticket, feed.events);
        feed.source
    }

    /// Add the session user to an event's volunteers.
    ///
    /// The board shows the change at once; it is replaced by the server's
    /// copy on success and rolled back on failure. Volunteering twice is a
    /// no-op.
    pub async fn volunteer(&self, board: &EventBoard, event_id: &str, session: &Session) -> Result<Event, SyncError> {
        let current = board
            .get(event_id)
            .ok_or_else(|| SyncError::UnknownEvent(event_id.to_string()))?;

        let user_id = session.user_id();
        if current.has_volunteer(user_id) {
            debug!(event_id, user_id, "Already volunteered");
            return Ok(current);
        }
        if current.is_full() {
            return Err(SyncError::EventFull);
        }

        let updated = current.with_volunteer(user_id);
        let body = serde_json::to_value(&updated)?;
        let write = board.apply_local(updated);

        match self.backend.patch_event(event_id, &body).await {
            Ok(acknowledged) => {
                info!(event_id, user_id, "Volunteered");
                board.confirm(&write, acknowledged.clone());
                Ok(acknowledged)
            }
            Err(e) => {
                error!(event_id, error = %e, "Volunteer request failed");
                board.rollback(write);
                Err(SyncError::VolunteerFailed(e))
            }
        }
    }

    /// Validate the draft, upload a local picture, then save the event with
    /// the session user as organizer.
    pub async fn create_event(
        &self,
        board: &EventBoard,
        draft: &EventDraft,
        session: &Session,
    ) -> Result<CreatedEvent, SyncError> {
        let valid = draft.validate()?;

        let (image_url, picture) = match &valid.image {
            ImageSource::Remote(url) => (url.clone(), None),
            ImageSource::LocalFile(path) => {
                let bytes = std::fs::read(path).map_err(SyncError::ImageUnreadable)?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                let uploaded = self
                    .images
                    .upload(&encoded)
                    .await
                    .map_err(SyncError::UploadFailed)?;
                debug!(url = %uploaded.url, size = uploaded.size, "Picture uploaded");
                (uploaded.url.clone(), Some(uploaded))
            }
        };

        let event = valid.into_event(generate_id(), session.user_id(), image_url);
        let created = self.backend.create_event(&event).await.map_err(|e| {
            error!(error = %e, "Event creation failed");
            SyncError::CreateFailed(e)
        })?;

        info!(event_id = %created.id, "Event created");
        board.apply_confirmed(created.clone());
        Ok(CreatedEvent {
            event: created,
            picture,
        })
    }

    /// Look up the organizer of `event`. `None` when unknown or unreachable.
    pub async fn organizer(&self, event: &Event) -> Option<User> {
        let organizer_id = event.organizer_id.as_deref()?;
        if self.offline {
            return None;
        }
        match self.backend.list_users().await {
            Ok(users) => users.into_iter().find(|u| u.id == organizer_id),
            Err(e) => {
                warn!(error = %e, "Organizer lookup failed");
                None
            }
        }
    }
}
