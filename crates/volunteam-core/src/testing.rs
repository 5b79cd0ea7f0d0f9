//! In-memory stand-ins for the backend and the image host.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::{ApiError, Backend, ImageHost, UploadedImage};
use crate::models::{Event, PersonName, Position, User};

#[derive(Default)]
pub struct FakeBackend {
    pub users: Mutex<Vec<User>>,
    pub events: Mutex<Vec<Event>>,
    pub offline: AtomicBool,
    pub fail_writes: AtomicBool,
    pub list_users_calls: AtomicUsize,
    pub create_user_calls: AtomicUsize,
    pub list_events_calls: AtomicUsize,
    pub create_event_calls: AtomicUsize,
    pub patch_calls: AtomicUsize,
    /// Stored right after the next `list_users` answers, as if another
    /// client registered in between
    pub concurrent_signup: Mutex<Option<User>>,
}

impl FakeBackend {
    pub fn with_events(events: Vec<Event>) -> Self {
        let backend = Self::default();
        *backend.events.lock().unwrap() = events;
        backend
    }

    pub fn add_user(&self, email: &str, password: &str) -> User {
        let user = User {
            id: format!("user-{}", self.users.lock().unwrap().len() + 1),
            email: email.to_string(),
            // Low cost keeps the tests fast
            password_hash: bcrypt::hash(password, 4).unwrap(),
            name: PersonName {
                first: "Ana".to_string(),
                last: "Silva".to_string(),
            },
            mobile: "555-0100".to_string(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn register_after_next_lookup(&self, email: &str) {
        let user = User {
            id: "concurrent".to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            name: PersonName::default(),
            mobile: String::new(),
        };
        *self.concurrent_signup.lock().unwrap() = Some(user);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ApiError::NetworkUnreachable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_write(&self) -> Result<(), ApiError> {
        self.check_online()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(ApiError::ServerError {
                status: 500,
                body: "Internal Server Error".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl Backend for FakeBackend {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.list_users_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let mut users = self.users.lock().unwrap();
        let answer = users.clone();
        if let Some(user) = self.concurrent_signup.lock().unwrap().take() {
            users.push(user);
        }
        Ok(answer)
    }

    async fn create_user(&self, user: &User) -> Result<User, ApiError> {
        self.create_user_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        self.users.lock().unwrap().push(user.clone());
        Ok(user.clone())
    }

    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        self.list_events_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.events.lock().unwrap().clone())
    }

    async fn create_event(&self, event: &Event) -> Result<Event, ApiError> {
        self.create_event_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        self.events.lock().unwrap().push(event.clone());
        Ok(event.clone())
    }

    async fn patch_event(&self, id: &str, partial: &serde_json::Value) -> Result<Event, ApiError> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut events = self.events.lock().unwrap();
        let stored = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ApiError::ServerError {
                status: 404,
                body: "Not Found".to_string(),
            })?;

        let mut merged = serde_json::to_value(&*stored).unwrap();
        if let (Some(target), Some(patch)) = (merged.as_object_mut(), partial.as_object()) {
            for (k, v) in patch {
                target.insert(k.clone(), v.clone());
            }
        }
        *stored = serde_json::from_value(merged).unwrap();
        Ok(stored.clone())
    }
}

#[derive(Default)]
pub struct FakeImageHost {
    pub uploads: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl ImageHost for FakeImageHost {
    async fn upload(&self, base64_image: &str) -> Result<UploadedImage, ApiError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::UploadFailed("response has no url".to_string()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(base64_image.to_string());
        Ok(UploadedImage {
            url: format!("https://i.ibb.co/fake/{}.jpg", uploads.len()),
            size: base64_image.len() as u64,
            name: "photo.jpg".to_string(),
        })
    }
}

pub fn event(id: &str, needed: u32, volunteers: &[&str]) -> Event {
    Event {
        id: id.to_string(),
        name: Some(format!("Event {}", id)),
        description: Some("Help out".to_string()),
        date_time: Some("2026-05-01T09:00:00Z".to_string()),
        image_url: Some("https://i.ibb.co/x.jpg".to_string()),
        organizer_id: Some("org".to_string()),
        position: Position {
            latitude: 51.0,
            longitude: -114.0,
        },
        volunteers_needed: needed,
        volunteers_ids: volunteers.iter().map(|v| v.to_string()).collect(),
    }
}

pub fn temp_cache() -> (tempfile::TempDir, crate::cache::CacheManager) {
    let dir = tempfile::tempdir().unwrap();
    let cache = crate::cache::CacheManager::new(dir.path().to_path_buf()).unwrap();
    (dir, cache)
}
