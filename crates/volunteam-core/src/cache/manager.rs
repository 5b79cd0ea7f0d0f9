use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::Event;

pub const KEY_USER_INFO: &str = "userInfo";
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
pub const KEY_EVENTS: &str = "eventsCache";

/// Cached entries older than this are reported as stale. Informational only;
/// stale entries are still served.
const CACHE_STALE_MINUTES: i64 = 60;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Storage unavailable for '{key}': {source}")]
    StorageUnavailable {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Cache entry '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid cache key: '{0}'")]
    InvalidKey(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&cache_dir).map_err(|source| CacheError::StorageUnavailable {
            key: cache_dir.display().to_string(),
            source,
        })?;
        Ok(Self { cache_dir })
    }

    fn validate_key(key: &str) -> Result<(), CacheError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(CacheError::InvalidKey(key.to_string()))
        }
    }

    fn cache_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        Self::validate_key(key)?;
        Ok(self.cache_dir.join(format!("{}.json", key)))
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let path = self.cache_path(key)?;
        let contents = serde_json::to_string_pretty(&CachedData::new(value))
            .map_err(|source| CacheError::Corrupt {
                key: key.to_string(),
                source,
            })?;
        std::fs::write(&path, contents).map_err(|source| CacheError::StorageUnavailable {
            key: key.to_string(),
            source,
        })?;
        debug!(key, "Cache entry written");
        Ok(())
    }

    /// Load the value stored under `key` along with when it was written.
    pub fn get_entry<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CachedData<T>>, CacheError> {
        let path = self.cache_path(key)?;
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::StorageUnavailable {
                    key: key.to_string(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }

        let cached = serde_json::from_str(&contents).map_err(|source| CacheError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(cached))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        Ok(self.get_entry(key)?.map(|cached| cached.data))
    }

    /// Delete every key in `keys`. Keys that were never set are ignored.
    pub fn remove(&self, keys: &[&str]) -> Result<(), CacheError> {
        for key in keys {
            let path = self.cache_path(key)?;
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(key, "Cache entry removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(CacheError::StorageUnavailable {
                        key: key.to_string(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    // ===== Events =====

    pub fn load_events(&self) -> Result<Option<CachedData<Vec<Event>>>, CacheError> {
        self.get_entry(KEY_EVENTS)
    }

    pub fn save_events(&self, events: &[Event]) -> Result<(), CacheError> {
        self.set(KEY_EVENTS, events)
    }

    /// Age of the cached event list for status display
    pub fn events_age(&self) -> String {
        match self.load_events() {
            Ok(Some(cached)) => cached.age_display(),
            Ok(None) => "never".to_string(),
            Err(e) => {
                debug!(error = %e, "Failed to load events cache for age display");
                "never".to_string()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn manager() -> (tempfile::TempDir, CacheManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = CacheManager::new(dir.path().join("cache")).expect("cache manager");
        (dir, cache)
    }

    #[test]
    fn test_set_then_get_returns_equal_value() {
        let (_dir, cache) = manager();
        let value = json!({
            "id": "1",
            "name": {"first": "", "last": ""},
            "tags": ["a", "b"],
            "n": 3.5,
            "flag": null
        });
        cache.set("userInfo", &value).expect("set");
        let loaded: Option<serde_json::Value> = cache.get("userInfo").expect("get");
        assert_eq!(loaded, Some(value));
    }

    #[test]
    fn test_set_overwrites() {
        let (_dir, cache) = manager();
        cache.set("accessToken", "first").expect("set");
        cache.set("accessToken", "second").expect("set");
        let loaded: Option<String> = cache.get("accessToken").expect("get");
        assert_eq!(loaded.as_deref(), Some("second"));
    }

    #[test]
    fn test_get_missing_key_is_absent() {
        let (_dir, cache) = manager();
        let loaded: Option<String> = cache.get("neverSet").expect("get");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, cache) = manager();
        cache.set("userInfo", &json!({"id": "1"})).expect("set");
        cache.remove(&["userInfo", "accessToken"]).expect("first remove");
        cache.remove(&["userInfo", "accessToken"]).expect("second remove");
        cache.remove(&[]).expect("empty remove");
        let loaded: Option<serde_json::Value> = cache.get("userInfo").expect("get");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let (dir, cache) = manager();
        std::fs::write(dir.path().join("cache").join("eventsCache.json"), "{not json").expect("write");
        assert!(matches!(
            cache.get::<Vec<Event>>(KEY_EVENTS),
            Err(CacheError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let (_dir, cache) = manager();
        assert!(matches!(cache.set("../escape", "x"), Err(CacheError::InvalidKey(_))));
        assert!(matches!(cache.get::<String>(""), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_write_to_missing_dir_is_storage_unavailable() {
        let (dir, cache) = manager();
        std::fs::remove_dir_all(dir.path().join("cache")).expect("remove dir");
        assert!(matches!(
            cache.set("accessToken", "token"),
            Err(CacheError::StorageUnavailable { .. })
        ));
    }

    #[test]
    fn test_events_round_trip_and_age() {
        let (_dir, cache) = manager();
        assert_eq!(cache.events_age(), "never");

        let events = crate::models::default_events();
        cache.save_events(&events).expect("save");
        let loaded = cache.load_events().expect("load").expect("present");
        assert_eq!(loaded.data, events);
        assert_eq!(cache.events_age(), "just now");
    }

    #[test]
    fn test_coordinates_survive_round_trip_exactly() {
        let (_dir, cache) = manager();
        let mut event = crate::models::default_events().remove(0);
        event.position = crate::models::Position {
            latitude: 51.010801915407036,
            longitude: -114.11677222698927,
        };
        cache.save_events(std::slice::from_ref(&event)).expect("save");

        let loaded = cache.load_events().expect("load").expect("present");
        assert_eq!(loaded.data[0].position.latitude.to_bits(), 51.010801915407036f64.to_bits());
        assert_eq!(loaded.data[0].position.longitude.to_bits(), (-114.11677222698927f64).to_bits());
        assert_eq!(loaded.data, vec![event]);
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(61);
        assert!(old.is_stale());
    }

    #[test]
    fn test_cached_data_age_display() {
        let mut cached = CachedData::new(());
        assert_eq!(cached.age_display(), "just now");

        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");

        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Utc::now() - Duration::hours(50);
        assert_eq!(cached.age_display(), "2d ago");

        cached.cached_at = Utc::now() + Duration::minutes(10);
        assert_eq!(cached.age_display(), "just now");
    }
}
