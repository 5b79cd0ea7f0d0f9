//! Local key-value cache for offline data access.
//!
//! This module provides the `CacheManager` for storing JSON-serializable
//! values under plain string keys, one file per key. Reads that fail are
//! expected to be treated as "absent" by callers; writes report errors.
//!
//! Well-known keys:
//! - `userInfo`, `accessToken`: the persisted session
//! - `eventsCache`: the last event list fetched from the backend

pub mod manager;

pub use manager::{CacheError, CacheManager, CachedData, KEY_ACCESS_TOKEN, KEY_EVENTS, KEY_USER_INFO};
