use chrono::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Volunteer state of an event as seen by one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Full,
    Volunteered,
    Open { joined: usize, needed: u32 },
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Full => write!(f, "Team is full"),
            EventStatus::Volunteered => write!(f, "Volunteered"),
            EventStatus::Open { joined, needed } => write!(f, "{}/{} joined", joined, needed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Event {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 start time as entered by the organizer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_id: Option<String>,
    pub position: Position,
    #[serde(default)]
    pub volunteers_needed: u32,
    #[serde(default)]
    pub volunteers_ids: Vec<String>,
}

impl Event {
    pub fn volunteer_count(&self) -> usize {
        self.volunteers_ids.len()
    }

    /// Count is compared, never clamped: concurrent volunteers can push it past the cap.
    pub fn is_full(&self) -> bool {
        self.volunteers_ids.len() >= self.volunteers_needed as usize
    }

    pub fn has_volunteer(&self, user_id: &str) -> bool {
        self.volunteers_ids.iter().any(|id| id == user_id)
    }

    pub fn status_for(&self, user_id: &str) -> EventStatus {
        if self.is_full() {
            EventStatus::Full
        } else if self.has_volunteer(user_id) {
            EventStatus::Volunteered
        } else {
            EventStatus::Open {
                joined: self.volunteer_count(),
                needed: self.volunteers_needed,
            }
        }
    }

    /// Copy of this event with `user_id` appended to the volunteer list.
    pub fn with_volunteer(&self, user_id: &str) -> Self {
        let mut updated = self.clone();
        updated.volunteers_ids.push(user_id.to_string());
        updated
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled event")
    }

    /// Formatted start datetime: "Feb 06, 2026 @ 07:00 PM"
    pub fn formatted_datetime(&self) -> String {
        match &self.date_time {
            Some(date) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
                    dt.format("%b %d, %Y @ %I:%M %p").to_string()
                } else {
                    date.chars().take(16).collect()
                }
            }
            None => "TBD".to_string(),
        }
    }

    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.position.latitude, self.position.longitude
        )
    }

    pub fn share_url(&self) -> String {
        format!(
            "mailto:?subject={}&body={}",
            urlencoding::encode(self.name.as_deref().unwrap_or_default()),
            urlencoding::encode(self.description.as_deref().unwrap_or_default())
        )
    }
}

/// Markers shown when neither the backend nor the cache has any events.
pub fn default_events() -> Vec<Event> {
    const DEFAULTS: [(&str, f64, f64); 4] = [
        ("e3c95682-870f-4080-a0d7-ae8e23e2534f", 51.105761, -114.106943),
        ("98301b22-2b76-44f1-a8da-8c86c56b0367", 51.04112, -114.069325),
        ("d7b8ea73-ba2c-4fc3-9348-9814076124bd", 51.01222958257112, -114.11677222698927),
        ("d1a6b9ea-877d-4711-b8d7-af8f1bce4d29", 51.010801915407036, -114.07823592424393),
    ];

    DEFAULTS
        .iter()
        .map(|&(id, latitude, longitude)| Event {
            id: id.to_string(),
            name: None,
            description: None,
            date_time: None,
            image_url: None,
            organizer_id: None,
            position: Position { latitude, longitude },
            volunteers_needed: 0,
            volunteers_ids: Vec::new(),
        })
        .collect()
}
