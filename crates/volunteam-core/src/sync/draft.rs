//! The create-event form and its checks.

use std::path::PathBuf;

use chrono::DateTime;

use crate::models::{Event, Position};

use super::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Description,
    DateTime,
    VolunteersNeeded,
    Latitude,
    Longitude,
    Image,
}

impl std::fmt::Display for DraftField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftField::Name => write!(f, "name"),
            DraftField::Description => write!(f, "description"),
            DraftField::DateTime => write!(f, "date and time"),
            DraftField::VolunteersNeeded => write!(f, "number of volunteers needed"),
            DraftField::Latitude => write!(f, "latitude"),
            DraftField::Longitude => write!(f, "longitude"),
            DraftField::Image => write!(f, "picture"),
        }
    }
}

/// Where the event picture comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Already hosted; used as-is
    Remote(String),
    /// On this device; uploaded before the event is saved
    LocalFile(PathBuf),
}

impl ImageSource {
    /// `http(s)://` is remote; `file://` and bare paths are local.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            None
        } else if input.starts_with("http://") || input.starts_with("https://") {
            Some(ImageSource::Remote(input.to_string()))
        } else {
            let path = input.strip_prefix("file://").unwrap_or(input);
            Some(ImageSource::LocalFile(PathBuf::from(path)))
        }
    }
}

/// Raw form input for a new event.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub date_time: String,
    pub volunteers_needed: String,
    pub latitude: String,
    pub longitude: String,
    pub image: Option<ImageSource>,
}

/// A draft that passed `EventDraft::validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub name: String,
    pub description: String,
    pub date_time: String,
    pub volunteers_needed: u32,
    pub position: Position,
    pub image: ImageSource,
}

fn required(value: &str, field: DraftField) -> Result<String, SyncError> {
    let value = value.trim();
    if value.is_empty() {
        Err(SyncError::InvalidDraft(field))
    } else {
        Ok(value.to_string())
    }
}

fn coordinate(value: &str, limit: f64, field: DraftField) -> Result<f64, SyncError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or(SyncError::InvalidDraft(field))
}

impl EventDraft {
    pub fn validate(&self) -> Result<ValidDraft, SyncError> {
        let name = required(&self.name, DraftField::Name)?;
        let description = required(&self.description, DraftField::Description)?;

        let date_time = required(&self.date_time, DraftField::DateTime)?;
        if DateTime::parse_from_rfc3339(&date_time).is_err() {
            return Err(SyncError::InvalidDraft(DraftField::DateTime));
        }

        let volunteers_needed = self
            .volunteers_needed
            .trim()
            .parse::<u32>()
            .map_err(|_| SyncError::InvalidDraft(DraftField::VolunteersNeeded))?;

        let latitude = coordinate(&self.latitude, 90.0, DraftField::Latitude)?;
        let longitude = coordinate(&self.longitude, 180.0, DraftField::Longitude)?;

        let image = self
            .image
            .clone()
            .ok_or(SyncError::InvalidDraft(DraftField::Image))?;

        Ok(ValidDraft {
            name,
            description,
            date_time,
            volunteers_needed,
            position: Position { latitude, longitude },
            image,
        })
    }
}

impl ValidDraft {
    pub fn into_event(self, id: String, organizer_id: &str, image_url: String) -> Event {
        Event {
            id,
            name: Some(self.name),
            description: Some(self.description),
            date_time: Some(self.date_time),
            image_url: Some(image_url),
            organizer_id: Some(organizer_id.to_string()),
            position: self.position,
            volunteers_needed: self.volunteers_needed,
            volunteers_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> EventDraft {
        EventDraft {
            name: " Beach cleanup ".to_string(),
            description: "Bring gloves".to_string(),
            date_time: "2026-06-01T10:00:00-06:00".to_string(),
            volunteers_needed: "8".to_string(),
            latitude: "51.0447".to_string(),
            longitude: "-114.0719".to_string(),
            image: Some(ImageSource::Remote("https://i.ibb.co/a.jpg".to_string())),
        }
    }

    fn invalid_field(draft: &EventDraft) -> Option<DraftField> {
        match draft.validate() {
            Err(SyncError::InvalidDraft(field)) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_valid_draft() {
        let valid = filled().validate().expect("valid");
        assert_eq!(valid.name, "Beach cleanup");
        assert_eq!(valid.volunteers_needed, 8);
        assert_eq!(valid.position, Position { latitude: 51.0447, longitude: -114.0719 });

        let event = valid.into_event("id1".to_string(), "user-7", "https://i.ibb.co/a.jpg".to_string());
        assert_eq!(event.organizer_id.as_deref(), Some("user-7"));
        assert!(event.volunteers_ids.is_empty());
    }

    #[test]
    fn test_each_field_is_checked() {
        let mut draft = filled();
        draft.name = "   ".to_string();
        assert_eq!(invalid_field(&draft), Some(DraftField::Name));

        let mut draft = filled();
        draft.date_time = "tomorrow".to_string();
        assert_eq!(invalid_field(&draft), Some(DraftField::DateTime));

        let mut draft = filled();
        draft.volunteers_needed = "-2".to_string();
        assert_eq!(invalid_field(&draft), Some(DraftField::VolunteersNeeded));

        let mut draft = filled();
        draft.latitude = "91".to_string();
        assert_eq!(invalid_field(&draft), Some(DraftField::Latitude));

        let mut draft = filled();
        draft.longitude = "NaN".to_string();
        assert_eq!(invalid_field(&draft), Some(DraftField::Longitude));

        let mut draft = filled();
        draft.image = None;
        assert_eq!(invalid_field(&draft), Some(DraftField::Image));
    }

    #[test]
    fn test_image_source_parse() {
        assert_eq!(
            ImageSource::parse("https://i.ibb.co/a.jpg"),
            Some(ImageSource::Remote("https://i.ibb.co/a.jpg".to_string()))
        );
        assert_eq!(
            ImageSource::parse("file:///tmp/photo.jpg"),
            Some(ImageSource::LocalFile(PathBuf::from("/tmp/photo.jpg")))
        );
        assert_eq!(
            ImageSource::parse("photos/me.png"),
            Some(ImageSource::LocalFile(PathBuf::from("photos/me.png")))
        );
        assert_eq!(ImageSource::parse("  "), None);
    }
}
