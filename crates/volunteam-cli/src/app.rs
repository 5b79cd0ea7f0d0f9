//! Application state for the volunteam command line.
//!
//! `App` owns the configuration, the cache, both HTTP clients, the session
//! store and the event board, and runs one command against them.

use std::io::{self, Write};

use anyhow::Result;
use tracing::{debug, info, warn};

use volunteam_core::auth::{sanitize_email, Authenticator};
use volunteam_core::sync::{EventDraft, EventSource, EventSync, ImageSource};
use volunteam_core::utils::{format_bytes, format_coordinates, truncate_string};
use volunteam_core::{ApiClient, CacheManager, Config, EventBoard, ImageClient, Session, SessionStore};

/// Width of the event name column in `events`
const NAME_COLUMN_WIDTH: usize = 32;

const NOT_SIGNED_IN: &str = "Please log in first.";

pub struct App {
    config: Config,
    cache: CacheManager,
    api: ApiClient,
    images: ImageClient,
    sessions: SessionStore,
    board: EventBoard,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                let mut config = Config::default();
                config.apply_env(|name| std::env::var(name).ok());
                config
            }
        };
        debug!(api = %config.api_base_url, offline = config.offline_mode, "Config loaded");

        let cache_dir = config.cache_dir()?;
        debug!(?cache_dir, "Cache directory configured");

        let cache = CacheManager::new(cache_dir)?;
        let api = ApiClient::new(&config)?;
        let images = ImageClient::new(&config)?;

        Ok(Self {
            config,
            cache,
            api,
            images,
            sessions: SessionStore::new(),
            board: EventBoard::default(),
        })
    }

    fn authenticator(&self) -> Authenticator<'_, ApiClient> {
        Authenticator::new(&self.api, &self.cache, &self.sessions)
    }

    fn event_sync(&self) -> EventSync<'_, ApiClient, ImageClient> {
        EventSync::new(&self.api, &self.images, &self.cache).offline(self.config.offline_mode)
    }

    /// Publish the cached session, if any, and attach its token to the client.
    pub fn restore_session(&mut self) {
        if let Some(session) = self.authenticator().restore() {
            self.api.set_token(session.access_token);
        }
    }

    fn require_session(&self) -> Result<Session> {
        self.sessions
            .current()
            .ok_or_else(|| anyhow::anyhow!(NOT_SIGNED_IN))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email {
            Some(email) => email,
            None => Self::prompt_email(self.config.last_email.as_deref())?,
        };
        let password = rpassword::prompt_password("Password: ")?;

        eprintln!("Authenticating...");
        let result = self.authenticator().handle_authentication(&email, &password).await;
        let session = result.map_err(|e| {
            warn!(error = %e, "Authentication failed");
            anyhow::anyhow!(e.user_message())
        })?;

        self.api.set_token(session.access_token.clone());
        let email = sanitize_email(&email);
        if let Err(e) = Config::remember_email(&email) {
            warn!(error = %e, "Failed to save config");
        }
        self.config.last_email = Some(email);

        println!("Signed in as {}", session.user.display_name());
        Ok(())
    }

    pub fn logout(&self) {
        self.authenticator().logout();
        println!("Signed out.");
    }

    pub fn whoami(&self) -> Result<()> {
        let session = self.require_session()?;
        println!("{} <{}>", session.user.display_name(), session.email());
        println!("id: {}", session.user_id());
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    async fn refresh_events(&self) -> EventSource {
        let source = self.event_sync().refresh(&self.board).await;
        info!(count = self.board.len(), ?source, "Event list loaded");
        source
    }

    pub async fn list_events(&self) -> Result<()> {
        let session = self.require_session()?;
        let source = self.refresh_events().await;

        for event in self.board.events() {
            println!(
                "{:<24} {:<width$} {:<26} {:<22} {}",
                event.id,
                truncate_string(event.display_name(), NAME_COLUMN_WIDTH),
                event.formatted_datetime(),
                format_coordinates(event.position.latitude, event.position.longitude),
                event.status_for(session.user_id()),
                width = NAME_COLUMN_WIDTH,
            );
        }

        let count = self.board.len();
        let plural = if count == 1 { "" } else { "s" };
        match source {
            EventSource::Remote => println!("{} event{} found", count, plural),
            EventSource::Cache { age, stale } => {
                let note = if stale { ", may be out of date" } else { "" };
                println!("{} event{} found (offline, cached {}{})", count, plural, age, note)
            }
            EventSource::Defaults => println!("{} event{} found (offline)", count, plural),
        }
        Ok(())
    }

    pub async fn show_event(&self, id: &str) -> Result<()> {
        let session = self.require_session()?;
        self.refresh_events().await;

        let event = self
            .board
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("No event with id {}", id))?;

        println!("{}", event.display_name());
        if let Some(ref description) = event.description {
            println!("{}", description);
        }
        println!();
        println!("When:       {}", event.formatted_datetime());
        println!("Status:     {}", event.status_for(session.user_id()));
        if let Some(ref url) = event.image_url {
            println!("Picture:    {}", url);
        }
        println!("Directions: {}", event.directions_url());
        println!("Share:      {}", event.share_url());

        if let Some(organizer) = self.event_sync().organizer(&event).await {
            println!("Organizer:  {}", organizer.display_name());
            if let Some(call) = organizer.call_url() {
                println!("Call:       {}", call);
            }
            if let Some(text) = organizer.text_url() {
                println!("Text:       {}", text);
            }
        }
        Ok(())
    }

    pub async fn volunteer(&self, id: &str) -> Result<()> {
        let session = self.require_session()?;
        self.refresh_events().await;

        let event = self
            .event_sync()
            .volunteer(&self.board, id, &session)
            .await
            .map_err(|e| {
                warn!(error = %e, "Volunteer failed");
                anyhow::anyhow!(e.user_message())
            })?;

        println!("You have volunteered for {}!", event.display_name());
        println!("{}", event.status_for(session.user_id()));
        Ok(())
    }

    pub async fn create_event(&self) -> Result<()> {
        let session = self.require_session()?;

        let draft = EventDraft {
            name: Self::prompt("Name")?,
            description: Self::prompt("About")?,
            date_time: Self::prompt("Date and time (e.g. 2026-05-01T09:00:00-06:00)")?,
            volunteers_needed: Self::prompt("Volunteers needed")?,
            latitude: Self::prompt("Latitude")?,
            longitude: Self::prompt("Longitude")?,
            image: ImageSource::parse(&Self::prompt("Picture (file path or URL)")?),
        };

        eprintln!("Saving...");
        let created = self
            .event_sync()
            .create_event(&self.board, &draft, &session)
            .await
            .map_err(|e| {
                warn!(error = %e, "Create event failed");
                anyhow::anyhow!(e.user_message())
            })?;

        if let Some(ref picture) = created.picture {
            println!("Picture uploaded: {} ({})", picture.name, format_bytes(picture.size));
        }
        println!("Event created successfully ({}).", created.event.id);
        Ok(())
    }

    // =========================================================================
    // Prompts
    // =========================================================================

    fn prompt(label: &str) -> Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    fn prompt_email(last_email: Option<&str>) -> Result<String> {
        match last_email {
            Some(last) => {
                let input = Self::prompt(&format!("Email [{}]", last))?;
                if input.is_empty() {
                    Ok(last.to_string())
                } else {
                    Ok(input)
                }
            }
            None => Self::prompt("Email"),
        }
    }
}
