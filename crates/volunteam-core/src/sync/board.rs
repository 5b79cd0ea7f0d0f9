//! In-memory event list with a revision guard.
//!
//! Every local change (an optimistic write, or the server copy that confirms
//! it) bumps the board revision and records it against the event id. A fetch
//! takes a ticket before it starts; when its result lands, events changed
//! locally after the ticket keep their local copy instead of the fetched one.
//! Events with a write still awaiting the server keep their local copy
//! whatever the ticket.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::models::Event;

/// Board revision observed when a fetch started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// A local write that has not been confirmed by the server yet.
#[derive(Debug, Clone)]
pub struct LocalWrite {
    event_id: String,
    revision: u64,
    previous: Option<Event>,
    previous_revision: Option<u64>,
}

#[derive(Default)]
struct BoardState {
    events: Vec<Event>,
    revision: u64,
    /// Revision of the last local change per event
    local_writes: HashMap<String, u64>,
    /// Revision of the write awaiting confirm or rollback per event
    pending: HashMap<String, u64>,
}

impl BoardState {
    fn position(&self, id: &str) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }

    fn upsert(&mut self, event: Event) {
        match self.position(&event.id) {
            Some(i) => self.events[i] = event,
            None => self.events.push(event),
        }
    }

    fn bump(&mut self, event_id: &str) -> (u64, Option<u64>) {
        self.revision += 1;
        let previous = self.local_writes.insert(event_id.to_string(), self.revision);
        (self.revision, previous)
    }

    fn is_newer_than(&self, id: &str, ticket: FetchTicket) -> bool {
        self.pending.contains_key(id) || self.local_writes.get(id).is_some_and(|&rev| rev > ticket.0)
    }
}

/// Events currently shown to the user. Share it by reference.
#[derive(Default)]
pub struct EventBoard {
    state: Mutex<BoardState>,
}

impl EventBoard {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            state: Mutex::new(BoardState {
                events,
                ..BoardState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        // State stays consistent between statements, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    pub fn get(&self, id: &str) -> Option<Event> {
        let state = self.lock();
        state.position(id).map(|i| state.events[i].clone())
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Whether `id` has a write still waiting for the server.
    pub fn is_pending(&self, id: &str) -> bool {
        self.lock().pending.contains_key(id)
    }

    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket(self.lock().revision)
    }

    /// Replace the list with a fetch result, keeping events changed locally
    /// after `ticket` was taken and events with a pending write. Returns how
    /// many local copies were kept.
    pub fn apply_fetch(&self, ticket: FetchTicket, fetched: Vec<Event>) -> usize {
        let mut state = self.lock();

        let newer: HashMap<String, Event> = state
            .events
            .iter()
            .filter(|e| state.is_newer_than(&e.id, ticket))
            .map(|e| (e.id.clone(), e.clone()))
            .collect();

        let mut events: Vec<Event> = fetched
            .into_iter()
            .map(|e| newer.get(&e.id).cloned().unwrap_or(e))
            .collect();

        // Locally created events the fetch did not know about yet
        for (id, local) in &newer {
            if !events.iter().any(|e| &e.id == id) {
                events.push(local.clone());
            }
        }

        state.events = events;
        state.local_writes.retain(|_, rev| *rev > ticket.0);

        if !newer.is_empty() {
            debug!(kept = newer.len(), "Kept newer local events over fetched copies");
        }
        newer.len()
    }

    /// Apply `event` locally ahead of server confirmation.
    pub fn apply_local(&self, event: Event) -> LocalWrite {
        let mut state = self.lock();
        let event_id = event.id.clone();

        let previous = state.position(&event_id).map(|i| state.events[i].clone());
        let (revision, previous_revision) = state.bump(&event_id);
        state.pending.insert(event_id.clone(), revision);
        state.upsert(event);

        LocalWrite {
            event_id,
            revision,
            previous,
            previous_revision,
        }
    }

    /// Apply an event the server already acknowledged, such as one it just created.
    pub fn apply_confirmed(&self, event: Event) {
        let mut state = self.lock();
        state.bump(&event.id);
        state.upsert(event);
    }

    /// Replace the optimistic copy with the server-acknowledged event.
    /// Ignored if a newer local write replaced it in the meantime.
    pub fn confirm(&self, write: &LocalWrite, acknowledged: Event) {
        let mut state = self.lock();
        if state.pending.get(&write.event_id) != Some(&write.revision) {
            return;
        }

        state.pending.remove(&write.event_id);
        // The acknowledged copy is newer than any fetch already in flight
        state.bump(&write.event_id);
        state.upsert(acknowledged);
    }

    /// Restore the state from before `write`.
    /// Ignored if a newer local write replaced it in the meantime.
    pub fn rollback(&self, write: LocalWrite) {
        let mut state = self.lock();
        if state.pending.get(&write.event_id) != Some(&write.revision) {
            return;
        }

        state.pending.remove(&write.event_id);
        match write.previous {
            Some(previous) => state.upsert(previous),
            None => state.events.retain(|e| e.id != write.event_id),
        }
        match write.previous_revision {
            Some(rev) => {
                state.local_writes.insert(write.event_id, rev);
            }
            None => {
                state.local_writes.remove(&write.event_id);
            }
        }
    }
}
