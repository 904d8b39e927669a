//! In-process event store.
//!
//! Holds both tables behind a mutex and applies the same range and
//! visibility rules as the hosted store. Suitable for local development
//! and tests; it can be told to fail upcoming calls to simulate an
//! unreliable backend, and it counts the calls it served.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::date_range::DateRange;
use crate::error::{AgendaError, AgendaResult};
use crate::event::{Event, EventDraft, EventInvitation, EventPatch, InvitationStatus};
use crate::remote::EventStore;

#[derive(Default)]
struct Tables {
    events: Vec<Event>,
    invitations: Vec<EventInvitation>,
    failures_pending: usize,
    failures_by_op: HashMap<String, usize>,
    calls: HashMap<&'static str, usize>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls fail with a store error.
    pub fn fail_next(&self, count: usize) {
        self.lock().failures_pending = count;
    }

    /// Make the next `count` calls to `operation` fail, leaving other calls alone.
    pub fn fail_next_on(&self, operation: &str, count: usize) {
        self.lock().failures_by_op.insert(operation.to_string(), count);
    }

    /// How many times `operation` has been invoked, failed attempts included.
    pub fn calls(&self, operation: &str) -> usize {
        self.lock().calls.get(operation).copied().unwrap_or(0)
    }

    /// Total write calls (inserts, updates, deletes) served or attempted.
    pub fn write_calls(&self) -> usize {
        ["insert_event", "update_event", "delete_event", "insert_invitation", "update_invitation_status"]
            .iter()
            .map(|op| self.calls(op))
            .sum()
    }

    /// Snapshot of the events table.
    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // Every mutation completes before its guard drops, so poisoning is ignored.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and consume one injected failure, if any.
    fn begin(&self, operation: &'static str) -> AgendaResult<MutexGuard<'_, Tables>> {
        let mut tables = self.lock();
        *tables.calls.entry(operation).or_insert(0) += 1;

        let targeted = match tables.failures_by_op.get_mut(operation) {
            Some(pending) if *pending > 0 => {
                *pending -= 1;
                true
            }
            _ => false,
        };
        if targeted || tables.failures_pending > 0 {
            if !targeted {
                tables.failures_pending -= 1;
            }
            return Err(AgendaError::Store(format!("{operation}: connection reset")));
        }
        Ok(tables)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_owned_events(&self, user_id: &str, range: &DateRange) -> AgendaResult<Vec<Event>> {
        let tables = self.begin("list_owned_events")?;
        Ok(tables
            .events
            .iter()
            .filter(|e| e.user_id == user_id && range.intersects(e.start_time, e.end_time))
            .cloned()
            .collect())
    }

    async fn list_invited_events(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> AgendaResult<Vec<Event>> {
        let tables = self.begin("list_invited_events")?;
        let visible: Vec<&str> = tables
            .invitations
            .iter()
            .filter(|inv| inv.invitee_id == user_id && inv.status.grants_visibility())
            .map(|inv| inv.event_id.as_str())
            .collect();

        Ok(tables
            .events
            .iter()
            .filter(|e| visible.contains(&e.id.as_str()))
            .filter(|e| range.intersects(e.start_time, e.end_time))
            .cloned()
            .collect())
    }

    async fn get_event(&self, event_id: &str) -> AgendaResult<Event> {
        let tables = self.begin("get_event")?;
        tables
            .events
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or_else(|| AgendaError::NotFound(format!("event {event_id}")))
    }

    async fn insert_event(&self, user_id: &str, draft: &EventDraft) -> AgendaResult<Event> {
        let mut tables = self.begin("insert_event")?;
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            start_time: draft.start_time,
            end_time: draft.end_time,
            created_at: Some(now),
            updated_at: Some(now),
        };
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, event_id: &str, patch: &EventPatch) -> AgendaResult<Event> {
        let mut tables = self.begin("update_event")?;
        let stored = tables
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| AgendaError::NotFound(format!("event {event_id}")))?;

        let mut updated = stored.patched(patch);
        updated.updated_at = Some(Utc::now());
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete_event(&self, event_id: &str) -> AgendaResult<()> {
        let mut tables = self.begin("delete_event")?;
        tables.events.retain(|e| e.id != event_id);
        // Mirrors the store-side cascade on event_invitations.event_id.
        tables.invitations.retain(|inv| inv.event_id != event_id);
        Ok(())
    }

    async fn insert_invitation(
        &self,
        event_id: &str,
        invitee_id: &str,
    ) -> AgendaResult<EventInvitation> {
        let mut tables = self.begin("insert_invitation")?;
        if !tables.events.iter().any(|e| e.id == event_id) {
            return Err(AgendaError::NotFound(format!("event {event_id}")));
        }
        let now = Utc::now();
        let invitation = EventInvitation {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            invitee_id: invitee_id.to_string(),
            status: InvitationStatus::Pending,
            created_at: Some(now),
            updated_at: Some(now),
        };
        tables.invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn update_invitation_status(
        &self,
        invitation_id: &str,
        status: InvitationStatus,
    ) -> AgendaResult<EventInvitation> {
        let mut tables = self.begin("update_invitation_status")?;
        let invitation = tables
            .invitations
            .iter_mut()
            .find(|inv| inv.id == invitation_id)
            .ok_or_else(|| AgendaError::NotFound(format!("invitation {invitation_id}")))?;

        invitation.status = status;
        invitation.updated_at = Some(Utc::now());
        Ok(invitation.clone())
    }
}
