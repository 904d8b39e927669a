//! Remote event store access.
//!
//! [`EventStore`] is the raw backend: one method per round-trip, no retry.
//! [`StoreClient`] is what the rest of the crate talks to; it wraps every
//! call in [`retry`] with its [`RetryPolicy`] and keeps no local cache.

pub mod memory;
pub mod rest;

use async_trait::async_trait;

use crate::date_range::DateRange;
use crate::error::AgendaResult;
use crate::event::{Event, EventDraft, EventInvitation, EventPatch, InvitationStatus};
use crate::retry::{RetryPolicy, retry};

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Backend for the `events` and `event_invitations` tables.
///
/// Range reads select events whose interval intersects the closed range.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events owned by `user_id` intersecting `range`.
    async fn list_owned_events(&self, user_id: &str, range: &DateRange) -> AgendaResult<Vec<Event>>;

    /// Events `user_id` is invited to (invitation not declined) intersecting `range`.
    async fn list_invited_events(&self, user_id: &str, range: &DateRange)
    -> AgendaResult<Vec<Event>>;

    /// A single event, or `NotFound`.
    async fn get_event(&self, event_id: &str) -> AgendaResult<Event>;

    async fn insert_event(&self, user_id: &str, draft: &EventDraft) -> AgendaResult<Event>;

    /// Apply `patch`, or `NotFound` if no event has `event_id`.
    async fn update_event(&self, event_id: &str, patch: &EventPatch) -> AgendaResult<Event>;

    /// Remove the event. Deleting a missing event is not an error.
    async fn delete_event(&self, event_id: &str) -> AgendaResult<()>;

    async fn insert_invitation(&self, event_id: &str, invitee_id: &str)
    -> AgendaResult<EventInvitation>;

    async fn update_invitation_status(
        &self,
        invitation_id: &str,
        status: InvitationStatus,
    ) -> AgendaResult<EventInvitation>;
}

/// Typed store operations, each a fresh remote round-trip guarded by retry.
pub struct StoreClient<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: EventStore> StoreClient<S> {
    /// Client with the default policy (3 attempts, 1s base delay).
    pub fn new(store: S) -> Self {
        Self::with_policy(store, RetryPolicy::default())
    }

    pub fn with_policy(store: S, policy: RetryPolicy) -> Self {
        StoreClient { store, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn fetch_events(&self, user_id: &str, range: &DateRange) -> AgendaResult<Vec<Event>> {
        retry(&self.policy, || self.store.list_owned_events(user_id, range)).await
    }

    pub async fn fetch_invited_events(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> AgendaResult<Vec<Event>> {
        retry(&self.policy, || self.store.list_invited_events(user_id, range)).await
    }

    pub async fn fetch_event(&self, event_id: &str) -> AgendaResult<Event> {
        retry(&self.policy, || self.store.get_event(event_id)).await
    }

    pub async fn create_event(&self, user_id: &str, draft: &EventDraft) -> AgendaResult<Event> {
        let event = retry(&self.policy, || self.store.insert_event(user_id, draft)).await?;
        tracing::info!(event_id = %event.id, user_id, "event created");
        Ok(event)
    }

    pub async fn update_event(&self, event_id: &str, patch: &EventPatch) -> AgendaResult<Event> {
        let event = retry(&self.policy, || self.store.update_event(event_id, patch)).await?;
        tracing::info!(event_id, "event updated");
        Ok(event)
    }

    pub async fn delete_event(&self, event_id: &str) -> AgendaResult<()> {
        retry(&self.policy, || self.store.delete_event(event_id)).await?;
        tracing::info!(event_id, "event deleted");
        Ok(())
    }

    pub async fn create_invitation(
        &self,
        event_id: &str,
        invitee_id: &str,
    ) -> AgendaResult<EventInvitation> {
        let invitation =
            retry(&self.policy, || self.store.insert_invitation(event_id, invitee_id)).await?;
        tracing::info!(invitation_id = %invitation.id, event_id, invitee_id, "invitation sent");
        Ok(invitation)
    }

    pub async fn set_invitation_status(
        &self,
        invitation_id: &str,
        status: InvitationStatus,
    ) -> AgendaResult<EventInvitation> {
        let invitation = retry(&self.policy, || {
            self.store.update_invitation_status(invitation_id, status)
        })
        .await?;
        tracing::info!(invitation_id, status = %status, "invitation answered");
        Ok(invitation)
    }
}
