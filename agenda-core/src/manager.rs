//! Create, update, delete and read events for one user.
//!
//! Each call is a one-shot operation. Business failures (`EmptyTitle`,
//! `InvalidRange`, `Conflict`) are raised before any write is issued; store
//! errors that survive retry propagate unchanged. The conflict check reads
//! the owner's events and then writes without any isolation, so a concurrent
//! writer in another session can still slip in between the two.

use chrono::{DateTime, Utc};

use crate::aggregate;
use crate::date_range::DateRange;
use crate::error::AgendaResult;
use crate::event::{Event, EventDraft, EventInvitation, EventPatch, InvitationStatus};
use crate::remote::{EventStore, StoreClient};
use crate::validate::{check_schedule, validate_times, validate_title};

pub struct EventManager<S> {
    client: StoreClient<S>,
}

impl<S: EventStore> EventManager<S> {
    pub fn new(client: StoreClient<S>) -> Self {
        EventManager { client }
    }

    pub fn client(&self) -> &StoreClient<S> {
        &self.client
    }

    /// Owned and invited events intersecting `range`, deduplicated.
    /// Both reads run concurrently; if either fails the whole read fails.
    pub async fn fetch(&self, user_id: &str, range: &DateRange) -> AgendaResult<Vec<Event>> {
        let (owned, invited) = tokio::try_join!(
            self.client.fetch_events(user_id, range),
            self.client.fetch_invited_events(user_id, range),
        )?;
        tracing::debug!(
            user_id,
            owned = owned.len(),
            invited = invited.len(),
            "fetched events"
        );
        Ok(aggregate::merge(&owned, &invited))
    }

    pub async fn create(&self, user_id: &str, draft: &EventDraft) -> AgendaResult<Event> {
        validate_title(&draft.title)?;
        self.ensure_free(user_id, draft.start_time, draft.end_time, None)
            .await?;
        self.client.create_event(user_id, draft).await
    }

    /// Apply `patch` to an event owned by `user_id`.
    ///
    /// A patch that moves the event is checked against the owner's other
    /// events. When only one bound is supplied the other is taken from the
    /// stored event. Patches without times skip the schedule check.
    pub async fn update(
        &self,
        user_id: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> AgendaResult<Event> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }

        match (patch.start_time, patch.end_time) {
            (Some(start), Some(end)) => {
                self.ensure_free(user_id, start, end, Some(event_id)).await?;
            }
            (None, None) => {}
            _ => {
                let moved = self.client.fetch_event(event_id).await?.patched(patch);
                self.ensure_free(user_id, moved.start_time, moved.end_time, Some(event_id))
                    .await?;
            }
        }

        self.client.update_event(event_id, patch).await
    }

    pub async fn delete(&self, event_id: &str) -> AgendaResult<()> {
        self.client.delete_event(event_id).await
    }

    pub async fn invite(&self, event_id: &str, invitee_id: &str) -> AgendaResult<EventInvitation> {
        self.client.create_invitation(event_id, invitee_id).await
    }

    pub async fn respond(
        &self,
        invitation_id: &str,
        status: InvitationStatus,
    ) -> AgendaResult<EventInvitation> {
        self.client.set_invitation_status(invitation_id, status).await
    }

    /// Validate `[start, end]` and check it against the owner's events.
    ///
    /// Only events intersecting the candidate can conflict, so the read is
    /// limited to that interval.
    async fn ensure_free(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> AgendaResult<()> {
        validate_times(start, end)?;
        let window = DateRange::new(start, end)?;
        let existing = self.client.fetch_events(user_id, &window).await?;
        check_schedule(start, end, &existing, exclude_id).inspect_err(|err| {
            tracing::debug!(user_id, error = %err, "schedule check rejected change");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgendaError;
    use crate::remote::MemoryStore;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, hour, min, 0).unwrap()
    }

    fn day() -> DateRange {
        DateRange::new(at(0, 0), at(23, 59)).unwrap()
    }

    fn manager() -> EventManager<MemoryStore> {
        EventManager::new(StoreClient::new(MemoryStore::new()))
    }

    fn store(manager: &EventManager<MemoryStore>) -> &MemoryStore {
        manager.client().store()
    }

    async fn seed(
        manager: &EventManager<MemoryStore>,
        user: &str,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Event {
        store(manager)
            .insert_event(user, &EventDraft::new(title, start, end))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_persists_event() {
        let manager = manager();
        let draft = EventDraft::new("Planning", at(10, 0), at(11, 0)).with_description("Q2");

        let event = manager.create("alice", &draft).await.unwrap();

        assert!(!event.id.is_empty());
        assert_eq!(event.user_id, "alice");
        assert_eq!(event.description.as_deref(), Some("Q2"));
        assert!(event.created_at.is_some());
        assert_eq!(store(&manager).events(), vec![event]);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input_without_store_calls() {
        let manager = manager();

        let err = manager
            .create("alice", &EventDraft::new("  ", at(10, 0), at(11, 0)))
            .await
            .unwrap_err();
        assert_eq!(err, AgendaError::EmptyTitle);

        let err = manager
            .create("alice", &EventDraft::new("Backwards", at(11, 0), at(10, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, AgendaError::InvalidRange { .. }));

        assert_eq!(store(&manager).calls("list_owned_events"), 0);
        assert_eq!(store(&manager).write_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_conflict_performs_no_write() {
        let manager = manager();
        let existing = seed(&manager, "alice", "Standup", at(9, 30), at(10, 0)).await;

        // Touching at 10:00 counts as overlap.
        let err = manager
            .create("alice", &EventDraft::new("Planning", at(10, 0), at(11, 0)))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AgendaError::Conflict {
                event_id: existing.id
            }
        );
        assert_eq!(store(&manager).calls("insert_event"), 1);
        assert_eq!(store(&manager).events().len(), 1);
    }

    #[tokio::test]
    async fn test_conflicts_are_scoped_to_owner() {
        let manager = manager();
        let theirs = seed(&manager, "bob", "Bob's call", at(10, 0), at(11, 0)).await;
        store(&manager)
            .insert_invitation(&theirs.id, "alice")
            .await
            .unwrap();

        let mine = manager
            .create("alice", &EventDraft::new("Focus", at(10, 0), at(11, 0)))
            .await;
        assert!(mine.is_ok());
    }

    #[tokio::test]
    async fn test_update_against_own_stored_copy_succeeds() {
        let manager = manager();
        let event = seed(&manager, "alice", "Planning", at(10, 0), at(11, 0)).await;
        let patch = EventPatch {
            start_time: Some(at(10, 30)),
            end_time: Some(at(11, 30)),
            ..Default::default()
        };

        let updated = manager.update("alice", &event.id, &patch).await.unwrap();
        assert_eq!(updated.start_time, at(10, 30));
        assert_eq!(updated.end_time, at(11, 30));
    }

    #[tokio::test]
    async fn test_update_into_other_event_conflicts() {
        let manager = manager();
        let moving = seed(&manager, "alice", "Planning", at(8, 0), at(9, 0)).await;
        let blocker = seed(&manager, "alice", "Lunch", at(12, 0), at(13, 0)).await;
        let patch = EventPatch {
            start_time: Some(at(12, 30)),
            end_time: Some(at(13, 30)),
            ..Default::default()
        };

        let err = manager.update("alice", &moving.id, &patch).await.unwrap_err();
        assert_eq!(
            err,
            AgendaError::Conflict {
                event_id: blocker.id
            }
        );
        assert_eq!(store(&manager).calls("update_event"), 0);
    }

    #[tokio::test]
    async fn test_update_without_times_skips_schedule_check() {
        let manager = manager();
        let event = seed(&manager, "alice", "Planning", at(10, 0), at(11, 0)).await;
        let patch = EventPatch {
            title: Some("Roadmap".into()),
            ..Default::default()
        };

        let updated = manager.update("alice", &event.id, &patch).await.unwrap();
        assert_eq!(updated.title, "Roadmap");
        assert_eq!(store(&manager).calls("list_owned_events"), 0);
        assert_eq!(store(&manager).calls("get_event"), 0);
    }

    #[tokio::test]
    async fn test_update_with_one_bound_uses_stored_other_bound() {
        let manager = manager();
        let event = seed(&manager, "alice", "Planning", at(10, 0), at(11, 0)).await;
        let patch = EventPatch {
            end_time: Some(at(9, 0)),
            ..Default::default()
        };

        let err = manager.update("alice", &event.id, &patch).await.unwrap_err();
        assert_eq!(
            err,
            AgendaError::InvalidRange {
                start: at(10, 0),
                end: at(9, 0)
            }
        );
        assert_eq!(store(&manager).calls("update_event"), 0);

        let patch = EventPatch {
            end_time: Some(at(12, 0)),
            ..Default::default()
        };
        let updated = manager.update("alice", &event.id, &patch).await.unwrap();
        assert_eq!(updated.end_time, at(12, 0));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_title() {
        let manager = manager();
        let event = seed(&manager, "alice", "Planning", at(10, 0), at(11, 0)).await;
        let patch = EventPatch {
            title: Some(String::new()),
            ..Default::default()
        };

        let err = manager.update("alice", &event.id, &patch).await.unwrap_err();
        assert_eq!(err, AgendaError::EmptyTitle);
        assert_eq!(store(&manager).calls("update_event"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_missing_event_is_not_found() {
        let manager = manager();
        let patch = EventPatch {
            title: Some("Ghost".into()),
            ..Default::default()
        };

        let err = manager.update("alice", "missing", &patch).await.unwrap_err();
        assert!(matches!(err, AgendaError::NotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_propagates_and_skips_write() {
        let manager = manager();
        store(&manager).fail_next(3);

        let err = manager
            .create("alice", &EventDraft::new("Planning", at(10, 0), at(11, 0)))
            .await
            .unwrap_err();

        assert!(matches!(err, AgendaError::Store(_)));
        assert_eq!(store(&manager).calls("list_owned_events"), 3);
        assert_eq!(store(&manager).calls("insert_event"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_survives_transient_failures() {
        let manager = manager();
        store(&manager).fail_next(2);

        let event = manager
            .create("alice", &EventDraft::new("Planning", at(10, 0), at(11, 0)))
            .await
            .unwrap();
        assert_eq!(store(&manager).events(), vec![event]);
    }

    #[tokio::test]
    async fn test_fetch_merges_owned_and_invited() {
        let manager = manager();
        let own = seed(&manager, "alice", "Mine", at(9, 0), at(10, 0)).await;
        let theirs = seed(&manager, "bob", "Theirs", at(11, 0), at(12, 0)).await;
        seed(&manager, "bob", "Private", at(13, 0), at(14, 0)).await;

        manager.invite(&theirs.id, "alice").await.unwrap();
        // Invited to her own event: still listed once.
        manager.invite(&own.id, "alice").await.unwrap();

        let events = aggregate::sort_by_start(&manager.fetch("alice", &day()).await.unwrap());
        assert_eq!(events, vec![own, theirs]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_fails_whole_when_invited_read_fails() {
        let manager = manager();
        let theirs = seed(&manager, "bob", "Offsite", at(11, 0), at(12, 0)).await;
        seed(&manager, "alice", "Mine", at(9, 0), at(10, 0)).await;
        manager.invite(&theirs.id, "alice").await.unwrap();
        store(&manager).fail_next_on("list_invited_events", 3);

        let err = manager.fetch("alice", &day()).await.unwrap_err();
        assert!(matches!(err, AgendaError::Store(_)));
        assert_eq!(store(&manager).calls("list_invited_events"), 3);
        assert_eq!(store(&manager).calls("list_owned_events"), 1);
    }

    #[tokio::test]
    async fn test_declining_hides_invited_event() {
        let manager = manager();
        let theirs = seed(&manager, "bob", "Offsite", at(11, 0), at(12, 0)).await;
        let invitation = manager.invite(&theirs.id, "alice").await.unwrap();
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(manager.fetch("alice", &day()).await.unwrap().len(), 1);

        let answered = manager
            .respond(&invitation.id, InvitationStatus::Declined)
            .await
            .unwrap();
        assert_eq!(answered.status, InvitationStatus::Declined);
        assert!(manager.fetch("alice", &day()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_event() {
        let manager = manager();
        let event = seed(&manager, "alice", "Planning", at(10, 0), at(11, 0)).await;

        manager.delete(&event.id).await.unwrap();
        assert!(manager.fetch("alice", &day()).await.unwrap().is_empty());
    }
}
