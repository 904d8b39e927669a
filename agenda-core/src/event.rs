//! Event and invitation types as stored in the remote event store.
//!
//! Timestamps are UTC on the wire. `created_at` / `updated_at` are
//! assigned by the store and are absent on values built locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A titled, owned, time-bounded calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Closed-interval intersection: touching at a single instant counts.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time <= end && self.end_time >= start
    }

    /// Returns a copy with every field present in `patch` replaced.
    pub fn patched(&self, patch: &EventPatch) -> Event {
        let mut event = self.clone();
        if let Some(title) = &patch.title {
            event.title = title.clone();
        }
        if let Some(description) = &patch.description {
            event.description = Some(description.clone());
        }
        if let Some(start) = patch.start_time {
            event.start_time = start;
        }
        if let Some(end) = patch.end_time {
            event.end_time = end;
        }
        event
    }
}

/// Fields supplied by the owner when creating an event.
/// The store assigns `id`, `user_id` and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        EventDraft {
            title: title.into(),
            description: None,
            start_time,
            end_time,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update. Only `Some` fields are sent to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl EventPatch {
    /// True if the patch moves either bound of the event.
    pub fn touches_times(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && !self.touches_times()
    }
}

/// Response state of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    /// Declined invitations do not grant visibility.
    pub fn grants_visibility(self) -> bool {
        self != InvitationStatus::Declined
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" | "accept" => Ok(InvitationStatus::Accepted),
            "declined" | "decline" => Ok(InvitationStatus::Declined),
            other => Err(format!(
                "Invalid invitation status '{}'. Expected pending, accepted or declined",
                other
            )),
        }
    }
}

/// A link granting a non-owner read visibility into an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInvitation {
    pub id: String,
    pub event_id: String,
    pub invitee_id: String,
    pub status: InvitationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
