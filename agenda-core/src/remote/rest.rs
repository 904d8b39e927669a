//! Hosted event store over its REST interface.
//!
//! Speaks the PostgREST dialect exposed at `<store_url>/rest/v1/<table>`:
//! filters are query parameters (`user_id=eq.<id>`), writes ask for the
//! affected rows back with `Prefer: return=representation`, and every
//! request carries the project `apikey` plus a bearer token.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::date_range::DateRange;
use crate::error::{AgendaError, AgendaResult};
use crate::event::{Event, EventDraft, EventInvitation, EventPatch, InvitationStatus};
use crate::remote::EventStore;

const REST_PREFIX: &str = "rest/v1/";
const EVENTS_TABLE: &str = "events";
const INVITATIONS_TABLE: &str = "event_invitations";

/// Client for the hosted store. Cheap to clone.
#[derive(Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    access_token: Option<String>,
}

#[derive(Serialize)]
struct NewEventRow<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    draft: &'a EventDraft,
}

#[derive(Serialize)]
struct NewInvitationRow<'a> {
    event_id: &'a str,
    invitee_id: &'a str,
    status: InvitationStatus,
}

#[derive(Serialize)]
struct InvitationStatusRow {
    status: InvitationStatus,
}

#[derive(Deserialize)]
struct InvitationRef {
    event_id: String,
}

/// Error body returned by the REST layer.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl RestStore {
    pub fn new(store_url: &str, api_key: impl Into<String>) -> AgendaResult<Self> {
        let mut base_url = Url::parse(store_url)
            .map_err(|e| AgendaError::Config(format!("Invalid store_url '{}': {}", store_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(RestStore {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
            access_token: None,
        })
    }

    /// Authenticate as a signed-in user instead of with the bare api key.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn table_url(&self, table: &str) -> AgendaResult<Url> {
        self.base_url
            .join(REST_PREFIX)
            .and_then(|url| url.join(table))
            .map_err(|e| AgendaError::Config(format!("Invalid table url for '{}': {}", table, e)))
    }

    fn request(&self, method: Method, table: &str) -> AgendaResult<RequestBuilder> {
        let token = self.access_token.as_deref().unwrap_or(&self.api_key);
        Ok(self
            .http
            .request(method, self.table_url(table)?)
            .header("apikey", &self.api_key)
            .bearer_auth(token))
    }

    fn returning(&self, method: Method, table: &str) -> AgendaResult<RequestBuilder> {
        Ok(self
            .request(method, table)?
            .header("Prefer", "return=representation"))
    }
}

#[async_trait]
impl EventStore for RestStore {
    async fn list_owned_events(&self, user_id: &str, range: &DateRange) -> AgendaResult<Vec<Event>> {
        let request = self
            .request(Method::GET, EVENTS_TABLE)?
            .query(&[("select", "*".to_string()), ("user_id", eq(user_id))])
            .query(&range_filters(range));
        read(request).await
    }

    async fn list_invited_events(
        &self,
        user_id: &str,
        range: &DateRange,
    ) -> AgendaResult<Vec<Event>> {
        let request = self.request(Method::GET, INVITATIONS_TABLE)?.query(&[
            ("select", "event_id".to_string()),
            ("invitee_id", eq(user_id)),
            ("status", format!("neq.{}", InvitationStatus::Declined)),
        ]);
        let invitations: Vec<InvitationRef> = read(request).await?;

        if invitations.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = invitations.iter().map(|inv| inv.event_id.as_str()).collect();
        let request = self
            .request(Method::GET, EVENTS_TABLE)?
            .query(&[("select", "*".to_string()), ("id", in_list(&ids))])
            .query(&range_filters(range));
        read(request).await
    }

    async fn get_event(&self, event_id: &str) -> AgendaResult<Event> {
        let request = self
            .request(Method::GET, EVENTS_TABLE)?
            .query(&[("select", "*".to_string()), ("id", eq(event_id))]);
        single(read(request).await?, "event", event_id)
    }

    async fn insert_event(&self, user_id: &str, draft: &EventDraft) -> AgendaResult<Event> {
        let request = self
            .returning(Method::POST, EVENTS_TABLE)?
            .json(&NewEventRow { user_id, draft });
        let rows: Vec<Event> = read(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AgendaError::Store("Insert returned no event".into()))
    }

    async fn update_event(&self, event_id: &str, patch: &EventPatch) -> AgendaResult<Event> {
        let request = self
            .returning(Method::PATCH, EVENTS_TABLE)?
            .query(&[("id", eq(event_id))])
            .json(patch);
        single(read(request).await?, "event", event_id)
    }

    async fn delete_event(&self, event_id: &str) -> AgendaResult<()> {
        let request = self
            .request(Method::DELETE, EVENTS_TABLE)?
            .query(&[("id", eq(event_id))]);
        check(request).await
    }

    async fn insert_invitation(
        &self,
        event_id: &str,
        invitee_id: &str,
    ) -> AgendaResult<EventInvitation> {
        let request = self
            .returning(Method::POST, INVITATIONS_TABLE)?
            .json(&NewInvitationRow {
                event_id,
                invitee_id,
                status: InvitationStatus::Pending,
            });
        let rows: Vec<EventInvitation> = read(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AgendaError::Store("Insert returned no invitation".into()))
    }

    async fn update_invitation_status(
        &self,
        invitation_id: &str,
        status: InvitationStatus,
    ) -> AgendaResult<EventInvitation> {
        let request = self
            .returning(Method::PATCH, INVITATIONS_TABLE)?
            .query(&[("id", eq(invitation_id))])
            .json(&InvitationStatusRow { status });
        single(read(request).await?, "invitation", invitation_id)
    }
}

async fn read<T: DeserializeOwned>(request: RequestBuilder) -> AgendaResult<T> {
    Ok(send(request).await?.json().await?)
}

async fn check(request: RequestBuilder) -> AgendaResult<()> {
    send(request).await.map(|_| ())
}

/// Send the request; a non-success status becomes an error built from the body.
async fn send(request: RequestBuilder) -> AgendaResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match response.text().await {
        Ok(body) => Err(error_for_status(status, &body)),
        Err(e) => Err(AgendaError::Store(format!(
            "HTTP {}: unreadable response body: {}",
            status.as_u16(),
            e
        ))),
    }
}

/// Rows from a filter on a primary key: exactly one, or `NotFound`.
fn single<T>(rows: Vec<T>, kind: &str, id: &str) -> AgendaResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AgendaError::NotFound(format!("{kind} {id}")))
}

fn error_for_status(status: StatusCode, body: &str) -> AgendaError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message,
            code: Some(code),
        }) => format!("{message} ({code})"),
        Ok(ErrorBody { message, code: None }) => message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string(),
        Err(_) => body.trim().to_string(),
    };

    if status == StatusCode::NOT_FOUND {
        AgendaError::NotFound(message)
    } else {
        AgendaError::Store(format!("HTTP {}: {}", status.as_u16(), message))
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// `in.("a","b")`, quoting each id so commas and parentheses stay literal.
fn in_list(ids: &[&str]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Closed-interval intersection: `start_time <= range.end AND end_time >= range.start`.
fn range_filters(range: &DateRange) -> [(&'static str, String); 2] {
    [
        ("start_time", format!("lte.{}", range.end_rfc3339())),
        ("end_time", format!("gte.{}", range.start_rfc3339())),
    ]
}
