use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::EventId,
    error::ApiError,
    protocol::{CreatedEvent, EventPayload, EventQuery, EventRecord, InviteGuestRequest},
};
use tracing::{debug, warn};
use url::Url;

pub mod auth;
pub mod calendar;
pub mod error;
pub mod fields;
pub mod wizard;

pub use auth::{Anonymous, SessionTokenStore, StaticToken, TokenProvider};
pub use error::ClientError;
pub use wizard::{DraftPatch, EventDraft, EventWizard, Field, SubmitOutcome, WizardMode};

pub type ClientResult<T> = std::result::Result<T, ClientError>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Event operations of the EventFlow backend.
#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn create_event(&self, payload: &EventPayload) -> ClientResult<EventId>;
    async fn update_event(&self, id: &EventId, payload: &EventPayload) -> ClientResult<EventId>;
    async fn get_event(&self, id: &EventId) -> ClientResult<EventRecord>;
    async fn list_events(&self, query: &EventQuery) -> ClientResult<Vec<EventRecord>>;
    async fn invite_guest(&self, id: &EventId, email: &str) -> ClientResult<()>;
}

/// HTTP client for the EventFlow REST API.
///
/// The bearer token is read from the injected [`TokenProvider`] on every
/// request, so signing in or out takes effect without rebuilding the client.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> ClientResult<Self> {
        Self::with_timeout(base_url, tokens, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        tokens: Arc<dyn TokenProvider>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        debug!(%method, %url, "api request");
        let builder = self.http.request(method, url);
        Ok(match self.tokens.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = check_status(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.request(method, path)?.json(body);
        self.send(builder).await
    }
}

// Base URLs act as directories: `https://host/api` must resolve `events`
// to `https://host/api/events`, not `https://host/events`.
fn normalize_base_url(raw: &str) -> ClientResult<Url> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Ok(Url::parse(&with_slash)?)
}

/// Turns non-2xx responses into [`ClientError::Api`], preferring the
/// `{ message }` body the API sends over the bare status text.
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .ok()
        .map(|err| err.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
        });
    warn!(status = status.as_u16(), "api error: {message}");
    Err(ClientError::api(status.as_u16(), message))
}

#[async_trait]
impl EventsApi for ApiClient {
    async fn create_event(&self, payload: &EventPayload) -> ClientResult<EventId> {
        let created: CreatedEvent = self.send_json(Method::POST, "events", payload).await?;
        Ok(created.id)
    }

    async fn update_event(&self, id: &EventId, payload: &EventPayload) -> ClientResult<EventId> {
        let updated: CreatedEvent = self
            .send_json(Method::PATCH, &format!("events/{id}"), payload)
            .await?;
        Ok(updated.id)
    }

    async fn get_event(&self, id: &EventId) -> ClientResult<EventRecord> {
        let builder = self.request(Method::GET, &format!("events/{id}"))?;
        self.send(builder).await
    }

    async fn list_events(&self, query: &EventQuery) -> ClientResult<Vec<EventRecord>> {
        let builder = self.request(Method::GET, "events")?.query(query);
        self.send(builder).await
    }

    async fn invite_guest(&self, id: &EventId, email: &str) -> ClientResult<()> {
        let builder = self
            .request(Method::POST, &format!("events/{id}/guests"))?
            .json(&InviteGuestRequest {
                email: email.to_string(),
            });
        check_status(builder.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
