//! HTTP client for the docket task server.

use std::time::Duration;

use docket_core::{Task, TaskDraft, TaskId, TaskPatch, UserProfile};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

pub mod error;

pub use error::HttpStoreError;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-access-token";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Account details submitted on registration.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Plain-text password, sent once over the wire.
    pub password: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Serialize)]
struct ReorderRequest<'a> {
    order: &'a [TaskId],
}

/// Extract a readable message from a JSON error body.
///
/// Tries `error`, then `message`, then falls back to the raw body.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(text) = json.get(key).and_then(serde_json::Value::as_str) {
                return text.to_owned();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Task store backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpStore {
    /// Build a client for `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL does not parse or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpStoreError> {
        let base = parse_base(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            token: None,
        })
    }

    /// Attach a session token to every protected request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace or drop the session token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Server root all endpoints are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::InvalidCredentials`] on a 401, or a transport/API error.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, HttpStoreError> {
        let request = self
            .request(Method::POST, "api/login")?
            .json(&Credentials { username, password });
        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HttpStoreError::InvalidCredentials(error_message(&body, status)));
        }
        let reply: TokenResponse = decode(check(response).await?, "api/login").await?;
        debug!(username, "login accepted");
        Ok(reply.token)
    }

    /// Create an account.
    ///
    /// # Errors
    /// Returns an API error when the server refuses the account, e.g. a duplicate username.
    pub async fn register(&self, account: &NewAccount) -> Result<UserProfile, HttpStoreError> {
        let request = self.request(Method::POST, "api/register")?.json(account);
        decode(send(request).await?, "api/register").await
    }

    /// Profile of the logged-in user.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::Unauthorized`] when the token is rejected.
    pub async fn current_user(&self) -> Result<UserProfile, HttpStoreError> {
        let response = send(self.authorized(Method::GET, "api/user")?).await?;
        decode(response, "api/user").await
    }

    /// Every task of the logged-in user in stored order.
    ///
    /// # Errors
    /// Returns [`HttpStoreError::Unauthorized`] when the token is rejected.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, HttpStoreError> {
        let response = send(self.authorized(Method::GET, "tasks")?).await?;
        let tasks: Vec<Task> = decode(response, "tasks").await?;
        debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    /// Create a task and return it as stored.
    ///
    /// # Errors
    /// Returns an error when the server rejects the draft or the call fails.
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, HttpStoreError> {
        let request = self.authorized(Method::POST, "tasks")?.json(draft);
        decode(send(request).await?, "tasks").await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    /// Returns an error when the task is unknown or the call fails.
    pub async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, HttpStoreError> {
        let path = format!("tasks/{id}");
        let request = self.authorized(Method::PUT, &path)?.json(patch);
        decode(send(request).await?, &path).await
    }

    /// Delete a task.
    ///
    /// # Errors
    /// Returns an error when the task is unknown or the call fails.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), HttpStoreError> {
        let path = format!("tasks/{id}");
        send(self.authorized(Method::DELETE, &path)?).await?;
        Ok(())
    }

    /// Persist a new order for the given ids.
    ///
    /// # Errors
    /// Returns an error when the server rejects the order or the call fails.
    pub async fn reorder_tasks(&self, order: &[TaskId]) -> Result<(), HttpStoreError> {
        let request = self
            .authorized(Method::PUT, "tasks/reorder")?
            .json(&ReorderRequest { order });
        send(request).await?;
        debug!(count = order.len(), "reorder submitted");
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, HttpStoreError> {
        let url = self.base.join(path).map_err(|source| HttpStoreError::InvalidUrl {
            url: format!("{}{path}", self.base),
            source,
        })?;
        debug!(%method, %url, "request");
        Ok(self.client.request(method, url))
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, HttpStoreError> {
        let token = self.token.as_deref().ok_or(HttpStoreError::MissingToken)?;
        Ok(self.request(method, path)?.header(TOKEN_HEADER, token))
    }
}

async fn send(request: RequestBuilder) -> Result<Response, HttpStoreError> {
    check(request.send().await?).await
}

/// Map a non-success response to an error carrying the body message.
async fn check(response: Response) -> Result<Response, HttpStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, status);
    match status {
        StatusCode::UNAUTHORIZED => Err(HttpStoreError::Unauthorized(message)),
        _ => Err(HttpStoreError::Api {
            status: status.as_u16(),
            message,
        }),
    }
}

async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, HttpStoreError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| HttpStoreError::Decode {
        endpoint: endpoint.to_owned(),
        source,
    })
}

fn parse_base(raw: &str) -> Result<Url, HttpStoreError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|source| HttpStoreError::InvalidUrl {
        url: raw.to_owned(),
        source,
    })
}
