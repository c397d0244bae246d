//! Reddit API client implementation
//!
//! Authenticates as a "script" app with the OAuth2 password grant. The bearer
//! token is cached and refreshed shortly before it expires, or as soon as the
//! API rejects it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use urlencoding::encode;

use crate::config::RedditCredentials;
use crate::domain::entities::{Comment, CommentId};
use crate::domain::ports::PlatformClient;
use crate::error::PlatformError;

const AUTH_BASE_URL: &str = "https://www.reddit.com";
const API_BASE_URL: &str = "https://oauth.reddit.com";

/// Largest page Reddit returns for a listing
pub const MAX_PAGE_SIZE: u32 = 100;

/// Refresh the token this long before Reddit says it expires
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Implementation of the Reddit API client
pub struct RedditClientImpl {
    http: Client,
    auth_base_url: String,
    api_base_url: String,
    credentials: RedditCredentials,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClientImpl {
    pub fn new(credentials: RedditCredentials) -> Result<Self, PlatformError> {
        let http = Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            auth_base_url: AUTH_BASE_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Point the client at different hosts (used against a mock server)
    #[cfg(test)]
    pub fn with_base_urls(mut self, auth_base_url: &str, api_base_url: &str) -> Self {
        self.auth_base_url = auth_base_url.trim_end_matches('/').to_string();
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Reddit "fullname" for a comment id
    fn fullname(id: &CommentId) -> String {
        if id.as_str().starts_with("t1_") {
            id.as_str().to_string()
        } else {
            format!("t1_{}", id)
        }
    }

    /// Return a valid bearer token, requesting a new one if needed
    async fn bearer_token(&self) -> Result<String, PlatformError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drop the cached token if it is still the one the API rejected
    async fn invalidate_token(&self, rejected: &str) {
        let mut cached = self.token.lock().await;
        if cached.as_ref().is_some_and(|t| t.value == rejected) {
            *cached = None;
        }
    }

    /// Send an authenticated request. A 401/403 invalidates the cached token
    /// and the request is retried once with a new one.
    async fn send_authorized<T, F>(&self, build: F) -> Result<T, PlatformError>
    where
        T: DeserializeOwned,
        F: Fn(&str) -> RequestBuilder + Send + Sync,
    {
        let token = self.bearer_token().await?;
        let response = build(&token).send().await?;

        match self.handle_response(response).await {
            Err(PlatformError::Unauthorized) => {
                tracing::warn!("Reddit rejected the access token, requesting a new one");
                self.invalidate_token(&token).await;

                let token = self.bearer_token().await?;
                let response = build(&token).send().await?;
                let result = self.handle_response(response).await;
                if matches!(result, Err(PlatformError::Unauthorized)) {
                    self.invalidate_token(&token).await;
                }
                result
            }
            other => other,
        }
    }

    async fn request_token(&self) -> Result<AccessToken, PlatformError> {
        tracing::debug!("Requesting Reddit access token");

        let response = self
            .http
            .post(format!("{}/api/v1/access_token", self.auth_base_url))
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await?;

        let body: TokenResponse = self.handle_response(response).await?;

        // Bad credentials come back as 200 with an `error` field
        match (body.access_token, body.error) {
            (Some(value), None) => Ok(AccessToken {
                value,
                expires_at: Instant::now() + Duration::from_secs(body.expires_in.unwrap_or(3600)),
            }),
            (_, Some(error)) => {
                tracing::debug!(error = %error, "Reddit rejected token request");
                Err(PlatformError::Unauthorized)
            }
            (None, None) => Err(PlatformError::Deserialization(
                "token response has no access_token".to_string(),
            )),
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, PlatformError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| PlatformError::Deserialization(e.to_string()))
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(PlatformError::Unauthorized)
        } else if status.as_u16() == 429 {
            Err(PlatformError::RateLimited)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn fetch_page(
        &self,
        limit: u32,
        after: Option<&str>,
    ) -> Result<ListingData, PlatformError> {
        let mut query = vec![
            ("sort", "new".to_string()),
            ("limit", limit.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        let url = self.api_url(&format!(
            "/user/{}/comments",
            encode(&self.credentials.username)
        ));

        let listing: Listing = self
            .send_authorized(|token| self.http.get(&url).bearer_auth(token).query(&query))
            .await?;
        Ok(listing.data)
    }
}

/// Response types from the Reddit API
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct MeResponse {
    name: String,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
    after: Option<String>,
}

#[derive(Deserialize)]
struct Thing {
    data: RedditCommentResponse,
}

#[derive(Deserialize)]
struct RedditCommentResponse {
    id: String,
    body: String,
    created_utc: f64,
    permalink: Option<String>,
}

impl TryFrom<RedditCommentResponse> for Comment {
    type Error = PlatformError;

    fn try_from(r: RedditCommentResponse) -> Result<Self, Self::Error> {
        let created_at: DateTime<Utc> = DateTime::from_timestamp(r.created_utc as i64, 0)
            .ok_or_else(|| {
                PlatformError::Deserialization(format!(
                    "comment {} has invalid created_utc {}",
                    r.id, r.created_utc
                ))
            })?;

        Ok(Comment {
            id: CommentId::new(r.id),
            body: r.body,
            created_at,
            permalink: r.permalink,
        })
    }
}

/// `api_type=json` responses report failures inside a 200
#[derive(Deserialize)]
struct JsonEnvelope {
    json: JsonErrors,
}

#[derive(Deserialize)]
struct JsonErrors {
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
}

impl JsonErrors {
    fn into_result(self) -> Result<(), PlatformError> {
        let Some(first) = self.errors.into_iter().next() else {
            return Ok(());
        };
        let code = first
            .first()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if code == "RATELIMIT" {
            return Err(PlatformError::RateLimited);
        }
        let message = first
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(": ");
        Err(PlatformError::Api {
            status: 200,
            message,
        })
    }
}

#[async_trait]
impl PlatformClient for RedditClientImpl {
    async fn authenticate(&self) -> Result<String, PlatformError> {
        let url = self.api_url("/api/v1/me");

        let me: MeResponse = self
            .send_authorized(|token| self.http.get(&url).bearer_auth(token))
            .await?;
        Ok(me.name)
    }

    async fn list_own_comments(&self, limit: u32) -> Result<Vec<Comment>, PlatformError> {
        let mut comments = Vec::new();
        let mut after: Option<String> = None;

        while (comments.len() as u32) < limit {
            let remaining = limit - comments.len() as u32;
            let page = self
                .fetch_page(remaining.min(MAX_PAGE_SIZE), after.as_deref())
                .await?;

            let fetched = page.children.len();
            for thing in page.children {
                comments.push(Comment::try_from(thing.data)?);
            }

            match page.after {
                Some(next) if fetched > 0 => after = Some(next),
                _ => break,
            }
        }

        comments.truncate(limit as usize);
        Ok(comments)
    }

    async fn delete(&self, id: &CommentId) -> Result<(), PlatformError> {
        let url = self.api_url("/api/del");
        let fullname = Self::fullname(id);

        // `/api/del` answers with an empty JSON object
        let _: serde_json::Value = self
            .send_authorized(|token| {
                self.http
                    .post(&url)
                    .bearer_auth(token)
                    .form(&[("id", fullname.as_str())])
            })
            .await?;
        Ok(())
    }

    async fn edit(&self, id: &CommentId, text: &str) -> Result<(), PlatformError> {
        let url = self.api_url("/api/editusertext");
        let fullname = Self::fullname(id);

        let envelope: JsonEnvelope = self
            .send_authorized(|token| {
                self.http.post(&url).bearer_auth(token).form(&[
                    ("api_type", "json"),
                    ("thing_id", fullname.as_str()),
                    ("text", text),
                ])
            })
            .await?;
        envelope.json.into_result()
    }
}
