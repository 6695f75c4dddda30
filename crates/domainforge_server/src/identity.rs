//! Supabase Auth REST client.

use async_trait::async_trait;
use domainforge_core::AuthUser;
use domainforge_error::{
    AuthError, AuthErrorKind, DomainforgeResult, HttpError, JsonError, NotConfiguredError,
    Upstream,
};
use domainforge_interface::IdentityProvider;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

/// Identity provider backed by Supabase Auth (`/auth/v1`).
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl From<SupabaseUser> for AuthUser {
    fn from(user: SupabaseUser) -> Self {
        let name = user
            .user_metadata
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            id: user.id,
            email: user.email.unwrap_or_default(),
            name,
        }
    }
}

/// Split a Supabase auth payload into `{user, session}`.
///
/// Token responses carry the user inside the session; sign-ups awaiting email
/// confirmation return a bare user and no session.
pub fn split_session(payload: Value) -> Value {
    if payload.get("access_token").is_some() {
        let user = payload.get("user").cloned().unwrap_or(Value::Null);
        json!({ "user": user, "session": payload })
    } else if payload.get("id").is_some() {
        json!({ "user": payload, "session": Value::Null })
    } else {
        json!({
            "user": payload.get("user").cloned().unwrap_or(Value::Null),
            "session": payload.get("session").cloned().unwrap_or(Value::Null),
        })
    }
}

fn error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| format!("HTTP {}", status))
}

impl SupabaseClient {
    /// Create a client from `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a not-configured error if either variable is missing.
    pub fn new() -> DomainforgeResult<Self> {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        match (read("SUPABASE_URL"), read("SUPABASE_ANON_KEY")) {
            (Some(url), Some(key)) => Ok(Self::with_credentials(url, key)),
            _ => Err(NotConfiguredError::new("Auth provider not configured"))?,
        }
    }

    /// Create a client for a project URL and anon key.
    pub fn with_credentials(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> DomainforgeResult<Response> {
        request
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| {
                HttpError::new(Upstream::Supabase, format!("Request failed: {}", e)).into()
            })
    }

    /// Read a JSON body, turning non-success statuses into rejections.
    async fn json(response: Response) -> DomainforgeResult<Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::new(Upstream::Supabase, format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            let message = error_message(&body, status.as_u16());
            warn!(status = status.as_u16(), %message, "Identity provider rejected request");
            Err(AuthError::new(AuthErrorKind::Rejected(message)))?
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| JsonError::new(Upstream::Supabase, "auth", e.to_string()).into())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    #[instrument(skip_all)]
    async fn verify_token(&self, token: &str) -> DomainforgeResult<AuthUser> {
        let response = self
            .send(self.client.get(self.url("user")).bearer_auth(token))
            .await?;
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "Token rejected");
            Err(AuthError::new(AuthErrorKind::InvalidToken))?
        }
        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| JsonError::new(Upstream::Supabase, "user", e.to_string()))?;
        Ok(user.into())
    }

    #[instrument(skip(self, password, name))]
    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> DomainforgeResult<Value> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        });
        let response = self
            .send(self.client.post(self.url("signup")).json(&body))
            .await?;
        Ok(split_session(Self::json(response).await?))
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> DomainforgeResult<Value> {
        let body = json!({ "email": email, "password": password });
        let response = self
            .send(
                self.client
                    .post(self.url("token"))
                    .query(&[("grant_type", "password")])
                    .json(&body),
            )
            .await?;
        Ok(split_session(Self::json(response).await?))
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> DomainforgeResult<Value> {
        let body = json!({ "refresh_token": refresh_token });
        let response = self
            .send(
                self.client
                    .post(self.url("token"))
                    .query(&[("grant_type", "refresh_token")])
                    .json(&body),
            )
            .await?;
        Ok(split_session(Self::json(response).await?))
    }

    #[instrument(skip_all)]
    async fn logout(&self, token: &str) -> DomainforgeResult<()> {
        let response = self
            .send(self.client.post(self.url("logout")).bearer_auth(token))
            .await?;
        Self::json(response).await?;
        Ok(())
    }
}
