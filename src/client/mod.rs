//! Supabase REST client.
//!
//! `SupabaseClient` is a lazy handle: constructing it builds a
//! `reqwest::Client` and nothing else, so no request leaves the process
//! until a table operation or [`SupabaseClient::ping`] is awaited. Clone it
//! freely; `reqwest::Client` is an `Arc` internally.
//!
//! A process-wide handle is available through [`shared`], built from the
//! loaded config on first use.

pub mod query;
mod table;

use std::{sync::OnceLock, time::Duration};

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::{self, ClientOptions, Config, SupabaseConfig};
use crate::error::AppError;
use crate::schema::Table;

pub use query::{BugFilter, Direction, Query};
pub use table::TableClient;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build request: {0}")]
    Build(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    rest_url: String,
    anon_key: String,
    schema: String,
}

impl SupabaseClient {
    /// Build a client handle. No network I/O and no validation of the values
    /// beyond what `reqwest` needs to build its connection pool.
    pub fn new(config: SupabaseConfig, options: ClientOptions) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Build(format!("failed to build HTTP client: {e}")))?;

        let rest_url = format!("{}/rest/v1", config.url.trim_end_matches('/'));
        debug!(%rest_url, schema = %options.schema, "supabase client ready");

        Ok(Self {
            http,
            rest_url,
            anon_key: config.anon_key,
            schema: options.schema,
        })
    }

    /// Base REST endpoint, `<project url>/rest/v1`.
    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Operations on table `T`.
    pub fn table<T: Table>(&self) -> TableClient<'_, T> {
        TableClient::new(self)
    }

    /// Reachability check against the REST root.
    ///
    /// Any response below 500 counts as reachable; 4xx usually means the key
    /// was rejected, which is still a live server.
    pub async fn ping(&self) -> Result<(), ClientError> {
        let response = self.execute(self.request(Method::GET, ""), "ping").await?;
        let status = response.status();
        if status.is_server_error() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: format!("HTTP {status}"),
            });
        }
        Ok(())
    }

    /// Request against `rest_url/path` with the key and schema headers set.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = if path.is_empty() {
            format!("{}/", self.rest_url)
        } else {
            format!("{}/{path}", self.rest_url)
        };
        let builder = self
            .http
            .request(method.clone(), url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(&self.anon_key)
            .header("Accept-Profile", self.schema.as_str());

        // PostgREST picks the schema of any non-read method from Content-Profile.
        if method == Method::GET || method == Method::HEAD {
            builder
        } else {
            builder.header("Content-Profile", self.schema.as_str())
        }
    }

    /// Send without status checking.
    pub(crate) async fn execute(&self, builder: RequestBuilder, op: &str) -> Result<Response, ClientError> {
        builder.send().await.map_err(|e| {
            if e.is_builder() {
                ClientError::Build(e.to_string())
            } else {
                error!(op, error = %e, "supabase request failed (transport)");
                ClientError::Transport(e.to_string())
            }
        })
    }

    /// Send and turn non-2xx responses into [`ClientError::Status`].
    pub(crate) async fn send(&self, builder: RequestBuilder, op: &str) -> Result<Response, ClientError> {
        let response = self.execute(builder, op).await?;
        check_status(response, op).await
    }
}

// ── Shared handle ─────────────────────────────────────────────────────────────

static SHARED: OnceLock<SupabaseClient> = OnceLock::new();

/// The process-wide client, built on first call from [`config::load`]:
/// `PUBLIC_SUPABASE_URL` / `PUBLIC_SUPABASE_ANON_KEY` plus the `[client]`
/// section of the TOML config.
///
/// A load failure is returned and leaves the slot empty, so a later call can
/// still succeed once the environment is fixed.
pub fn shared() -> Result<&'static SupabaseClient, AppError> {
    shared_with(config::load)
}

/// Like [`shared`], with the config source supplied by the caller. `load`
/// only runs while the slot is still empty.
pub fn shared_with<F>(load: F) -> Result<&'static SupabaseClient, AppError>
where
    F: FnOnce() -> Result<Config, AppError>,
{
    if let Some(client) = SHARED.get() {
        return Ok(client);
    }
    let config = load()?;
    let client = SupabaseClient::new(config.supabase, config.client)?;
    Ok(install(client))
}

/// Seed the process-wide client. The first installed handle wins; later
/// calls return it and drop their argument.
pub fn install(client: SupabaseClient) -> &'static SupabaseClient {
    SHARED.get_or_init(|| client)
}

// ── Error envelope ────────────────────────────────────────────────────────────

// PostgREST error body.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

async fn check_status(response: Response, op: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = status_message(status, &body);
    error!(op, %status, %message, "supabase request returned HTTP error");
    Err(ClientError::Status { status: status.as_u16(), message })
}

fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => {
            if env.details.is_some() || env.hint.is_some() {
                debug!(details = ?env.details, hint = ?env.hint, "postgrest error detail");
            }
            let code = env
                .code
                .map(|v| match v {
                    serde_json::Value::String(s) => format!(" [code={s}]"),
                    other => format!(" [code={other}]"),
                })
                .unwrap_or_default();
            format!("HTTP {status}{code}: {}", env.message)
        }
        Err(_) => format!("HTTP {status}: {body}"),
    }
}
