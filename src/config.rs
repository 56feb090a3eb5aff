//! Configuration loading.
//!
//! Supabase connection values come only from the environment
//! (`PUBLIC_SUPABASE_URL`, `PUBLIC_SUPABASE_ANON_KEY`) and are required.
//! Everything else is read from an optional TOML file (`config/default.toml`,
//! or the path in `BUGTRACK_CONFIG`) with a `BUGTRACK_LOG_LEVEL` override.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

pub const URL_VAR: &str = "PUBLIC_SUPABASE_URL";
pub const ANON_KEY_VAR: &str = "PUBLIC_SUPABASE_ANON_KEY";
pub const CONFIG_PATH_VAR: &str = "BUGTRACK_CONFIG";
pub const LOG_LEVEL_VAR: &str = "BUGTRACK_LOG_LEVEL";

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Connection values for the hosted backend.
///
/// The anon key is public (row-level security does the gating server-side),
/// but it is still kept out of `Debug` output and logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self { url: url.into(), anon_key: anon_key.into() }
    }

    /// Read both values from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read both values through `lookup`. Absent, empty and whitespace-only
    /// values all count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let url = read(URL_VAR);
        let anon_key = read(ANON_KEY_VAR);

        match (url, anon_key) {
            (Some(url), Some(anon_key)) => Ok(Self { url, anon_key }),
            (url, anon_key) => {
                let missing: Vec<&str> = [
                    url.is_none().then_some(URL_VAR),
                    anon_key.is_none().then_some(ANON_KEY_VAR),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(missing_env_error(&missing))
            }
        }
    }
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .finish()
    }
}

fn missing_env_error(missing: &[&str]) -> AppError {
    AppError::Config(format!(
        "missing Supabase environment variables ({}). Please create a .env file with:\n\
         {URL_VAR}=your_supabase_project_url\n\
         {ANON_KEY_VAR}=your_supabase_anon_key",
        missing.join(", ")
    ))
}

/// HTTP client tuning, from `[client]` in the TOML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Postgres schema sent as `Accept-Profile` / `Content-Profile`.
    pub schema: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub client: ClientOptions,
    pub supabase: SupabaseConfig,
}

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    app: RawApp,
    #[serde(default)]
    client: RawClient,
}

#[derive(Deserialize)]
struct RawApp {
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawApp {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawClient {
    #[serde(default = "default_schema")]
    schema: String,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawClient {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_schema() -> String { "public".to_string() }
fn default_timeout_seconds() -> u64 { 30 }

/// Load config from the process environment and the TOML file it points at.
pub fn load() -> Result<Config, AppError> {
    let explicit = env::var(CONFIG_PATH_VAR).ok().filter(|p| !p.trim().is_empty());
    let path = explicit
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    load_from(&path, explicit.is_some(), |key| env::var(key).ok())
}

/// Internal loader. `required` makes a missing file an error; `lookup`
/// stands in for the environment so tests never touch process env.
pub fn load_from<F>(path: &Path, required: bool, lookup: F) -> Result<Config, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let supabase = SupabaseConfig::from_lookup(&lookup)?;

    let parsed = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<RawConfig>(&raw)
            .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
        Err(e) => {
            return Err(AppError::Config(format!("cannot read {}: {e}", path.display())));
        }
    };

    if parsed.client.timeout_seconds == 0 {
        return Err(AppError::Config("[client].timeout_seconds must be greater than 0".into()));
    }
    if parsed.client.schema.trim().is_empty() {
        return Err(AppError::Config("[client].schema must not be empty".into()));
    }

    let log_level = lookup(LOG_LEVEL_VAR)
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(parsed.app.log_level);
    crate::logger::parse_level(&log_level)
        .map_err(|_| AppError::Config(format!("unrecognised log level '{log_level}'")))?;

    Ok(Config {
        log_level,
        client: ClientOptions {
            schema: parsed.client.schema,
            timeout_seconds: parsed.client.timeout_seconds,
        },
        supabase,
    })
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
