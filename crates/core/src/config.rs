//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store client.
//! Binaries read the environment and hand the raw values to [`config_from_env_values`]; nothing
//! in this crate reads process-wide environment variables during a submission.

use crate::constants::{
    DEFAULT_STORE_TIMEOUT_SECS, REST_API_PATH, STORE_TIMEOUT_ENV, SUPABASE_ANON_KEY_ENV,
    SUPABASE_URL_ENV,
};
use crate::{IntakeError, IntakeResult, NonEmptyText};
use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// Connection settings for the hosted record store.
#[derive(Clone)]
pub struct IntakeConfig {
    supabase_url: Url,
    anon_key: NonEmptyText,
    store_timeout: Duration,
}

impl IntakeConfig {
    /// Create a new `IntakeConfig`.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Configuration` if the URL is not an absolute `http`/`https` URL or
    /// the timeout is zero.
    pub fn new(
        supabase_url: &str,
        anon_key: NonEmptyText,
        store_timeout: Duration,
    ) -> IntakeResult<Self> {
        let mut supabase_url = Url::parse(supabase_url.trim()).map_err(|e| {
            IntakeError::Configuration(format!("{SUPABASE_URL_ENV} is not a valid URL: {e}"))
        })?;

        if !matches!(supabase_url.scheme(), "http" | "https") {
            return Err(IntakeError::Configuration(format!(
                "{SUPABASE_URL_ENV} must use http or https"
            )));
        }

        // Url::join replaces the last segment unless the base ends with '/'.
        if !supabase_url.path().ends_with('/') {
            let path = format!("{}/", supabase_url.path());
            supabase_url.set_path(&path);
        }

        if store_timeout.is_zero() {
            return Err(IntakeError::Configuration(format!(
                "{STORE_TIMEOUT_ENV} must be greater than zero"
            )));
        }

        Ok(Self {
            supabase_url,
            anon_key,
            store_timeout,
        })
    }

    pub fn supabase_url(&self) -> &Url {
        &self.supabase_url
    }

    /// Base URL of the PostgREST API (`<project>/rest/v1/`).
    pub fn rest_url(&self) -> IntakeResult<Url> {
        self.supabase_url
            .join(REST_API_PATH)
            .map_err(|e| IntakeError::Configuration(format!("invalid REST API URL: {e}")))
    }

    pub fn anon_key(&self) -> &NonEmptyText {
        &self.anon_key
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }
}

impl fmt::Debug for IntakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntakeConfig")
            .field("supabase_url", &self.supabase_url.as_str())
            .field("anon_key", &"<redacted>")
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

/// Build an [`IntakeConfig`] from optional raw environment values.
///
/// Empty or whitespace-only values count as missing.
///
/// # Errors
///
/// Returns `IntakeError::Configuration` if the URL or key is missing, or any value fails to
/// parse.
pub fn config_from_env_values(
    supabase_url: Option<String>,
    anon_key: Option<String>,
    store_timeout_secs: Option<String>,
) -> IntakeResult<IntakeConfig> {
    fn present(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    let supabase_url = present(supabase_url)
        .ok_or_else(|| IntakeError::Configuration(format!("{SUPABASE_URL_ENV} is not set")))?;
    let anon_key = present(anon_key)
        .and_then(|k| NonEmptyText::new(k).ok())
        .ok_or_else(|| IntakeError::Configuration(format!("{SUPABASE_ANON_KEY_ENV} is not set")))?;
    let timeout_secs = present(store_timeout_secs)
        .map(|v| {
            v.parse::<u64>().map_err(|_| {
                IntakeError::Configuration(format!(
                    "{STORE_TIMEOUT_ENV} must be a whole number of seconds, got {v:?}"
                ))
            })
        })
        .transpose()?
        .unwrap_or(DEFAULT_STORE_TIMEOUT_SECS);

    IntakeConfig::new(
        &supabase_url,
        anon_key,
        Duration::from_secs(timeout_secs),
    )
}
