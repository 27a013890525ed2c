//! Blocking wrapper around the `async-openai` client.
//!
//! The rest of the crate is synchronous, so each client owns a
//! current-thread tokio runtime and drives requests to completion with
//! `block_on`.

use crate::error::{ChatError, Error, Result};
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI-compatible client with its own blocking runtime.
///
/// Cloning shares both the HTTP client and the runtime.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    runtime: Arc<Runtime>,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient").finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a client for `api_base` (or the public endpoint) using `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no key is given and [`ChatError::Runtime`]
    /// if the runtime cannot start.
    pub fn new(api_key: Option<&str>, api_base: Option<&str>) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::config(format!(
                    "OpenAI API key not set (pass --api-key or set {API_KEY_ENV})"
                ))
            })?;

        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base {
            debug!(api_base = base, "using custom API base");
            config = config.with_api_base(base);
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ChatError::Runtime(e.to_string()))?;

        Ok(Self {
            client: Client::with_config(config),
            runtime: Arc::new(runtime),
        })
    }

    /// Returns the underlying async client.
    pub const fn inner(&self) -> &Client<OpenAIConfig> {
        &self.client
    }

    /// Runs `future` to completion on the client's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let result = OpenAiClient::new(None, None);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_blank_key_is_config_error() {
        let result = OpenAiClient::new(Some("   "), None);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_client_construction_is_offline() {
        let client = OpenAiClient::new(Some("sk-test"), Some("http://localhost:9/v1")).unwrap();
        assert_eq!(client.block_on(async { 2 + 2 }), 4);
    }
}
