//! Persistence for the single bearer token of the current session.
//!
//! The store is single-slot and last-writer-wins: saving a token replaces whatever was there.

use crate::error::{Error, Result};
use crate::oauth::AccessToken;
use std::future::Future;
use std::path::PathBuf;
use tokio::sync::Mutex;

pub trait TokenStore: Send + Sync {
    fn save(&self, token: AccessToken) -> impl Future<Output = Result<()>> + Send;

    fn get(&self) -> impl Future<Output = Result<Option<AccessToken>>> + Send;

    fn clear(&self) -> impl Future<Output = Result<()>> + Send;

    /// Whether a token is stored that has not passed its provider-supplied expiry.
    fn has_token(&self) -> impl Future<Output = Result<bool>> + Send {
        async move {
            Ok(self
                .get()
                .await?
                .is_some_and(|token| !token.is_expired()))
        }
    }
}

/// Keeps the token in process memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<AccessToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    async fn save(&self, token: AccessToken) -> Result<()> {
        *self.slot.lock().await = Some(token);
        Ok(())
    }

    async fn get(&self) -> Result<Option<AccessToken>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        self.slot.lock().await.take();
        Ok(())
    }
}

/// Keeps the token as JSON in a file, e.g. the CLI's `tokens.json`.
#[derive(Debug, Clone)]
pub struct JsonFileTokenStore {
    path: PathBuf,
}

impl JsonFileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, action: &str, e: impl std::fmt::Display) -> Error {
        Error::Store(format!("{action} {}: {e}", self.path.display()))
    }
}

impl TokenStore for JsonFileTokenStore {
    async fn save(&self, token: AccessToken) -> Result<()> {
        let json = serde_json::to_string_pretty(&token)
            .map_err(|e| self.io_error("serialize token for", e))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| self.io_error("write", e))?;
        tracing::debug!(path = %self.path.display(), "saved access token");
        Ok(())
    }

    async fn get(&self) -> Result<Option<AccessToken>> {
        if !tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error("stat", e))?
        {
            return Ok(None);
        }
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error("read", e))?;
        if json.trim().is_empty() {
            return Ok(None);
        }
        let token = serde_json::from_str(&json).map_err(|e| self.io_error("parse", e))?;
        Ok(Some(token))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("remove", e)),
        }
    }
}
