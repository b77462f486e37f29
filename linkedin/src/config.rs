//! Client configuration: credentials, endpoints and the defaults the facade falls back on.

use crate::error::{Error, Result};
use crate::linkedin_api::ugc_posts::ImageThumbnail;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const AUTHORIZE_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
const TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const API_BASE_URL: &str = "https://api.linkedin.com";
const DEFAULT_CULTURE: &str = "en-US";

/// Configuration for talking to the LinkedIn API.
///
/// Credentials are constructor parameters; everything else has a default and can be
/// overridden by chaining:
///
/// ```rust,ignore
/// let config = LinkedInConfig::new("client-id", "client-secret")
///     .with_fallback_locales(vec!["de-DE".into()])
///     .with_request_timeout(Duration::from_secs(10));
/// ```
///
/// The same fields can be read from JSON; missing optional fields take their defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkedInConfig {
    /// OAuth client identifier (LinkedIn calls this the API key).
    pub(crate) api_key: String,
    pub(crate) api_secret: String,
    #[serde(default = "default_authorize_url")]
    pub(crate) authorize_url: Url,
    #[serde(default = "default_token_url")]
    pub(crate) token_url: Url,
    #[serde(default = "default_api_base_url")]
    pub(crate) api_base_url: Url,
    /// Culture used when the caller does not supply one.
    #[serde(default = "default_culture")]
    pub(crate) default_culture: String,
    /// Locales appended after the caller's culture in `Accept-Language`.
    #[serde(default = "default_fallback_locales")]
    pub(crate) fallback_locales: Vec<String>,
    /// Thumbnail attached to video posts when the caller does not supply one.
    #[serde(default = "default_video_thumbnail")]
    pub(crate) default_video_thumbnail: ImageThumbnail,
    #[serde(default = "default_request_timeout", with = "timeout_secs")]
    pub(crate) request_timeout: Duration,
    /// Largest source media, in bytes, that is downloaded for an upload.
    #[serde(default = "default_max_media_bytes")]
    pub(crate) max_media_bytes: u64,
}

fn default_authorize_url() -> Url {
    Url::parse(AUTHORIZE_URL).expect("valid default URL")
}

fn default_token_url() -> Url {
    Url::parse(TOKEN_URL).expect("valid default URL")
}

fn default_api_base_url() -> Url {
    Url::parse(API_BASE_URL).expect("valid default URL")
}

fn default_culture() -> String {
    DEFAULT_CULTURE.to_string()
}

fn default_fallback_locales() -> Vec<String> {
    vec!["fr-FR".to_string()]
}

fn default_video_thumbnail() -> ImageThumbnail {
    ImageThumbnail {
        url: "https://www.google.com/images/branding/googlelogo/2x/googlelogo_color_92x30dp.png"
            .to_string(),
        height: 500,
        width: 300,
    }
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_media_bytes() -> u64 {
    200 * 1024 * 1024
}

mod timeout_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

impl LinkedInConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            default_culture: default_culture(),
            fallback_locales: default_fallback_locales(),
            default_video_thumbnail: default_video_thumbnail(),
            request_timeout: default_request_timeout(),
            max_media_bytes: default_max_media_bytes(),
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// `LINKEDIN_API_KEY` and `LINKEDIN_API_SECRET` are required.
    /// `LINKEDIN_FALLBACK_LOCALES` is a comma-separated list, `LINKEDIN_TIMEOUT_SECS`
    /// a whole number of seconds and `LINKEDIN_MAX_MEDIA_BYTES` a byte count.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
        };
        let api_key = var("LINKEDIN_API_KEY")
            .ok_or_else(|| Error::Configuration("LINKEDIN_API_KEY is not set".into()))?;
        let api_secret = var("LINKEDIN_API_SECRET")
            .ok_or_else(|| Error::Configuration("LINKEDIN_API_SECRET is not set".into()))?;

        let mut config = Self::new(api_key, api_secret);
        if let Some(locales) = var("LINKEDIN_FALLBACK_LOCALES") {
            config.fallback_locales = locales
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(secs) = var("LINKEDIN_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|e| {
                Error::Configuration(format!("LINKEDIN_TIMEOUT_SECS is not a number: {e}"))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = var("LINKEDIN_MAX_MEDIA_BYTES") {
            config.max_media_bytes = bytes.parse::<u64>().map_err(|e| {
                Error::Configuration(format!("LINKEDIN_MAX_MEDIA_BYTES is not a number: {e}"))
            })?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_authorize_url(mut self, url: Url) -> Self {
        self.authorize_url = url;
        self
    }

    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Override the REST API root (`https://api.linkedin.com` by default).
    #[must_use]
    pub fn with_api_base_url(mut self, url: Url) -> Self {
        self.api_base_url = url;
        self
    }

    #[must_use]
    pub fn with_default_culture(mut self, culture: impl Into<String>) -> Self {
        self.default_culture = culture.into();
        self
    }

    #[must_use]
    pub fn with_fallback_locales(mut self, locales: Vec<String>) -> Self {
        self.fallback_locales = locales;
        self
    }

    #[must_use]
    pub fn with_default_video_thumbnail(mut self, thumbnail: ImageThumbnail) -> Self {
        self.default_video_thumbnail = thumbnail;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_media_bytes(mut self, bytes: u64) -> Self {
        self.max_media_bytes = bytes;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Whether a client identifier is present, i.e. whether an authorization URL can be issued.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn max_media_bytes(&self) -> u64 {
        self.max_media_bytes
    }

    pub fn default_video_thumbnail(&self) -> &ImageThumbnail {
        &self.default_video_thumbnail
    }

    /// Builds the `Accept-Language` list: the requested culture (or the default one),
    /// followed by the fallback locales that are not already present.
    pub fn accept_languages(&self, culture: Option<&str>) -> Vec<String> {
        let primary = culture
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.default_culture);
        let mut languages = vec![primary.to_string()];
        for locale in &self.fallback_locales {
            if !languages.iter().any(|l| l.eq_ignore_ascii_case(locale)) {
                languages.push(locale.clone());
            }
        }
        languages
    }
}
