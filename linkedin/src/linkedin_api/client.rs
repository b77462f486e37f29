//! Core LinkedIn API client: credentials, request construction and response handling.

use crate::config::LinkedInConfig;
use crate::error::{Error, Result};
use crate::oauth::AccessToken;
use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// The credential presented on every authenticated call.
///
/// Never holds an empty token.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAuthorization {
    access_token: String,
}

impl UserAuthorization {
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(Error::Authorization {
                error: "invalid_token".to_string(),
                description: Some("cannot authorize calls with an empty access token".to_string()),
            });
        }
        Ok(Self { access_token })
    }

    pub fn from_token(token: &AccessToken) -> Result<Self> {
        Self::new(token.secret())
    }

    pub(crate) fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for UserAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAuthorization")
            .field("access_token", &"[redacted]")
            .finish()
    }
}

/// Runs one network-bound step under the configured timeout.
///
/// Expiry and transport failures both surface as transport-kind errors.
pub(crate) async fn within<T>(
    operation: &'static str,
    after: Duration,
    step: impl Future<Output = Result<T, reqwest::Error>>,
) -> Result<T> {
    match tokio::time::timeout(after, step).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(Error::Http { operation, source }),
        Err(_) => Err(Error::Timeout { operation, after }),
    }
}

/// Builds the HTTP client used for API calls.
///
/// Redirects are not followed; signed upload URLs and API endpoints never need them.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        // SSRF no thank you.
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| Error::Configuration(format!("build HTTP client: {e}")))
}

const MAX_MEDIA_REDIRECTS: usize = 5;

/// Builds the client that downloads source media.
///
/// Media hosts and CDNs redirect routinely, so a few hops are followed, each of which must
/// stay on http or https.
pub(crate) fn media_client() -> Result<reqwest::Client> {
    let policy = reqwest::redirect::Policy::custom(|attempt| {
        let scheme = attempt.url().scheme().to_string();
        if !matches!(scheme.as_str(), "http" | "https") {
            attempt.error(format!("redirect to unsupported scheme {scheme}"))
        } else if attempt.previous().len() > MAX_MEDIA_REDIRECTS {
            attempt.error(format!("more than {MAX_MEDIA_REDIRECTS} redirects"))
        } else {
            attempt.follow()
        }
    });
    reqwest::ClientBuilder::new()
        .redirect(policy)
        .build()
        .map_err(|e| Error::Configuration(format!("build media HTTP client: {e}")))
}

/// Client for the LinkedIn v2 REST API.
///
/// The client itself holds no credentials: every call takes the [`UserAuthorization`] it
/// should be made on behalf of. Methods for each resource group live in the sibling modules
/// ([`profiles`](super::profiles), [`shares`](super::shares), [`ugc_posts`](super::ugc_posts),
/// [`targeting`](super::targeting), [`assets`](super::assets), [`videos`](super::videos),
/// [`analytics`](super::analytics)).
#[derive(Debug, Clone)]
pub struct LinkedInApi {
    config: Arc<LinkedInConfig>,
    client: reqwest::Client,
    media: reqwest::Client,
}

impl LinkedInApi {
    pub fn new(config: Arc<LinkedInConfig>) -> Result<Self> {
        Ok(Self::with_http_client(config, http_client()?).with_media_client(media_client()?))
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    ///
    /// The same client downloads source media unless [`Self::with_media_client`] replaces it.
    pub fn with_http_client(config: Arc<LinkedInConfig>, client: reqwest::Client) -> Self {
        Self {
            config,
            media: client.clone(),
            client,
        }
    }

    #[must_use]
    pub fn with_media_client(mut self, media: reqwest::Client) -> Self {
        self.media = media;
        self
    }

    pub fn config(&self) -> &LinkedInConfig {
        &self.config
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn media_http_client(&self) -> &reqwest::Client {
        &self.media
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.config.request_timeout()
    }

    /// Starts an authenticated request against a path below the API root.
    pub(crate) fn authenticated(
        &self,
        user: &UserAuthorization,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder> {
        let url = self
            .config
            .api_base_url()
            .join(path)
            .map_err(|e| Error::Configuration(format!("invalid API path {path}: {e}")))?;
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(user.access_token())
            .header("X-Restli-Protocol-Version", "2.0.0"))
    }

    /// Sends a request and turns non-success statuses into [`Error::ProviderApi`] carrying the
    /// raw response body.
    #[instrument(skip(self, request), level = tracing::Level::TRACE)]
    pub(crate) async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = within(operation, self.timeout(), request.send()).await?;

        let status = response.status();
        if !status.is_success() {
            let body = within(operation, self.timeout(), response.text())
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::ProviderApi {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    pub(crate) async fn read_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<T> {
        let body = within(operation, self.timeout(), response.text()).await?;
        serde_json::from_str(&body).map_err(|source| Error::Decode { operation, source })
    }

    /// Makes an authenticated request with optional query parameters and JSON body.
    ///
    /// Returns the raw [`reqwest::Response`] for method-specific parsing.
    pub(crate) async fn make_authenticated_request(
        &self,
        user: &UserAuthorization,
        operation: &'static str,
        method: Method,
        path: &str,
        query_params: Option<&[(&str, &str)]>,
        json_body: Option<&impl Serialize>,
    ) -> Result<reqwest::Response> {
        let mut request = self.authenticated(user, method, path)?;
        if let Some(params) = query_params {
            request = request.query(params);
        }
        if let Some(body) = json_body {
            request = request.json(body);
        }
        self.execute(operation, request).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        user: &UserAuthorization,
        operation: &'static str,
        path: &str,
        query_params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .make_authenticated_request(
                user,
                operation,
                Method::GET,
                path,
                Some(query_params),
                None::<&()>,
            )
            .await?;
        self.read_json(operation, response).await
    }
}
