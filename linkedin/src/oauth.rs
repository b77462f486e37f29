//! OAuth 2.0 authorization-code flow against LinkedIn.
//!
//! [`AuthorizationClient`] knows how to build the authorization URL and how to exchange a code
//! for an [`AccessToken`]. [`AuthorizationFlow`] drives one authorization attempt through
//! `AwaitingRedirect → CallbackReceived → {Authorized | Denied}` and is the only place a
//! callback is turned into a stored token.

use crate::config::LinkedInConfig;
use crate::error::{Error, Result};
use crate::linkedin_api::client::{http_client, within};
use crate::token_store::TokenStore;
use bitflags::bitflags;
use jiff::{SignedDuration, Timestamp};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, Scope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;
use url::Url;

bitflags! {
    /// Capabilities requested from the member, combined with `|`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuthorizationScope: u32 {
        const READ_BASIC_PROFILE = 1;
        const READ_EMAIL_ADDRESS = 1 << 1;
        const READ_WRITE_COMPANY_PAGE = 1 << 2;
        const WRITE_SHARE = 1 << 3;
        const WRITE_COMPANY_SHARE = 1 << 4;
    }
}

const SCOPE_NAMES: [(AuthorizationScope, &str); 5] = [
    (AuthorizationScope::READ_BASIC_PROFILE, "r_liteprofile"),
    (AuthorizationScope::READ_EMAIL_ADDRESS, "r_emailaddress"),
    (AuthorizationScope::READ_WRITE_COMPANY_PAGE, "rw_organization_admin"),
    (AuthorizationScope::WRITE_SHARE, "w_member_social"),
    (AuthorizationScope::WRITE_COMPANY_SHARE, "w_organization_social"),
];

impl AuthorizationScope {
    /// Provider scope names, in a fixed order.
    pub fn scope_names(self) -> impl Iterator<Item = &'static str> {
        SCOPE_NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

/// Opaque correlation token sent with the authorization request and echoed on the callback.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationState(String);

impl AuthorizationState {
    pub fn new_random() -> Self {
        Self(CsrfToken::new_random().secret().clone())
    }

    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthorizationState").field(&"[redacted]").finish()
    }
}

/// A provider-issued bearer token, with its expiry when the provider reported one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<Timestamp>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    #[must_use]
    pub fn with_expires_at(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn secret(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Tokens without a known expiry never count as expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Timestamp::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Builds authorization URLs and redeems authorization codes.
#[derive(Debug, Clone)]
pub struct AuthorizationClient {
    config: Arc<LinkedInConfig>,
    http: reqwest::Client,
}

impl AuthorizationClient {
    pub fn new(config: Arc<LinkedInConfig>) -> Result<Self> {
        Ok(Self::with_http_client(config, http_client()?))
    }

    pub fn with_http_client(config: Arc<LinkedInConfig>, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &LinkedInConfig {
        &self.config
    }

    /// The URL the member is sent to in order to grant `scopes`.
    ///
    /// Pure: the same inputs always give the same URL.
    pub fn build_authorization_url(
        &self,
        scopes: AuthorizationScope,
        state: &AuthorizationState,
        redirect_uri: &str,
    ) -> Result<Url> {
        if !self.config.has_credentials() {
            return Err(Error::Configuration(
                "no LinkedIn API key configured; cannot issue an authorization URL".into(),
            ));
        }
        let redirect_url = RedirectUrl::new(redirect_uri.to_string()).map_err(|e| {
            Error::Configuration(format!("invalid redirect URI {redirect_uri}: {e}"))
        })?;

        let client = BasicClient::new(ClientId::new(self.config.api_key.clone()))
            .set_auth_uri(AuthUrl::from_url(self.config.authorize_url.clone()))
            .set_redirect_uri(redirect_url);
        let state = state.secret().to_string();
        let (url, _state) = client
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(scopes.scope_names().map(|s| Scope::new(s.to_string())))
            .url();
        Ok(url)
    }

    /// Redeems an authorization code.
    ///
    /// `redirect_uri` must be the one the authorization URL was built with. An OAuth `error`
    /// answer from the provider is reported as [`Error::Authorization`].
    #[instrument(skip(self, code))]
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken> {
        const OPERATION: &str = "exchange authorization code";
        if code.trim().is_empty() {
            return Err(Error::Authorization {
                error: "invalid_request".into(),
                description: Some("the callback carried no authorization code".into()),
            });
        }

        let request = self.http.post(self.config.token_url.clone()).form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.config.api_key.as_str()),
            ("client_secret", self.config.api_secret.as_str()),
        ]);
        let timeout = self.config.request_timeout();
        let response = within(OPERATION, timeout, request.send()).await?;
        let status = response.status();
        let body = within(OPERATION, timeout, response.text()).await?;

        if let Ok(oauth_error) = serde_json::from_str::<OAuthErrorResponse>(&body) {
            tracing::warn!(error = %oauth_error.error, "provider refused the code exchange");
            return Err(Error::Authorization {
                error: oauth_error.error,
                description: oauth_error.error_description,
            });
        }
        if !status.is_success() {
            return Err(Error::ProviderApi {
                operation: OPERATION,
                status: status.as_u16(),
                body,
            });
        }

        let issued: TokenResponse = serde_json::from_str(&body).map_err(|source| Error::Decode {
            operation: OPERATION,
            source,
        })?;
        let mut token = AccessToken::new(issued.access_token);
        if let Some(expires_at) = issued
            .expires_in
            .and_then(|secs| Timestamp::now().checked_add(SignedDuration::from_secs(secs)).ok())
        {
            token = token.with_expires_at(expires_at);
        }

        tracing::debug!(expires_at = ?token.expires_at(), "exchanged authorization code");
        Ok(token)
    }
}

/// Query parameters the provider appends to the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parses a raw query string such as `code=...&state=...`.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (k, v) in form_urlencoded::parse(query.as_bytes()) {
            match &*k {
                "code" => params.code = Some(v.into_owned()),
                "state" => params.state = Some(v.into_owned()),
                "error" => params.error = Some(v.into_owned()),
                "error_description" => params.error_description = Some(v.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// Why a flow ended in [`FlowPhase::Denied`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// The provider redirected back with an OAuth error, kept verbatim.
    Provider {
        error: String,
        description: Option<String>,
    },
    StateMismatch,
    /// The code could not be redeemed or the token could not be stored.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    AwaitingRedirect,
    CallbackReceived,
    Authorized,
    Denied(Denial),
}

/// One pending authorization attempt.
///
/// The value is serializable so a caller can keep it with the member's session between
/// issuing the authorization URL and receiving the callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationFlow {
    state: AuthorizationState,
    redirect_uri: String,
    authorization_url: Url,
    phase: FlowPhase,
}

impl AuthorizationFlow {
    /// Starts a flow with a freshly generated state.
    pub fn begin(
        client: &AuthorizationClient,
        scopes: AuthorizationScope,
        redirect_uri: &str,
    ) -> Result<Self> {
        Self::with_state(client, scopes, AuthorizationState::new_random(), redirect_uri)
    }

    pub fn with_state(
        client: &AuthorizationClient,
        scopes: AuthorizationScope,
        state: AuthorizationState,
        redirect_uri: &str,
    ) -> Result<Self> {
        let authorization_url = client.build_authorization_url(scopes, &state, redirect_uri)?;
        Ok(Self {
            state,
            redirect_uri: redirect_uri.to_string(),
            authorization_url,
            phase: FlowPhase::AwaitingRedirect,
        })
    }

    pub fn authorization_url(&self) -> &Url {
        &self.authorization_url
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn state(&self) -> &AuthorizationState {
        &self.state
    }

    pub fn phase(&self) -> &FlowPhase {
        &self.phase
    }

    /// Handles the provider's redirect.
    ///
    /// A non-empty `error` denies the flow without exchanging anything. Otherwise the echoed
    /// `state` must equal the issued one before the code is exchanged and the token saved
    /// to `store`. A flow only accepts one callback.
    #[instrument(skip_all, fields(has_code = params.code.is_some(), error = ?params.error))]
    pub async fn complete<S: TokenStore>(
        &mut self,
        client: &AuthorizationClient,
        store: &S,
        params: CallbackParams,
    ) -> Result<AccessToken> {
        if self.phase != FlowPhase::AwaitingRedirect {
            return Err(Error::Authorization {
                error: "invalid_request".into(),
                description: Some("this authorization flow already received its callback".into()),
            });
        }
        self.phase = FlowPhase::CallbackReceived;

        if let Some(error) = params.error.filter(|e| !e.is_empty()) {
            tracing::warn!(error = %error, "member or provider denied authorization");
            self.phase = FlowPhase::Denied(Denial::Provider {
                error: error.clone(),
                description: params.error_description.clone(),
            });
            return Err(Error::Authorization {
                error,
                description: params.error_description,
            });
        }

        if params.state.as_deref() != Some(self.state.secret()) {
            tracing::warn!("callback state does not match the issued state");
            self.phase = FlowPhase::Denied(Denial::StateMismatch);
            return Err(Error::StateMismatch);
        }

        let code = params.code.unwrap_or_default();
        let stored = async {
            let token = client
                .exchange_code_for_token(&code, &self.redirect_uri)
                .await?;
            store.save(token.clone()).await?;
            Ok::<_, Error>(token)
        }
        .await;

        match stored {
            Ok(token) => {
                self.phase = FlowPhase::Authorized;
                tracing::info!("authorization completed");
                Ok(token)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "authorization failed");
                self.phase = FlowPhase::Denied(Denial::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::linkedin_api::client::tests::test_config;
    use crate::token_store::MemoryTokenStore;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REDIRECT: &str = "http://localhost:8080/oauth2";

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    async fn token_endpoint(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth/v2/accessToken"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"access_token":"AQV-token","expires_in":5183999}"#),
            )
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> AuthorizationClient {
        AuthorizationClient::new(Arc::new(test_config(server))).unwrap()
    }

    #[test]
    fn scope_names_follow_flags() {
        let scopes = AuthorizationScope::WRITE_SHARE | AuthorizationScope::READ_EMAIL_ADDRESS;
        assert_eq!(
            scopes.scope_names().collect::<Vec<_>>(),
            vec!["r_emailaddress", "w_member_social"]
        );
        assert_eq!(AuthorizationScope::empty().scope_names().count(), 0);
    }

    #[tokio::test]
    async fn authorization_url_is_deterministic() {
        let server = MockServer::start().await;
        let client = client(&server);
        let state = AuthorizationState::new("abc");
        let scopes = AuthorizationScope::READ_BASIC_PROFILE | AuthorizationScope::WRITE_SHARE;

        let first = client
            .build_authorization_url(scopes, &state, REDIRECT)
            .unwrap();
        let second = client
            .build_authorization_url(scopes, &state, REDIRECT)
            .unwrap();
        assert_eq!(first, second);

        assert_eq!(first.path(), "/oauth/v2/authorization");
        let query = query(&first);
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["client_id"], "client-id");
        assert_eq!(query["state"], "abc");
        assert_eq!(query["redirect_uri"], REDIRECT);
        assert_eq!(query["scope"], "r_liteprofile w_member_social");
    }

    #[tokio::test]
    async fn missing_client_id_is_configuration_error() {
        let client = AuthorizationClient::new(Arc::new(LinkedInConfig::new("", "secret"))).unwrap();
        let err = client
            .build_authorization_url(
                AuthorizationScope::WRITE_SHARE,
                &AuthorizationState::new("abc"),
                REDIRECT,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn callback_query_parsing() {
        let params =
            CallbackParams::from_query("code=xyz&state=abc&error_description=user%20cancelled");
        assert_eq!(params.code.as_deref(), Some("xyz"));
        assert_eq!(params.state.as_deref(), Some("abc"));
        assert_eq!(params.error, None);
        assert_eq!(params.error_description.as_deref(), Some("user cancelled"));
    }

    #[tokio::test]
    async fn matching_state_exchanges_and_persists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v2/accessToken"))
            .and(body_string_contains("code=xyz"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"access_token":"AQV-token","expires_in":3600}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let store = MemoryTokenStore::new();
        let mut flow = AuthorizationFlow::with_state(
            &client,
            AuthorizationScope::WRITE_SHARE,
            AuthorizationState::new("abc"),
            REDIRECT,
        )
        .unwrap();

        let token = flow
            .complete(
                &client,
                &store,
                CallbackParams {
                    code: Some("xyz".into()),
                    state: Some("abc".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(token.secret(), "AQV-token");
        assert!(token.expires_at().is_some());
        assert_eq!(flow.phase(), &FlowPhase::Authorized);
        assert!(store.has_token().await.unwrap());
    }

    #[tokio::test]
    async fn provider_error_never_exchanges() {
        let server = MockServer::start().await;
        token_endpoint(&server, 0).await;

        let client = client(&server);
        let store = MemoryTokenStore::new();
        let mut flow = AuthorizationFlow::with_state(
            &client,
            AuthorizationScope::WRITE_SHARE,
            AuthorizationState::new("abc"),
            REDIRECT,
        )
        .unwrap();

        let err = flow
            .complete(
                &client,
                &store,
                CallbackParams {
                    code: Some("xyz".into()),
                    state: Some("abc".into()),
                    error: Some("access_denied".into()),
                    error_description: Some("The user cancelled".into()),
                },
            )
            .await
            .unwrap_err();

        match err {
            Error::Authorization { error, description } => {
                assert_eq!(error, "access_denied");
                assert_eq!(description.as_deref(), Some("The user cancelled"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            flow.phase(),
            &FlowPhase::Denied(Denial::Provider {
                error: "access_denied".into(),
                description: Some("The user cancelled".into()),
            })
        );
        assert!(!store.has_token().await.unwrap());
    }

    #[tokio::test]
    async fn mismatched_state_never_exchanges() {
        let server = MockServer::start().await;
        token_endpoint(&server, 0).await;

        let client = client(&server);
        let store = MemoryTokenStore::new();
        let mut flow = AuthorizationFlow::with_state(
            &client,
            AuthorizationScope::WRITE_SHARE,
            AuthorizationState::new("abc"),
            REDIRECT,
        )
        .unwrap();

        for state in [Some("abd"), None] {
            let mut flow = flow.clone();
            let err = flow
                .complete(
                    &client,
                    &store,
                    CallbackParams {
                        code: Some("xyz".into()),
                        state: state.map(String::from),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StateMismatch);
            assert_eq!(flow.phase(), &FlowPhase::Denied(Denial::StateMismatch));
        }

        // an empty error parameter is not a denial
        let err = flow
            .complete(
                &client,
                &store,
                CallbackParams {
                    code: Some("xyz".into()),
                    state: Some("other".into()),
                    error: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StateMismatch));
        assert!(!store.has_token().await.unwrap());
    }

    #[tokio::test]
    async fn provider_refusal_during_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v2/accessToken"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":"invalid_redirect_uri","error_description":"Unable to retrieve access token"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let store = MemoryTokenStore::new();
        let mut flow = AuthorizationFlow::with_state(
            &client,
            AuthorizationScope::WRITE_SHARE,
            AuthorizationState::new("abc"),
            REDIRECT,
        )
        .unwrap();
        let err = flow
            .complete(
                &client,
                &store,
                CallbackParams::from_query("code=xyz&state=abc"),
            )
            .await
            .unwrap_err();

        assert!(
            matches!(&err, Error::Authorization { error, .. } if error == "invalid_redirect_uri"),
            "{err:?}"
        );
        assert!(matches!(flow.phase(), FlowPhase::Denied(Denial::Failed { .. })));
        assert!(!store.has_token().await.unwrap());
    }

    #[tokio::test]
    async fn second_callback_is_rejected() {
        let server = MockServer::start().await;
        token_endpoint(&server, 1).await;

        let client = client(&server);
        let store = MemoryTokenStore::new();
        let mut flow = AuthorizationFlow::with_state(
            &client,
            AuthorizationScope::WRITE_SHARE,
            AuthorizationState::new("abc"),
            REDIRECT,
        )
        .unwrap();
        let callback = CallbackParams::from_query("code=xyz&state=abc");

        flow.complete(&client, &store, callback.clone()).await.unwrap();
        let err = flow.complete(&client, &store, callback).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(flow.phase(), &FlowPhase::Authorized);
    }

    #[test]
    fn pending_flow_survives_serialization() {
        let config = LinkedInConfig::new("client-id", "secret");
        let client = AuthorizationClient::new(Arc::new(config)).unwrap();
        let flow = AuthorizationFlow::begin(&client, AuthorizationScope::WRITE_SHARE, REDIRECT)
            .unwrap();

        let json = serde_json::to_string(&flow).unwrap();
        let restored: AuthorizationFlow = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), flow.state());
        assert_eq!(restored.authorization_url(), flow.authorization_url());
        assert_eq!(restored.phase(), &FlowPhase::AwaitingRedirect);
    }

    #[test]
    fn random_states_differ() {
        assert_ne!(AuthorizationState::new_random(), AuthorizationState::new_random());
    }
}
