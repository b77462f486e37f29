//! Error-isolated orchestration over the authorization flow and the resource clients.
//!
//! Each facade invocation gets its own [`CallContext`]. Every remote call made through the
//! context is attempted exactly once; a failure is logged, appended to the context's
//! [`AggregatedError`] and turned into `None`, so later independent calls still run. Remote
//! effects that already happened are never rolled back.

use crate::config::LinkedInConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::linkedin_api::analytics::{
    Aggregation, ShareStatisticsElement, VideoAnalyticsElement, VideoMetric,
};
use crate::linkedin_api::client::{LinkedInApi, UserAuthorization};
use crate::linkedin_api::profiles::{DegreeSize, Person, PersonList};
use crate::linkedin_api::shares::Share;
use crate::linkedin_api::targeting::{AudienceCount, TargetingEntity, TargetingFacet};
use crate::linkedin_api::types::{Collection, Locale, Paging};
use crate::linkedin_api::ugc_posts::UgcPostItem;
use crate::oauth::{
    AccessToken, AuthorizationClient, AuthorizationFlow, AuthorizationScope, CallbackParams,
};
use crate::post::PostPayload;
use crate::token_store::TokenStore;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// One failed call, as recorded by a [`CallContext`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub operation: &'static str,
    pub kind: ErrorKind,
    pub message: String,
    /// Raw provider response body, for provider and upload failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Ordered, append-only list of the failures of one invocation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct AggregatedError {
    records: Vec<ErrorRecord>,
}

impl AggregatedError {
    fn push(&mut self, record: ErrorRecord) {
        self.records.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.records.iter().map(|r| r.kind).collect()
    }
}

impl<'a> IntoIterator for &'a AggregatedError {
    type Item = &'a ErrorRecord;
    type IntoIter = std::slice::Iter<'a, ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Wall-clock duration of one call. Advisory only.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CallTiming {
    pub operation: &'static str,
    pub elapsed: Duration,
    pub succeeded: bool,
}

/// The outcome of a call that has run but not been recorded yet.
#[derive(Debug)]
pub struct Timed<T> {
    operation: &'static str,
    elapsed: Duration,
    outcome: Result<T>,
}

/// Runs `call` and measures it, without touching any [`CallContext`].
///
/// Used to issue independent calls concurrently and record them afterwards.
pub async fn timed<T>(operation: &'static str, call: impl Future<Output = Result<T>>) -> Timed<T> {
    let started = Instant::now();
    let outcome = call.await;
    Timed {
        operation,
        elapsed: started.elapsed(),
        outcome,
    }
}

/// Per-invocation state: the errors and timings of every call made so far.
#[derive(Debug, Default)]
pub struct CallContext {
    errors: AggregatedError,
    timings: Vec<CallTiming>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `call` once and records its outcome.
    pub async fn attempt<T>(
        &mut self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Option<T> {
        let timed = timed(operation, call).await;
        self.record(timed)
    }

    /// Records a call that ran elsewhere, e.g. as part of a `join!`.
    pub fn record<T>(&mut self, timed: Timed<T>) -> Option<T> {
        let Timed {
            operation,
            elapsed,
            outcome,
        } = timed;
        self.timings.push(CallTiming {
            operation,
            elapsed,
            succeeded: outcome.is_ok(),
        });

        match outcome {
            Ok(value) => {
                tracing::debug!(operation, ?elapsed, "call succeeded");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(operation, ?elapsed, error = %e, kind = ?e.kind(), "call failed");
                self.errors.push(ErrorRecord {
                    operation,
                    kind: e.kind(),
                    message: e.to_string(),
                    raw_response: e.raw_response().map(String::from),
                });
                None
            }
        }
    }

    pub fn errors(&self) -> &AggregatedError {
        &self.errors
    }

    pub fn timings(&self) -> &[CallTiming] {
        &self.timings
    }

    pub fn finish<T>(self, value: T) -> Report<T> {
        Report {
            value,
            errors: self.errors,
            timings: self.timings,
        }
    }
}

/// What a facade invocation hands back: the successful subset plus the ordered error list.
#[derive(Debug, Serialize)]
pub struct Report<T> {
    pub value: T,
    pub errors: AggregatedError,
    pub timings: Vec<CallTiming>,
}

/// The landing view: where to send the member to sign in, and who is signed in.
#[derive(Debug, Default, Serialize)]
pub struct Dashboard {
    /// Present when an API key is configured.
    pub authorization: Option<AuthorizationFlow>,
    pub profile: Option<Person>,
}

#[derive(Debug, Default, Serialize)]
pub struct TargetingSnapshot {
    pub industries: Option<Collection<TargetingEntity>>,
    pub job_functions: Option<Collection<TargetingEntity>>,
    pub seniorities: Option<Collection<TargetingEntity>>,
    pub country_groups: Option<Collection<TargetingEntity>>,
    pub facets: Option<Collection<TargetingFacet>>,
}

/// Countries of a group, then the states of the first country and the regions of its first state.
#[derive(Debug, Default, Serialize)]
pub struct Geography {
    pub countries: Option<Collection<TargetingEntity>>,
    pub states: Option<Collection<TargetingEntity>>,
    pub regions: Option<Collection<TargetingEntity>>,
}

/// Entry point tying together configuration, the authorization flow, token storage and the
/// resource clients.
#[derive(Debug)]
pub struct Facade<S> {
    config: Arc<LinkedInConfig>,
    api: LinkedInApi,
    auth: AuthorizationClient,
    store: S,
}

impl<S: TokenStore> Facade<S> {
    pub fn new(config: LinkedInConfig, store: S) -> Result<Self> {
        let config = Arc::new(config);
        Ok(Self {
            api: LinkedInApi::new(config.clone())?,
            auth: AuthorizationClient::new(config.clone())?,
            config,
            store,
        })
    }

    pub fn config(&self) -> &LinkedInConfig {
        &self.config
    }

    pub fn api(&self) -> &LinkedInApi {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Starts an authorization attempt. The returned flow must be kept until the callback.
    pub fn start_authorization(
        &self,
        scopes: AuthorizationScope,
        redirect_uri: &str,
    ) -> Result<AuthorizationFlow> {
        AuthorizationFlow::begin(&self.auth, scopes, redirect_uri)
    }

    /// Feeds the provider's redirect into `flow`; on success the token is stored.
    pub async fn handle_callback(
        &self,
        flow: &mut AuthorizationFlow,
        params: CallbackParams,
    ) -> Result<AccessToken> {
        flow.complete(&self.auth, &self.store, params).await
    }

    /// The signed-in member, if a non-expired token is stored.
    pub async fn current_user(&self) -> Result<Option<UserAuthorization>> {
        match self.store.get().await? {
            Some(token) if !token.is_expired() => UserAuthorization::from_token(&token).map(Some),
            _ => Ok(None),
        }
    }

    pub async fn log_off(&self) -> Result<()> {
        self.store.clear().await?;
        tracing::info!("cleared stored access token");
        Ok(())
    }

    /// Issues an authorization URL when credentials are configured and, when a token is
    /// stored, fetches the member's profile.
    #[instrument(skip(self))]
    pub async fn index(
        &self,
        scopes: AuthorizationScope,
        redirect_uri: &str,
        culture: Option<&str>,
    ) -> Report<Dashboard> {
        let mut ctx = CallContext::new();
        let mut dashboard = Dashboard::default();

        if self.config.has_credentials() {
            dashboard.authorization = ctx
                .attempt("build authorization url", async {
                    self.start_authorization(scopes, redirect_uri)
                })
                .await;
        }

        let user = ctx
            .attempt("read stored token", self.current_user())
            .await
            .flatten();
        if let Some(user) = user {
            dashboard.profile = self.my_profile(&mut ctx, &user, culture).await;
        }

        ctx.finish(dashboard)
    }

    pub async fn my_profile(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        culture: Option<&str>,
    ) -> Option<Person> {
        let languages = self.config.accept_languages(culture);
        ctx.attempt("get my profile", self.api.get_my_profile(user, &languages))
            .await
    }

    pub async fn profile(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        profile_id: &str,
    ) -> Option<Person> {
        ctx.attempt("get profile", self.api.get_profile(user, profile_id))
            .await
    }

    pub async fn profiles_by_ids(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        profile_ids: &[&str],
    ) -> Option<PersonList> {
        ctx.attempt(
            "get profiles by ids",
            self.api.get_profiles_by_ids(user, profile_ids),
        )
        .await
    }

    pub async fn first_degree_connections(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        profile_id: &str,
    ) -> Option<DegreeSize> {
        ctx.attempt(
            "get first degree connections",
            self.api.get_first_degree_connections(user, profile_id),
        )
        .await
    }

    pub async fn shares(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        owner_urn: &str,
        paging: Paging,
    ) -> Option<Collection<Share>> {
        ctx.attempt("list shares", self.api.get_shares(user, owner_urn, paging))
            .await
    }

    pub async fn ugc_posts(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        author_urn: &str,
        paging: Paging,
    ) -> Option<Collection<UgcPostItem>> {
        ctx.attempt(
            "list ugc posts",
            self.api.get_ugc_posts(user, author_urn, paging),
        )
        .await
    }

    pub async fn share_statistics(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        company_urn: &str,
        share_urn: &str,
    ) -> Option<Collection<ShareStatisticsElement>> {
        ctx.attempt(
            "get share statistics",
            self.api.get_share_statistics(user, company_urn, share_urn),
        )
        .await
    }

    pub async fn share_post_statistics(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        company_urn: &str,
        post_urn: &str,
    ) -> Option<Collection<ShareStatisticsElement>> {
        ctx.attempt(
            "get share post statistics",
            self.api.get_share_post_statistics(user, company_urn, post_urn),
        )
        .await
    }

    pub async fn video_statistics(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        video_post_urn: &str,
        metric: VideoMetric,
        aggregation: Aggregation,
    ) -> Option<Collection<VideoAnalyticsElement>> {
        ctx.attempt(
            "get video statistics",
            self.api
                .get_video_statistics(user, video_post_urn, metric, aggregation),
        )
        .await
    }

    pub async fn audience_counts(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        targeting_criteria: &str,
    ) -> Option<Collection<AudienceCount>> {
        ctx.attempt(
            "get audience counts",
            self.api.get_audience_counts(user, targeting_criteria),
        )
        .await
    }

    /// Fetches the independent targeting taxonomies concurrently.
    ///
    /// Outcomes are recorded in a fixed order once every call has finished.
    #[instrument(skip(self, ctx, user))]
    pub async fn targeting_snapshot(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        locale: &Locale,
    ) -> TargetingSnapshot {
        let (industries, job_functions, seniorities, country_groups, facets) = tokio::join!(
            timed("get industries", self.api.get_industries(user, locale)),
            timed("get job functions", self.api.get_job_functions(user, locale)),
            timed("get seniorities", self.api.get_seniorities(user, locale)),
            timed("get country groups", self.api.get_country_groups(user, locale)),
            timed("get targeting facets", self.api.get_targeting_facets(user)),
        );

        TargetingSnapshot {
            industries: ctx.record(industries),
            job_functions: ctx.record(job_functions),
            seniorities: ctx.record(seniorities),
            country_groups: ctx.record(country_groups),
            facets: ctx.record(facets),
        }
    }

    /// Walks country group → countries → states → regions, following the first entry at
    /// each level. A level is skipped when its parent is unavailable.
    #[instrument(skip(self, ctx, user))]
    pub async fn geography(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        locale: &Locale,
        country_group_urn: &str,
    ) -> Geography {
        let mut geography = Geography::default();
        geography.countries = ctx
            .attempt(
                "get countries",
                self.api.get_countries(user, locale, country_group_urn),
            )
            .await;

        let Some(country_urn) = first_urn(&geography.countries) else {
            return geography;
        };
        geography.states = ctx
            .attempt("get states", self.api.get_states(user, locale, &country_urn))
            .await;

        let Some(state_urn) = first_urn(&geography.states) else {
            return geography;
        };
        geography.regions = ctx
            .attempt("get regions", self.api.get_regions(user, locale, &state_urn))
            .await;
        geography
    }

    /// Publishes any kind of post and returns the URN of what was created.
    ///
    /// Image and video posts run the full upload workflow first; if any step fails nothing
    /// is posted and the failure is recorded.
    #[instrument(skip(self, ctx, user, payload), fields(owner = %payload.header().owner))]
    pub async fn publish(
        &self,
        ctx: &mut CallContext,
        user: &UserAuthorization,
        payload: &PostPayload,
    ) -> Option<String> {
        let operation = match payload {
            PostPayload::Status(_) => "publish status share",
            PostPayload::Link(_) => "publish link share",
            PostPayload::Image(_) => "publish image share",
            PostPayload::Article(_) => "publish article share",
            PostPayload::Video(_) => "publish video post",
        };
        ctx.attempt(operation, async {
            let urn = match payload {
                PostPayload::Status(header) => {
                    self.api.post_share(user, &header.status_share()).await?.urn()
                }
                PostPayload::Link(post) => self.api.post_share(user, &post.share()).await?.urn(),
                PostPayload::Article(post) => {
                    self.api.post_share(user, &post.share()).await?.urn()
                }
                PostPayload::Image(post) => self.api.publish_image_share(user, post).await?.urn(),
                PostPayload::Video(post) => self.api.publish_video_ugc(user, post).await?,
            };
            Ok::<_, Error>(urn)
        })
        .await
    }
}

fn first_urn(collection: &Option<Collection<TargetingEntity>>) -> Option<String> {
    collection
        .as_ref()?
        .elements
        .front()?
        .urn
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkedin_api::client::tests::{test_config, user};
    use crate::post::{ImagePost, PostHeader, VideoPost};
    use crate::token_store::MemoryTokenStore;
    use crate::upload::tests::{image_post, serve_media, video_post};
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn facade(server: &MockServer) -> Facade<MemoryTokenStore> {
        Facade::new(test_config(server), MemoryTokenStore::new()).unwrap()
    }

    const PERSON: &str =
        r#"{"id":"abc","localizedFirstName":"Ada","localizedLastName":"Lovelace"}"#;

    #[tokio::test]
    async fn failure_does_not_stop_later_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/me"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/people/(id:abc)"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PERSON))
            .expect(1)
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        let me = facade.my_profile(&mut ctx, &user(), None).await;
        let other = facade.profile(&mut ctx, &user(), "abc").await;

        assert!(me.is_none());
        assert_eq!(other.map(|p| p.id), Some("abc".to_string()));

        let report = ctx.finish(());
        assert_eq!(report.errors.kinds(), vec![ErrorKind::ProviderApi]);
        let record = report.errors.iter().next().unwrap();
        assert_eq!(record.operation, "get my profile");
        assert_eq!(record.raw_response.as_deref(), Some("boom"));
        assert_eq!(report.timings.len(), 2);
        assert!(!report.timings[0].succeeded);
        assert!(report.timings[1].succeeded);
    }

    #[tokio::test]
    async fn errors_keep_call_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        facade.profile(&mut ctx, &user(), "a").await;
        facade
            .shares(&mut ctx, &user(), "urn:li:organization:1", Paging::default())
            .await;
        facade
            .first_degree_connections(&mut ctx, &user(), "a")
            .await;

        let operations: Vec<_> = ctx.errors().iter().map(|r| r.operation).collect();
        assert_eq!(
            operations,
            vec!["get profile", "list shares", "get first degree connections"]
        );
        assert!(ctx.errors().iter().all(|r| r.kind == ErrorKind::Transport));
    }

    #[tokio::test]
    async fn image_registration_failure_posts_nothing() {
        let server = MockServer::start().await;
        serve_media(&server, "photo.png", b"\x89PNG").await;
        Mock::given(method("POST"))
            .and(path("/v2/assets"))
            .respond_with(ResponseTemplate::new(403).set_body_string("not an admin"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/shares"))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"1"}"#))
            .expect(0)
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        let published = facade
            .publish(&mut ctx, &user(), &PostPayload::Image(image_post(&server)))
            .await;

        assert_eq!(published, None);
        assert_eq!(ctx.errors().kinds(), vec![ErrorKind::ProviderApi]);
        assert_eq!(
            ctx.errors().iter().next().unwrap().operation,
            "publish image share"
        );
    }

    #[tokio::test]
    async fn video_fetch_failure_uploads_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/clip.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex("^/v2/.*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        let published = facade
            .publish(&mut ctx, &user(), &PostPayload::Video(video_post(&server)))
            .await;

        assert_eq!(published, None);
        assert_eq!(ctx.errors().kinds(), vec![ErrorKind::Fetch]);
    }

    #[tokio::test]
    async fn video_registration_failure_posts_nothing() {
        let server = MockServer::start().await;
        serve_media(&server, "clip.mp4", b"mp4").await;
        Mock::given(method("POST"))
            .and(path("/v2/assets"))
            .and(query_param("action", "registerUpload"))
            .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        let published = facade
            .publish(&mut ctx, &user(), &PostPayload::Video(video_post(&server)))
            .await;

        assert_eq!(published, None);
        assert_eq!(ctx.errors().kinds(), vec![ErrorKind::ProviderApi]);
        let record = ctx.errors().iter().next().unwrap();
        assert_eq!(record.operation, "publish video post");
        assert_eq!(record.raw_response.as_deref(), Some("try later"));
    }

    #[tokio::test]
    async fn video_transfer_failure_posts_nothing() {
        let server = MockServer::start().await;
        serve_media(&server, "clip.mp4", b"mp4").await;
        Mock::given(method("POST"))
            .and(path("/v2/assets"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(
                    crate::linkedin_api::assets::tests::registered_body(&server),
                ),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/upload/C5522AQ"))
            .respond_with(ResponseTemplate::new(500).set_body_string("storage down"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        let published = facade
            .publish(&mut ctx, &user(), &PostPayload::Video(video_post(&server)))
            .await;

        assert_eq!(published, None);
        assert_eq!(ctx.errors().kinds(), vec![ErrorKind::Upload]);
        assert_eq!(
            ctx.errors().iter().next().unwrap().raw_response.as_deref(),
            Some("storage down")
        );
    }

    #[tokio::test]
    async fn earlier_post_survives_later_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/shares"))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"42"}"#))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        let header = PostHeader::new("urn:li:organization:5", "status");
        let status = facade
            .publish(&mut ctx, &user(), &PostPayload::Status(header.clone()))
            .await;
        let image = facade
            .publish(
                &mut ctx,
                &user(),
                &PostPayload::Image(ImagePost {
                    header,
                    source_url: format!("{}/media/gone.png", server.uri()),
                    title: None,
                }),
            )
            .await;

        assert_eq!(status.as_deref(), Some("urn:li:share:42"));
        assert_eq!(image, None);
        assert_eq!(ctx.errors().kinds(), vec![ErrorKind::Fetch]);
    }

    #[tokio::test]
    async fn targeting_snapshot_isolates_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/industries"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/seniorities"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"elements":[]}"#))
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        let snapshot = facade
            .targeting_snapshot(&mut ctx, &user(), &Locale::new("en", "US"))
            .await;

        assert!(snapshot.industries.is_none());
        assert!(snapshot.seniorities.is_none());
        assert!(snapshot.job_functions.is_some());
        assert!(snapshot.country_groups.is_some());
        assert!(snapshot.facets.is_some());

        let operations: Vec<_> = ctx.errors().iter().map(|r| r.operation).collect();
        assert_eq!(operations, vec!["get industries", "get seniorities"]);
        assert_eq!(ctx.timings().len(), 5);
    }

    #[tokio::test]
    async fn geography_stops_at_missing_parent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/countries"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"elements":[{"$URN":"urn:li:country:fr","name":{"localized":{"en_US":"France"}}}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/states"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"elements":[]}"#))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/regions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"elements":[]}"#))
            .expect(0)
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        let geography = facade
            .geography(
                &mut ctx,
                &user(),
                &Locale::new("en", "US"),
                "urn:li:countryGroup:EU",
            )
            .await;

        assert_eq!(geography.countries.map(|c| c.elements.len()), Some(1));
        assert!(geography.states.is_some());
        assert!(geography.regions.is_none());
        assert!(ctx.errors().is_empty());
    }

    #[tokio::test]
    async fn index_without_credentials_or_token() {
        let server = MockServer::start().await;
        let config = test_config(&server);
        let config = LinkedInConfig::new("", "")
            .with_api_base_url(config.api_base_url().clone())
            .with_request_timeout(config.request_timeout());
        let facade = Facade::new(config, MemoryTokenStore::new()).unwrap();

        let report = facade
            .index(AuthorizationScope::WRITE_SHARE, "http://localhost/cb", None)
            .await;
        assert!(report.value.authorization.is_none());
        assert!(report.value.profile.is_none());
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn index_fetches_profile_for_stored_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PERSON))
            .expect(1)
            .mount(&server)
            .await;

        let facade = facade(&server);
        facade
            .store()
            .save(AccessToken::new("stored-token"))
            .await
            .unwrap();

        let report = facade
            .index(
                AuthorizationScope::READ_EMAIL_ADDRESS | AuthorizationScope::WRITE_SHARE,
                "http://localhost/cb",
                Some("de-DE"),
            )
            .await;

        let flow = report.value.authorization.unwrap();
        assert!(flow.authorization_url().as_str().contains("client_id=client-id"));
        assert_eq!(report.value.profile.unwrap().display_name(), "Ada Lovelace");
        assert!(report.errors.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].headers.get("accept-language").unwrap(),
            "de-DE, fr-FR"
        );
    }

    #[tokio::test]
    async fn log_off_clears_token() {
        let server = MockServer::start().await;
        let facade = facade(&server);
        facade.store().save(AccessToken::new("t")).await.unwrap();
        assert!(facade.current_user().await.unwrap().is_some());

        facade.log_off().await.unwrap();
        assert!(facade.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn video_payload_end_to_end() {
        let server = MockServer::start().await;
        serve_media(&server, "clip.mp4", b"mp4").await;
        Mock::given(method("POST"))
            .and(path("/v2/assets"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(
                    crate::linkedin_api::assets::tests::registered_body(&server),
                ),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(
                ResponseTemplate::new(201).set_body_string(r#"{"id":"urn:li:ugcPost:3"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let facade = facade(&server);
        let mut ctx = CallContext::new();
        let post: VideoPost = video_post(&server);
        let urn = facade
            .publish(&mut ctx, &user(), &PostPayload::Video(post))
            .await;
        assert_eq!(urn.as_deref(), Some("urn:li:ugcPost:3"));
        assert!(ctx.errors().is_empty());
    }
}
