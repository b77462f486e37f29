//! LinkedIn v2 API client with an error-isolating facade.
//!
//! - [`oauth`] runs the authorization-code flow and guards it with the `state` check.
//! - [`token_store`] keeps the resulting bearer token.
//! - [`linkedin_api`] has typed clients for profiles, shares, UGC posts, targeting, assets,
//!   videos and analytics.
//! - [`upload`] chains fetch, asset registration, binary upload and post submission.
//! - [`facade`] sequences all of the above for one invocation and collects every failure
//!   into an [`AggregatedError`] instead of aborting.

pub mod config;
pub mod error;
pub mod facade;
pub mod linkedin_api;
pub mod oauth;
pub mod post;
pub mod token_store;
pub mod upload;

pub use config::LinkedInConfig;
pub use error::{Error, ErrorKind, Result};
pub use facade::{
    AggregatedError, CallContext, CallTiming, Dashboard, ErrorRecord, Facade, Geography, Report,
    TargetingSnapshot,
};
pub use oauth::{
    AccessToken, AuthorizationClient, AuthorizationFlow, AuthorizationScope, AuthorizationState,
    CallbackParams, Denial, FlowPhase,
};
pub use post::{ArticlePost, ImagePost, LinkPost, PostHeader, PostPayload, VideoPost, Visibility};
pub use token_store::{JsonFileTokenStore, MemoryTokenStore, TokenStore};
