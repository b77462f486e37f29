//! LinkedIn v2 REST API client library.
//!
//! [`LinkedInApi`] holds the configuration and HTTP client; each resource group adds its
//! methods in its own module. Every method takes the [`UserAuthorization`] the call is made
//! on behalf of and returns either a typed model or an [`Error`](crate::Error) that is
//! [`ProviderApi`](crate::ErrorKind::ProviderApi) (the raw body is kept) or
//! [`Transport`](crate::ErrorKind::Transport).
//!
//! # Media uploads
//!
//! Images and videos are uploaded in two steps: [`LinkedInApi::register_upload`] declares the
//! owner and processing recipe and returns an asset URN plus a signed upload URL, then
//! [`LinkedInApi::upload_asset`] PUTs the bytes there. Posts reference the asset URN.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use linkedin_connect::LinkedInConfig;
//! use linkedin_connect::linkedin_api::{LinkedInApi, Paging, UserAuthorization};
//! use std::sync::Arc;
//!
//! # async fn example() -> linkedin_connect::Result<()> {
//! let config = Arc::new(LinkedInConfig::new("client-id", "client-secret"));
//! let api = LinkedInApi::new(config.clone())?;
//! let user = UserAuthorization::new("access-token")?;
//!
//! let me = api.get_my_profile(&user, &config.accept_languages(None)).await?;
//! let shares = api.get_shares(&user, &me.urn(), Paging::default()).await?;
//! println!("{} has {} shares", me.display_name(), shares.elements.len());
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod assets;
pub mod client;
pub mod profiles;
pub mod shares;
pub mod targeting;
pub mod types;
pub mod ugc_posts;
pub mod videos;

pub use client::{LinkedInApi, UserAuthorization};
pub use types::{Collection, Locale, MultiLocaleString, PagedStream, Paging, PagingInfo};

pub use analytics::{
    Aggregation, ShareStatistics, ShareStatisticsElement, VideoAnalyticsElement, VideoMetric,
};
pub use assets::{MediaRecipe, MediaUploadHttpRequest, RegisterUploadRequest, RegisteredUpload};
pub use profiles::{DegreeSize, Person, PersonList};
pub use shares::{
    ContentEntity, ContentThumbnail, Distribution, PostShare, PostShareResult, Share,
    ShareContent, ShareMediaCategory, ShareText,
};
pub use targeting::{AudienceCount, TargetingEntity, TargetingFacet};
pub use ugc_posts::{
    ImageThumbnail, LifecycleState, MemberNetworkVisibility, UgcMedia, UgcMediaCategory, UgcPost,
    UgcPostItem, UgcShareContent, UgcText, UgcVisibility,
};
