//! LinkedIn UGC (user-generated content) Posts API types and functionality.

use crate::error::{Error, Result};
use crate::linkedin_api::client::{LinkedInApi, UserAuthorization, within};
use crate::linkedin_api::types::{Collection, Paging};
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Request body of `POST /v2/ugcPosts`.
///
/// See: <https://learn.microsoft.com/linkedin/compliance/integrations/shares/ugc-post-api>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcPost {
    pub author: String,
    pub lifecycle_state: LifecycleState,
    pub specific_content: SpecificContent,
    pub visibility: UgcVisibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    pub share_content: UgcShareContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcShareContent {
    pub share_commentary: UgcText,
    pub share_media_category: UgcMediaCategory,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<UgcMedia>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UgcMediaCategory {
    None,
    Article,
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UgcText {
    pub text: String,
}

impl UgcText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcMedia {
    pub status: String,
    /// URN of the uploaded asset.
    pub media: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<UgcText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<UgcText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thumbnails: Vec<ImageThumbnail>,
}

/// A thumbnail image reference attached to a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageThumbnail {
    pub url: String,
    pub height: u32,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UgcVisibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    pub member_network_visibility: MemberNetworkVisibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberNetworkVisibility {
    Public,
    Connections,
}

/// A UGC post as returned by the authors finder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcPostItem {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<LifecycleState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_content: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct CreatedEntity {
    id: String,
}

impl LinkedInApi {
    /// Lists UGC posts authored by `author_urn`.
    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_ugc_posts(
        &self,
        user: &UserAuthorization,
        author_urn: &str,
        paging: Paging,
    ) -> Result<Collection<UgcPostItem>> {
        let authors = format!("List({author_urn})");
        let (start, count) = paging.query_values();
        let posts: Collection<UgcPostItem> = self
            .get_json(
                user,
                "list ugc posts",
                "/v2/ugcPosts",
                &[
                    ("q", "authors"),
                    ("authors", &authors),
                    ("start", &start),
                    ("count", &count),
                ],
            )
            .await?;

        tracing::debug!(
            author_urn,
            returned_items = posts.elements.len(),
            "fetched ugc posts"
        );
        Ok(posts)
    }

    /// Publishes a UGC post and returns the URN of the created post.
    ///
    /// The id is read from the `X-RestLi-Id` response header, falling back to the body.
    #[instrument(skip(self, user, post), level = tracing::Level::DEBUG)]
    pub async fn post_ugc_post(&self, user: &UserAuthorization, post: &UgcPost) -> Result<String> {
        const OPERATION: &str = "post ugc post";
        let response = self
            .make_authenticated_request(
                user,
                OPERATION,
                Method::POST,
                "/v2/ugcPosts",
                None,
                Some(post),
            )
            .await?;

        let from_header = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let id = match from_header {
            Some(id) => id,
            None => {
                let body = within(OPERATION, self.timeout(), response.text()).await?;
                serde_json::from_str::<CreatedEntity>(&body)
                    .map_err(|source| Error::Decode {
                        operation: OPERATION,
                        source,
                    })?
                    .id
            }
        };

        tracing::debug!(post_id = %id, author = %post.author, "published ugc post");
        Ok(id)
    }
}
