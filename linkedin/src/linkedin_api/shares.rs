//! LinkedIn Shares API types and functionality.

use crate::error::Result;
use crate::linkedin_api::client::{LinkedInApi, UserAuthorization};
use crate::linkedin_api::types::{Collection, PagedStream, Paging};
use http::Method;
use serde::{Deserialize, Serialize};
use tokio_stream::Stream;
use tracing::instrument;

/// Request body of `POST /v2/shares`.
///
/// See: <https://learn.microsoft.com/linkedin/marketing/integrations/community-management/shares/share-api>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostShare {
    /// Organization or person URN that owns the share.
    pub owner: String,
    pub text: ShareText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub distribution: Distribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ShareContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub linked_in_distribution_target: DistributionTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionTarget {
    pub visible_to_guest: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content_entities: Vec<ContentEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_media_category: Option<ShareMediaCategory>,
}

/// What a share's content entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareMediaCategory {
    Image,
    Article,
    RichMedia,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntity {
    /// URN of an uploaded asset (for images).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// URL of the linked page (for links and articles).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thumbnails: Vec<ContentThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentThumbnail {
    pub resolved_url: String,
}

/// Response of `POST /v2/shares`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostShareResult {
    /// The numeric share id; see [`PostShareResult::urn`].
    pub id: String,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl PostShareResult {
    pub fn urn(&self) -> String {
        format!("urn:li:share:{}", self.id)
    }
}

/// A share as returned by the owners finder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Share {
    pub id: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub text: Option<ShareText>,
}

impl LinkedInApi {
    /// Lists shares owned by `owner_urn` (usually an organization).
    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_shares(
        &self,
        user: &UserAuthorization,
        owner_urn: &str,
        paging: Paging,
    ) -> Result<Collection<Share>> {
        let (start, count) = paging.query_values();
        let shares: Collection<Share> = self
            .get_json(
                user,
                "list shares",
                "/v2/shares",
                &[
                    ("q", "owners"),
                    ("owners", owner_urn),
                    ("sharesPerOwner", "100"),
                    ("start", &start),
                    ("count", &count),
                ],
            )
            .await?;

        tracing::debug!(
            owner_urn,
            returned_items = shares.elements.len(),
            "fetched shares"
        );
        Ok(shares)
    }

    /// Returns a paginated stream over every share owned by `owner_urn`.
    #[instrument(skip(self, user))]
    pub fn stream_shares<'a>(
        &'a self,
        user: &'a UserAuthorization,
        owner_urn: &'a str,
        page_size: u32,
    ) -> impl Stream<Item = Result<Share>> + use<'a> {
        PagedStream::new(move |start: Option<u32>| async move {
            let paging = Paging::new(start.unwrap_or(0), page_size);
            let page = self.get_shares(user, owner_urn, paging).await?;
            let info = page.paging.unwrap_or_else(|| crate::linkedin_api::types::PagingInfo {
                start: paging.start,
                count: paging.count,
                total: None,
            });
            let next = info.next_start(page.elements.len());
            Ok((page.elements, next))
        })
    }

    #[instrument(skip(self, user, share), level = tracing::Level::DEBUG)]
    pub async fn post_share(
        &self,
        user: &UserAuthorization,
        share: &PostShare,
    ) -> Result<PostShareResult> {
        const OPERATION: &str = "post share";
        let response = self
            .make_authenticated_request(
                user,
                OPERATION,
                Method::POST,
                "/v2/shares",
                None,
                Some(share),
            )
            .await?;
        let result: PostShareResult = self.read_json(OPERATION, response).await?;

        tracing::debug!(share_id = %result.id, owner = %share.owner, "published share");
        Ok(result)
    }
}
