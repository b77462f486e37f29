//! Media publishing: fetch the source bytes, upload them as a LinkedIn asset, then publish a
//! post that references the asset.
//!
//! Every step must succeed before the next one starts, so a failed fetch, registration or
//! transfer never results in a post.

use crate::error::{Error, Result};
use crate::linkedin_api::assets::{MediaRecipe, RegisterUploadRequest};
use crate::linkedin_api::client::{LinkedInApi, UserAuthorization};
use crate::linkedin_api::shares::PostShareResult;
use crate::post::{ImagePost, VideoPost};
use bytes::{Bytes, BytesMut};
use tokio_stream::StreamExt;
use tracing::instrument;
use url::Url;

impl LinkedInApi {
    /// Downloads `source_url` into memory, streaming the body chunk by chunk.
    ///
    /// Redirects are followed. Any failure, including a non-success status, a body over the
    /// configured size limit or the timeout expiring, is an [`Error::Fetch`].
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn fetch_media(&self, source_url: &str) -> Result<Bytes> {
        let fetch_error = |reason: String| Error::Fetch {
            url: source_url.to_string(),
            reason,
        };
        let url = Url::parse(source_url).map_err(|e| fetch_error(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(fetch_error(format!("unsupported scheme {}", url.scheme())));
        }

        let limit = self.config().max_media_bytes();
        let too_large = || fetch_error(format!("source is larger than {limit} bytes"));
        let download = async {
            let response = self
                .media_http_client()
                .get(url)
                .send()
                .await
                .map_err(|e| fetch_error(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(fetch_error(format!("source answered with status {status}")));
            }
            if response.content_length().is_some_and(|len| len > limit) {
                return Err(too_large());
            }

            let mut buf = BytesMut::new();
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|e| fetch_error(e.to_string()))?;
                if (buf.len() + chunk.len()) as u64 > limit {
                    return Err(too_large());
                }
                buf.extend_from_slice(&chunk);
            }
            Ok::<_, Error>(buf.freeze())
        };

        let bytes = tokio::time::timeout(self.timeout(), download)
            .await
            .map_err(|_| fetch_error(format!("timed out after {:?}", self.timeout())))??;

        tracing::debug!(bytes = bytes.len(), "fetched source media");
        Ok(bytes)
    }

    /// Publishes an image share: fetch, register with the image recipe, transfer, then share
    /// with media category `IMAGE`.
    #[instrument(
        skip(self, user, post),
        fields(owner = %post.header.owner),
        level = tracing::Level::DEBUG
    )]
    pub async fn publish_image_share(
        &self,
        user: &UserAuthorization,
        post: &ImagePost,
    ) -> Result<PostShareResult> {
        let data = self.fetch_media(&post.source_url).await?;

        let request = RegisterUploadRequest::new(&post.header.owner, MediaRecipe::FeedshareImage);
        let registered = self.register_upload(user, &request).await?;
        self.upload_asset(user, &registered.upload_mechanism.http_request, data)
            .await?;

        let result = self.post_share(user, &post.share(&registered.asset)).await?;
        tracing::debug!(share = %result.urn(), asset = %registered.asset, "published image share");
        Ok(result)
    }

    /// Publishes a video: fetch, upload via the video protocol, then publish a UGC post with
    /// media category `VIDEO`. Returns the URN of the created post.
    #[instrument(
        skip(self, user, post),
        fields(owner = %post.header.owner),
        level = tracing::Level::DEBUG
    )]
    pub async fn publish_video_ugc(
        &self,
        user: &UserAuthorization,
        post: &VideoPost,
    ) -> Result<String> {
        let data = self.fetch_media(&post.source_url).await?;
        let asset = self.upload_video(user, &post.header.owner, data).await?;

        let ugc = post.ugc_post(&asset, self.config().default_video_thumbnail());
        let post_urn = self.post_ugc_post(user, &ugc).await?;
        tracing::debug!(post = %post_urn, asset = %asset, "published video post");
        Ok(post_urn)
    }
}
