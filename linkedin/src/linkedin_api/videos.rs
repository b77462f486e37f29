//! LinkedIn video upload.
//!
//! Videos go through the same register-then-transfer protocol as images, with the
//! `feedshare-video` recipe. Callers only see the resulting media reference.

use crate::error::Result;
use crate::linkedin_api::assets::{MediaRecipe, RegisterUploadRequest};
use crate::linkedin_api::client::{LinkedInApi, UserAuthorization};
use bytes::Bytes;
use tracing::instrument;

impl LinkedInApi {
    /// Uploads a video owned by `owner_urn` and returns the asset URN to reference in a post.
    #[instrument(skip(self, user, data), fields(bytes = data.len()), level = tracing::Level::DEBUG)]
    pub async fn upload_video(
        &self,
        user: &UserAuthorization,
        owner_urn: &str,
        data: Bytes,
    ) -> Result<String> {
        let request = RegisterUploadRequest::new(owner_urn, MediaRecipe::FeedshareVideo);
        let registered = self.register_upload(user, &request).await?;
        self.upload_asset(user, &registered.upload_mechanism.http_request, data)
            .await?;

        tracing::debug!(asset = %registered.asset, "uploaded video");
        Ok(registered.asset)
    }
}
