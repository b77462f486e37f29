//! LinkedIn Assets API: registering an upload and transferring the binary.

use crate::error::{Error, Result};
use crate::linkedin_api::client::{LinkedInApi, UserAuthorization, within};
use bytes::Bytes;
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// Processing recipe declared when registering an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRecipe {
    FeedshareImage,
    FeedshareVideo,
}

impl MediaRecipe {
    pub fn urn(self) -> &'static str {
        match self {
            Self::FeedshareImage => "urn:li:digitalmediaRecipe:feedshare-image",
            Self::FeedshareVideo => "urn:li:digitalmediaRecipe:feedshare-video",
        }
    }
}

/// Request body of `POST /v2/assets?action=registerUpload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUploadRequest {
    pub register_upload_request: RegisterUploadRequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUploadRequestData {
    pub owner: String,
    pub recipes: Vec<String>,
    pub service_relationships: Vec<ServiceRelationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRelationship {
    pub identifier: String,
    pub relationship_type: String,
}

impl RegisterUploadRequest {
    /// An upload owned by `owner_urn`, processed with `recipe`, for use in member or
    /// organization posts.
    pub fn new(owner_urn: impl Into<String>, recipe: MediaRecipe) -> Self {
        Self {
            register_upload_request: RegisterUploadRequestData {
                owner: owner_urn.into(),
                recipes: vec![recipe.urn().to_string()],
                service_relationships: vec![ServiceRelationship {
                    identifier: "urn:li:userGeneratedContent".to_string(),
                    relationship_type: "OWNER".to_string(),
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUploadResponse {
    pub value: RegisteredUpload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUpload {
    /// URN of the asset; referenced by posts once the bytes are uploaded.
    pub asset: String,
    #[serde(default)]
    pub media_artifact: Option<String>,
    pub upload_mechanism: UploadMechanism,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadMechanism {
    #[serde(rename = "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest")]
    pub http_request: MediaUploadHttpRequest,
}

/// One-time signed upload target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUploadHttpRequest {
    pub upload_url: String,
    /// Headers that must accompany the binary transfer.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl LinkedInApi {
    #[instrument(
        skip(self, user, request),
        fields(owner = %request.register_upload_request.owner),
        level = tracing::Level::DEBUG
    )]
    pub async fn register_upload(
        &self,
        user: &UserAuthorization,
        request: &RegisterUploadRequest,
    ) -> Result<RegisteredUpload> {
        const OPERATION: &str = "register upload";
        let response = self
            .make_authenticated_request(
                user,
                OPERATION,
                Method::POST,
                "/v2/assets",
                Some(&[("action", "registerUpload")]),
                Some(request),
            )
            .await?;
        let registered: RegisterUploadResponse = self.read_json(OPERATION, response).await?;

        tracing::debug!(asset = %registered.value.asset, "registered upload");
        Ok(registered.value)
    }

    /// Transfers `data` to a signed upload URL obtained from [`Self::register_upload`].
    ///
    /// A non-success status is reported as [`Error::Upload`].
    #[instrument(
        skip(self, user, target, data),
        fields(bytes = data.len()),
        level = tracing::Level::DEBUG
    )]
    pub async fn upload_asset(
        &self,
        user: &UserAuthorization,
        target: &MediaUploadHttpRequest,
        data: Bytes,
    ) -> Result<()> {
        const OPERATION: &str = "upload asset";
        let mut request = self
            .http_client()
            .put(&target.upload_url)
            .bearer_auth(user.access_token());
        for (name, value) in &target.headers {
            request = request.header(name, value);
        }

        let response = within(OPERATION, self.timeout(), request.body(data).send()).await?;
        let status = response.status();
        if !status.is_success() {
            let body = within(OPERATION, self.timeout(), response.text())
                .await
                .unwrap_or_default();
            return Err(Error::Upload {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("uploaded asset binary");
        Ok(())
    }
}
