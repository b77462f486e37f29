//! Publishable content and how each kind maps onto the share and UGC post bodies.

use crate::linkedin_api::shares::{
    ContentEntity, ContentThumbnail, Distribution, DistributionTarget, PostShare, ShareContent,
    ShareMediaCategory, ShareText,
};
use crate::linkedin_api::ugc_posts::{
    ImageThumbnail, LifecycleState, MemberNetworkVisibility, SpecificContent, UgcMedia,
    UgcMediaCategory, UgcPost, UgcShareContent, UgcText, UgcVisibility,
};
use serde::{Deserialize, Serialize};

/// Who can see a published post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Connections,
}

impl Visibility {
    pub(crate) fn distribution(self) -> Distribution {
        Distribution {
            linked_in_distribution_target: DistributionTarget {
                visible_to_guest: self == Self::Public,
            },
        }
    }

    pub(crate) fn ugc_visibility(self) -> UgcVisibility {
        UgcVisibility {
            member_network_visibility: match self {
                Self::Public => MemberNetworkVisibility::Public,
                Self::Connections => MemberNetworkVisibility::Connections,
            },
        }
    }
}

/// Fields shared by every kind of post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostHeader {
    /// Person or organization URN the post is published as.
    pub owner: String,
    pub commentary: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl PostHeader {
    pub fn new(owner: impl Into<String>, commentary: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            commentary: commentary.into(),
            visibility: Visibility::Public,
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub(crate) fn status_share(&self) -> PostShare {
        self.share(None, None)
    }

    fn share(&self, subject: Option<String>, content: Option<ShareContent>) -> PostShare {
        PostShare {
            owner: self.owner.clone(),
            text: ShareText {
                text: self.commentary.clone(),
            },
            subject,
            distribution: self.visibility.distribution(),
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPost {
    pub header: PostHeader,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePost {
    pub header: PostHeader,
    pub url: String,
    pub title: Option<String>,
}

/// An image fetched from `source_url`, uploaded, then shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePost {
    pub header: PostHeader,
    pub source_url: String,
    pub title: Option<String>,
}

/// A video fetched from `source_url`, uploaded, then published as a UGC post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPost {
    pub header: PostHeader,
    pub source_url: String,
    pub title: String,
    pub description: String,
    /// Falls back to the configured default thumbnail when absent.
    pub thumbnail: Option<ImageThumbnail>,
}

/// Anything that can be published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostPayload {
    Status(PostHeader),
    Link(LinkPost),
    Image(ImagePost),
    Article(ArticlePost),
    Video(VideoPost),
}

impl PostPayload {
    pub fn header(&self) -> &PostHeader {
        match self {
            Self::Status(header) => header,
            Self::Link(LinkPost { header, .. })
            | Self::Image(ImagePost { header, .. })
            | Self::Article(ArticlePost { header, .. })
            | Self::Video(VideoPost { header, .. }) => header,
        }
    }
}

impl LinkPost {
    pub(crate) fn share(&self) -> PostShare {
        let content = ShareContent {
            title: self.title.clone(),
            description: None,
            content_entities: vec![ContentEntity {
                entity_location: Some(self.url.clone()),
                thumbnails: self
                    .thumbnail_url
                    .iter()
                    .map(|url| ContentThumbnail {
                        resolved_url: url.clone(),
                    })
                    .collect(),
                ..Default::default()
            }],
            share_media_category: None,
        };
        self.header.share(self.description.clone(), Some(content))
    }
}

impl ArticlePost {
    pub(crate) fn share(&self) -> PostShare {
        let content = ShareContent {
            title: self.title.clone(),
            description: None,
            content_entities: vec![ContentEntity {
                entity_location: Some(self.url.clone()),
                ..Default::default()
            }],
            share_media_category: Some(ShareMediaCategory::Article),
        };
        self.header.share(None, Some(content))
    }
}

impl ImagePost {
    pub(crate) fn share(&self, asset_urn: &str) -> PostShare {
        let content = ShareContent {
            title: self.title.clone(),
            description: None,
            content_entities: vec![ContentEntity {
                entity: Some(asset_urn.to_string()),
                ..Default::default()
            }],
            share_media_category: Some(ShareMediaCategory::Image),
        };
        self.header.share(None, Some(content))
    }
}

impl VideoPost {
    pub(crate) fn ugc_post(&self, asset_urn: &str, default_thumbnail: &ImageThumbnail) -> UgcPost {
        let thumbnail = self
            .thumbnail
            .clone()
            .unwrap_or_else(|| default_thumbnail.clone());
        UgcPost {
            author: self.header.owner.clone(),
            lifecycle_state: LifecycleState::Published,
            specific_content: SpecificContent {
                share_content: UgcShareContent {
                    share_commentary: UgcText::new(self.header.commentary.clone()),
                    share_media_category: UgcMediaCategory::Video,
                    media: vec![UgcMedia {
                        status: "READY".to_string(),
                        media: asset_urn.to_string(),
                        title: Some(UgcText::new(self.title.clone())),
                        description: Some(UgcText::new(self.description.clone())),
                        thumbnails: vec![thumbnail],
                    }],
                },
            },
            visibility: self.header.visibility.ugc_visibility(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header() -> PostHeader {
        PostHeader::new("urn:li:organization:5", "hello")
    }

    #[test]
    fn status_share_has_no_content() {
        let share = header()
            .with_visibility(Visibility::Connections)
            .status_share();
        assert_eq!(share.content, None);
        assert_eq!(share.text.text, "hello");
        assert!(!share.distribution.linked_in_distribution_target.visible_to_guest);
    }

    #[test]
    fn image_share_references_asset() {
        let post = ImagePost {
            header: header(),
            source_url: "https://example.com/a.png".into(),
            title: None,
        };
        let json = serde_json::to_value(post.share("urn:li:digitalmediaAsset:1")).unwrap();
        assert_eq!(
            json["content"],
            serde_json::json!({
                "contentEntities": [{"entity": "urn:li:digitalmediaAsset:1"}],
                "shareMediaCategory": "IMAGE"
            })
        );
        assert_eq!(
            json["distribution"]["linkedInDistributionTarget"]["visibleToGuest"],
            true
        );
    }

    #[test]
    fn link_share_carries_location_and_thumbnail() {
        let post = LinkPost {
            header: header(),
            url: "https://example.com/".into(),
            title: Some("Example".into()),
            description: Some("An example".into()),
            thumbnail_url: Some("https://example.com/t.png".into()),
        };
        let share = post.share();
        assert_eq!(share.subject.as_deref(), Some("An example"));
        let content = share.content.unwrap();
        assert_eq!(content.share_media_category, None);
        assert_eq!(
            content.content_entities[0].entity_location.as_deref(),
            Some("https://example.com/")
        );
        assert_eq!(
            content.content_entities[0].thumbnails[0].resolved_url,
            "https://example.com/t.png"
        );
    }

    #[test]
    fn video_post_falls_back_to_default_thumbnail() {
        let default = ImageThumbnail {
            url: "https://example.com/default.png".into(),
            height: 500,
            width: 300,
        };
        let mut post = VideoPost {
            header: header(),
            source_url: "https://example.com/v.mp4".into(),
            title: "Title".into(),
            description: "Description".into(),
            thumbnail: None,
        };

        let ugc = post.ugc_post("urn:li:digitalmediaAsset:V", &default);
        let content = &ugc.specific_content.share_content;
        assert_eq!(content.share_media_category, UgcMediaCategory::Video);
        assert_eq!(content.media[0].thumbnails, vec![default.clone()]);
        assert_eq!(content.media[0].title, Some(UgcText::new("Title")));

        let custom = ImageThumbnail {
            url: "https://example.com/own.png".into(),
            height: 90,
            width: 160,
        };
        post.thumbnail = Some(custom.clone());
        let ugc = post.ugc_post("urn:li:digitalmediaAsset:V", &default);
        assert_eq!(
            ugc.specific_content.share_content.media[0].thumbnails,
            vec![custom]
        );
    }

    #[test]
    fn payload_is_tagged() {
        let payload: PostPayload = serde_json::from_str(
            r#"{"kind":"article","header":{"owner":"urn:li:person:a","commentary":"read"},
                "url":"https://example.com/post","title":null}"#,
        )
        .unwrap();
        assert!(matches!(payload, PostPayload::Article(_)));
        assert_eq!(payload.header().visibility, Visibility::Public);
    }
}
