//! LinkedIn share statistics and video analytics.

use crate::error::Result;
use crate::linkedin_api::client::{LinkedInApi, UserAuthorization};
use crate::linkedin_api::types::Collection;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Engagement counters for one share or post of an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareStatistics {
    #[serde(default)]
    pub share_count: u64,
    #[serde(default)]
    pub click_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub impression_count: u64,
    #[serde(default)]
    pub unique_impressions_count: u64,
    #[serde(default)]
    pub engagement: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareStatisticsElement {
    #[serde(default)]
    pub organizational_entity: Option<String>,
    #[serde(default)]
    pub share: Option<String>,
    #[serde(default, rename = "ugcPost")]
    pub ugc_post: Option<String>,
    pub total_share_statistics: ShareStatistics,
}

/// Video metric to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoMetric {
    VideoView,
    #[serde(rename = "VIEWER")]
    ViewerCount,
    TimeWatched,
    TimeWatchedForVideoViews,
}

impl fmt::Display for VideoMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VideoView => write!(f, "VIDEO_VIEW"),
            Self::ViewerCount => write!(f, "VIEWER"),
            Self::TimeWatched => write!(f, "TIME_WATCHED"),
            Self::TimeWatchedForVideoViews => write!(f, "TIME_WATCHED_FOR_VIDEO_VIEWS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aggregation {
    All,
    Day,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Day => write!(f, "DAY"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnalyticsElement {
    pub value: u64,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default, rename = "type")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}

/// Epoch-millisecond bounds of an aggregation bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl LinkedInApi {
    /// Lifetime statistics of a share published by `company_urn`.
    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_share_statistics(
        &self,
        user: &UserAuthorization,
        company_urn: &str,
        share_urn: &str,
    ) -> Result<Collection<ShareStatisticsElement>> {
        self.get_json(
            user,
            "get share statistics",
            "/v2/organizationalEntityShareStatistics",
            &[
                ("q", "organizationalEntity"),
                ("organizationalEntity", company_urn),
                ("shares[0]", share_urn),
            ],
        )
        .await
    }

    /// Lifetime statistics of a UGC post published by `company_urn`.
    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_share_post_statistics(
        &self,
        user: &UserAuthorization,
        company_urn: &str,
        post_urn: &str,
    ) -> Result<Collection<ShareStatisticsElement>> {
        self.get_json(
            user,
            "get share post statistics",
            "/v2/organizationalEntityShareStatistics",
            &[
                ("q", "organizationalEntity"),
                ("organizationalEntity", company_urn),
                ("ugcPosts[0]", post_urn),
            ],
        )
        .await
    }

    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_video_statistics(
        &self,
        user: &UserAuthorization,
        video_post_urn: &str,
        metric: VideoMetric,
        aggregation: Aggregation,
    ) -> Result<Collection<VideoAnalyticsElement>> {
        let metric = metric.to_string();
        let aggregation = aggregation.to_string();
        let analytics: Collection<VideoAnalyticsElement> = self
            .get_json(
                user,
                "get video statistics",
                "/v2/videoAnalytics",
                &[
                    ("q", "entity"),
                    ("entity", video_post_urn),
                    ("type", &metric),
                    ("aggregation", &aggregation),
                ],
            )
            .await?;

        tracing::debug!(
            video_post_urn,
            buckets = analytics.elements.len(),
            "fetched video analytics"
        );
        Ok(analytics)
    }
}
