//! LinkedIn ad targeting taxonomy: industries, job functions, geography, seniorities,
//! facets and audience counts.
//!
//! Every lookup is read-only and independent of the others, so callers may issue them
//! concurrently.

use crate::error::Result;
use crate::linkedin_api::client::{LinkedInApi, UserAuthorization};
use crate::linkedin_api::types::{Collection, Locale, MultiLocaleString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One entry of a targeting taxonomy (an industry, a country, a seniority, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetingEntity {
    #[serde(default, rename = "$URN")]
    pub urn: Option<String>,
    #[serde(default)]
    pub name: MultiLocaleString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingFacet {
    pub facet_name: String,
    #[serde(default, rename = "adTargetingFacetUrn")]
    pub urn: Option<String>,
    #[serde(default)]
    pub entity_types: Vec<String>,
    #[serde(default)]
    pub available_entity_finders: Vec<String>,
}

/// Estimated audience size for a targeting criteria expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceCount {
    pub total: u64,
    #[serde(default)]
    pub active: u64,
}

/// Parent a geographic lookup is narrowed by.
#[derive(Debug, Clone, Copy)]
enum GeoParent<'a> {
    CountryGroup(&'a str),
    Country(&'a str),
    States(&'a str),
}

impl<'a> GeoParent<'a> {
    fn finder(self) -> (&'static str, &'a str) {
        match self {
            Self::CountryGroup(urn) => ("countryGroup", urn),
            Self::Country(urn) => ("country", urn),
            Self::States(urn) => ("states", urn),
        }
    }
}

impl LinkedInApi {
    async fn list_taxonomy(
        &self,
        user: &UserAuthorization,
        operation: &'static str,
        path: &str,
        locale: &Locale,
        parent: Option<GeoParent<'_>>,
    ) -> Result<Collection<TargetingEntity>> {
        let mut query = vec![
            ("locale.language", locale.language.as_str()),
            ("locale.country", locale.country.as_str()),
        ];
        if let Some(parent) = parent {
            let (finder, urn) = parent.finder();
            query.push(("q", finder));
            query.push((finder, urn));
        }

        let entities: Collection<TargetingEntity> =
            self.get_json(user, operation, path, &query).await?;
        tracing::debug!(
            path,
            returned_items = entities.elements.len(),
            "fetched targeting taxonomy"
        );
        Ok(entities)
    }

    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_industries(
        &self,
        user: &UserAuthorization,
        locale: &Locale,
    ) -> Result<Collection<TargetingEntity>> {
        self.list_taxonomy(user, "get industries", "/v2/industries", locale, None)
            .await
    }

    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_job_functions(
        &self,
        user: &UserAuthorization,
        locale: &Locale,
    ) -> Result<Collection<TargetingEntity>> {
        self.list_taxonomy(user, "get job functions", "/v2/functions", locale, None)
            .await
    }

    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_country_groups(
        &self,
        user: &UserAuthorization,
        locale: &Locale,
    ) -> Result<Collection<TargetingEntity>> {
        self.list_taxonomy(user, "get country groups", "/v2/countryGroups", locale, None)
            .await
    }

    /// Countries belonging to a country group.
    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_countries(
        &self,
        user: &UserAuthorization,
        locale: &Locale,
        country_group_urn: &str,
    ) -> Result<Collection<TargetingEntity>> {
        self.list_taxonomy(
            user,
            "get countries",
            "/v2/countries",
            locale,
            Some(GeoParent::CountryGroup(country_group_urn)),
        )
        .await
    }

    /// States of a country.
    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_states(
        &self,
        user: &UserAuthorization,
        locale: &Locale,
        country_urn: &str,
    ) -> Result<Collection<TargetingEntity>> {
        self.list_taxonomy(
            user,
            "get states",
            "/v2/states",
            locale,
            Some(GeoParent::Country(country_urn)),
        )
        .await
    }

    /// Regions of a state.
    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_regions(
        &self,
        user: &UserAuthorization,
        locale: &Locale,
        state_urn: &str,
    ) -> Result<Collection<TargetingEntity>> {
        self.list_taxonomy(
            user,
            "get regions",
            "/v2/regions",
            locale,
            Some(GeoParent::States(state_urn)),
        )
        .await
    }

    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_seniorities(
        &self,
        user: &UserAuthorization,
        locale: &Locale,
    ) -> Result<Collection<TargetingEntity>> {
        self.list_taxonomy(user, "get seniorities", "/v2/seniorities", locale, None)
            .await
    }

    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_targeting_facets(
        &self,
        user: &UserAuthorization,
    ) -> Result<Collection<TargetingFacet>> {
        self.get_json(user, "get targeting facets", "/v2/adTargetingFacets", &[])
            .await
    }

    /// Audience size for a Rest.li targeting criteria expression.
    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_audience_counts(
        &self,
        user: &UserAuthorization,
        targeting_criteria: &str,
    ) -> Result<Collection<AudienceCount>> {
        self.get_json(
            user,
            "get audience counts",
            "/v2/audienceCounts",
            &[("q", "targetingCriteria"), ("target", targeting_criteria)],
        )
        .await
    }
}
