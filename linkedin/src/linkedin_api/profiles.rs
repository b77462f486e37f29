//! LinkedIn Profiles API types and functionality.

use crate::error::{Error, Result};
use crate::linkedin_api::client::{LinkedInApi, UserAuthorization};
use crate::linkedin_api::types::MultiLocaleString;
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// A member profile.
///
/// This is the lite projection: names, headline and vanity name.
///
/// See: <https://learn.microsoft.com/linkedin/shared/integrations/people/profile-api>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub localized_first_name: Option<String>,
    #[serde(default)]
    pub localized_last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<MultiLocaleString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<MultiLocaleString>,
    #[serde(default)]
    pub localized_headline: Option<String>,
    #[serde(default)]
    pub vanity_name: Option<String>,
}

impl Person {
    pub fn urn(&self) -> String {
        format!("urn:li:person:{}", self.id)
    }

    pub fn display_name(&self) -> String {
        [&self.localized_first_name, &self.localized_last_name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Response of a batch get: profiles keyed by their Rest.li key, e.g. `(id:abc)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonList {
    #[serde(default)]
    pub results: BTreeMap<String, Person>,
    #[serde(default)]
    pub errors: BTreeMap<String, serde_json::Value>,
}

/// Size of a member's first-degree network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeSize {
    pub first_degree_size: u64,
}

/// Member ids are spliced into Rest.li paths and keys, so only `[A-Za-z0-9_-]` is allowed.
fn member_id<'a>(operation: &'static str, id: &'a str) -> Result<&'a str> {
    if !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        Ok(id)
    } else {
        Err(Error::InvalidArgument {
            operation,
            reason: format!("{id:?} is not a member id"),
        })
    }
}

impl LinkedInApi {
    /// Gets the profile of the authenticated member.
    ///
    /// `accept_languages` is sent as `Accept-Language`, in order of preference.
    #[instrument(skip(self, user), ret, level = tracing::Level::DEBUG)]
    pub async fn get_my_profile(
        &self,
        user: &UserAuthorization,
        accept_languages: &[String],
    ) -> Result<Person> {
        const OPERATION: &str = "get my profile";
        let mut request = self.authenticated(user, Method::GET, "/v2/me")?;
        if !accept_languages.is_empty() {
            request = request.header(http::header::ACCEPT_LANGUAGE, accept_languages.join(", "));
        }
        let response = self.execute(OPERATION, request).await?;
        let person: Person = self.read_json(OPERATION, response).await?;

        tracing::debug!(person_id = %person.id, "fetched own profile");
        Ok(person)
    }

    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_profile(&self, user: &UserAuthorization, profile_id: &str) -> Result<Person> {
        const OPERATION: &str = "get profile";
        let path = format!("/v2/people/(id:{})", member_id(OPERATION, profile_id)?);
        self.get_json(user, OPERATION, &path, &[]).await
    }

    /// Batch-gets several profiles in one call.
    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_profiles_by_ids(
        &self,
        user: &UserAuthorization,
        profile_ids: &[&str],
    ) -> Result<PersonList> {
        const OPERATION: &str = "get profiles by ids";
        let keys = profile_ids
            .iter()
            .map(|id| -> Result<String> {
                Ok(format!("(id:{})", member_id(OPERATION, id)?))
            })
            .collect::<Result<Vec<_>>>()?;
        let ids = format!("List({})", keys.join(","));
        let people: PersonList = self
            .get_json(user, OPERATION, "/v2/people", &[("ids", &ids)])
            .await?;

        tracing::debug!(
            requested = profile_ids.len(),
            returned = people.results.len(),
            "fetched profiles"
        );
        Ok(people)
    }

    #[instrument(skip(self, user), level = tracing::Level::DEBUG)]
    pub async fn get_first_degree_connections(
        &self,
        user: &UserAuthorization,
        profile_id: &str,
    ) -> Result<DegreeSize> {
        const OPERATION: &str = "get first degree connections";
        let path = format!(
            "/v2/connections/urn:li:person:{}",
            member_id(OPERATION, profile_id)?
        );
        self.get_json(user, OPERATION, &path, &[]).await
    }
}
