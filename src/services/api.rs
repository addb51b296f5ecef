// src/services/api.rs

//! Typed endpoints of the translation API.

use indexmap::IndexMap;
use url::Url;

use crate::error::Result;
use crate::models::{
    ApiConfig, AppliedVersion, ApplyRequest, ApprovalPatch, ApproveRequest, CoursePairing,
    OutlineResponse, UnitComponents, VersionId, VersionPayload,
};
use crate::services::http::HttpClient;
use crate::utils::{endpoint_url, parse_base_url};

/// Translation API bound to one server.
#[derive(Debug, Clone)]
pub struct TranslationApi<C> {
    client: C,
    base: Url,
    config: ApiConfig,
}

impl<C: HttpClient> TranslationApi<C> {
    pub fn new(client: C, config: ApiConfig) -> Result<Self> {
        let base = parse_base_url(&config.base_url)?;
        Ok(Self {
            client,
            base,
            config,
        })
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// `GET <outline>/<rerun id>`: both outline trees of a pairing.
    pub async fn outline(&self, rerun_id: &str) -> Result<OutlineResponse> {
        let url = endpoint_url(&self.base, &self.config.outline_path, &[rerun_id], false)?;
        self.client.get(url.as_str()).await?.json()
    }

    /// `GET <components>/<unit usage key>`: content of one unit, both sides.
    pub async fn unit_components(&self, usage_key: &str) -> Result<UnitComponents> {
        let url = endpoint_url(&self.base, &self.config.components_path, &[usage_key], false)?;
        self.client.get(url.as_str()).await?.json()
    }

    /// `GET <versions>/<id>/`: payload of a historical version.
    pub async fn version(&self, version: VersionId) -> Result<VersionPayload> {
        let id = version.to_string();
        let url = endpoint_url(&self.base, &self.config.version_path, &[&id], true)?;
        self.client.get(url.as_str()).await?.json()
    }

    /// `PUT <approve>/` with `{block_ids}`.
    pub async fn approve(&self, block_ids: &[String]) -> Result<ApprovalPatch> {
        let url = endpoint_url(&self.base, &self.config.approve_path, &[], true)?;
        let body = serde_json::to_value(ApproveRequest {
            block_ids: block_ids.to_vec(),
        })?;
        self.client.put(url.as_str(), &body).await?.json()
    }

    /// `PUT <apply>/<usage key>/` with `{applied_version}`.
    pub async fn apply_version(
        &self,
        usage_key: &str,
        version: VersionId,
    ) -> Result<AppliedVersion> {
        let url = endpoint_url(&self.base, &self.config.apply_path, &[usage_key], true)?;
        let body = serde_json::to_value(ApplyRequest {
            applied_version: version,
        })?;
        self.client.put(url.as_str(), &body).await?.json()
    }

    /// `GET <pairings>`: base courses with their translated reruns.
    pub async fn course_pairings(&self) -> Result<Vec<CoursePairing>> {
        let url = endpoint_url(&self.base, &self.config.pairings_path, &[], false)?;
        let pairings: IndexMap<String, CoursePairing> = self.client.get(url.as_str()).await?.json()?;
        Ok(pairings.into_values().collect())
    }
}
