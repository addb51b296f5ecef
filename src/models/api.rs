// src/models/api.rs

//! Request and response bodies of the translation API.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::node::{ChildMap, VersionId, deserialize_child_map};

/// Body of `GET <components>/<unit usage key>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitComponents {
    /// Rerun-side content of the unit
    #[serde(default, deserialize_with = "deserialize_child_map")]
    pub components_data: Option<ChildMap>,

    /// Base-side content of the unit
    #[serde(default, deserialize_with = "deserialize_child_map")]
    pub base_components_data: Option<ChildMap>,
}

/// Body of `GET <versions>/<version id>/`.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionPayload {
    #[serde(default)]
    pub block_id: Option<String>,

    #[serde(default)]
    pub date: Option<String>,

    /// Translated payload of that version
    pub data: Value,
}

/// Body of `PUT <approve>/`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApproveRequest {
    pub block_ids: Vec<String>,
}

/// Result of approving one block.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ApprovalEntry {
    #[serde(default)]
    pub approved: bool,

    /// Approved translation was written to the live block
    #[serde(default)]
    pub applied_translation: bool,

    #[serde(default)]
    pub applied_version: Option<VersionId>,

    #[serde(default)]
    pub applied_version_date: Option<String>,
}

/// Response of `PUT <approve>/`: usage key to approval result.
/// Keys missing from the map were not approved by that call.
pub type ApprovalPatch = HashMap<String, ApprovalEntry>;

/// Body of `PUT <apply>/<usage key>/`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApplyRequest {
    pub applied_version: VersionId,
}

/// Response of `PUT <apply>/<usage key>/`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppliedVersion {
    #[serde(default)]
    pub block_id: Option<String>,

    #[serde(default)]
    pub applied_translation: bool,

    pub applied_version: Option<VersionId>,
}

/// A course reference inside a pairing listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseRef {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub language: Option<String>,
}

/// A base course with its translated reruns, from `GET <pairings>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoursePairing {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub language: Option<String>,

    /// Reruns keyed by course id
    #[serde(default)]
    pub rerun: IndexMap<String, CourseRef>,
}

impl CoursePairing {
    /// Find a rerun by its course id.
    pub fn find_rerun(&self, rerun_id: &str) -> Option<&CourseRef> {
        self.rerun.get(rerun_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_approval_patch_from_server() {
        let raw = json!({
            "block-v1:r+type@html+block@a": {
                "block_id": "block-v1:r+type@html+block@a",
                "block_type": "html",
                "course_id": "course-v1:r",
                "approved": true,
                "applied_translation": true,
                "applied_version": 12,
                "applied_version_date": "Jun 10, 2022, 05:19 am"
            }
        });

        let patch: ApprovalPatch = serde_json::from_value(raw).unwrap();
        let entry = &patch["block-v1:r+type@html+block@a"];
        assert!(entry.approved);
        assert!(entry.applied_translation);
        assert_eq!(entry.applied_version, Some(12));
        assert_eq!(entry.applied_version_date.as_deref(), Some("Jun 10, 2022, 05:19 am"));
    }

    #[test]
    fn test_approve_request_body() {
        let body = serde_json::to_value(ApproveRequest {
            block_ids: vec!["a".into(), "b".into()],
        })
        .unwrap();
        assert_eq!(body, json!({"block_ids": ["a", "b"]}));
    }

    #[test]
    fn test_pairings_listing() {
        let raw = json!({
            "course-v1:org+cs101+run": {
                "id": "course-v1:org+cs101+run",
                "title": "Introduction To Computing",
                "language": "en",
                "rerun": {
                    "course-v1:org+cs101_ur+run": {
                        "id": "course-v1:org+cs101_ur+run",
                        "title": "Introduction To Computing (Urdu)",
                        "language": "ur"
                    }
                }
            }
        });

        let pairings: IndexMap<String, CoursePairing> = serde_json::from_value(raw).unwrap();
        let pairing = &pairings["course-v1:org+cs101+run"];
        assert_eq!(pairing.language.as_deref(), Some("en"));
        let rerun = pairing.find_rerun("course-v1:org+cs101_ur+run").unwrap();
        assert_eq!(rerun.language.as_deref(), Some("ur"));
    }
}
