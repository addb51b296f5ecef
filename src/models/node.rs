// src/models/node.rs

//! Outline node data structures.
//!
//! A node is one block of the course outline: the course itself, a section,
//! a subsection, a unit, or a content component. Sections, subsections and
//! units keep their children under `children`; units keep their content
//! components under `units`, which stays absent until the unit is expanded.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Server-assigned translation version identifier.
pub type VersionId = i64;

/// Child nodes keyed by local id, in server order.
pub type ChildMap = IndexMap<String, Arc<Node>>;

/// Structural role of a node in the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    CourseInfo,
    Section,
    Subsection,
    Unit,
    Content,
}

impl NodeKind {
    /// Derive the kind from a block category.
    pub fn from_category(category: &str) -> Self {
        match category {
            "course" => NodeKind::CourseInfo,
            "chapter" => NodeKind::Section,
            "sequential" => NodeKind::Subsection,
            "vertical" => NodeKind::Unit,
            _ => NodeKind::Content,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::CourseInfo => "course",
            NodeKind::Section => "section",
            NodeKind::Subsection => "subsection",
            NodeKind::Unit => "unit",
            NodeKind::Content => "content",
        }
    }
}

/// A block of the course outline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Opaque block identifier, unique within a tree
    pub usage_key: String,

    /// Block category (e.g. "chapter", "vertical", "html")
    #[serde(default)]
    pub category: String,

    /// Currently displayed payload (display name, content, ...)
    #[serde(default)]
    pub data: Value,

    /// Payload saved while a historical version is being previewed
    #[serde(skip)]
    pub previous_state: Option<Value>,

    /// Translation status, absent on base-course nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Version history, absent on base-course nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_status: Option<VersionStatus>,

    /// Links to the translation platform pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,

    /// Sections, subsections or units below this node
    #[serde(
        default,
        deserialize_with = "deserialize_child_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub children: Option<ChildMap>,

    /// Content components of a unit, filled in on first expansion
    #[serde(
        default,
        deserialize_with = "deserialize_child_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub units: Option<ChildMap>,
}

impl Node {
    /// Create a bare node with an empty payload.
    pub fn new(usage_key: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            usage_key: usage_key.into(),
            category: category.into(),
            data: Value::Object(Default::default()),
            previous_state: None,
            status: None,
            version_status: None,
            links: None,
            children: None,
            units: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_category(&self.category)
    }

    /// Display name from the payload, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.data.get("display_name").and_then(Value::as_str)
    }

    pub fn is_approved(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.approved)
    }

    /// Translation complete, destination allows publishing, not approved yet.
    pub fn is_approval_eligible(&self) -> bool {
        self.status.as_ref().is_some_and(Status::is_approval_eligible)
    }

    /// A version preview is active.
    pub fn is_previewing(&self) -> bool {
        self.previous_state.is_some()
    }

    /// Whichever child collection this node carries, `children` first.
    pub fn child_map(&self) -> Option<&ChildMap> {
        self.children.as_ref().or(self.units.as_ref())
    }

    /// Child nodes in server order; empty for leaves and unfetched units.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.child_map().into_iter().flat_map(|map| map.values())
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none() && self.units.is_none()
    }
}

/// Per-node translation status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    #[serde(default)]
    pub approved: bool,

    /// Block belongs to the translated (destination) side
    #[serde(default)]
    pub destination_flag: bool,

    #[serde(default)]
    pub is_fully_translated: bool,

    /// A translation is applied to the live block
    #[serde(default)]
    pub applied: bool,

    /// Content was split into parsed keys before translation
    #[serde(default)]
    pub parsed_block: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fetched: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
}

impl Status {
    pub fn is_approval_eligible(&self) -> bool {
        !self.approved && self.destination_flag && self.is_fully_translated
    }
}

/// Version history of a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionStatus {
    #[serde(default)]
    pub applied: bool,

    #[serde(default)]
    pub applied_version: Option<VersionId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<VersionId>,

    /// Oldest first, as returned by the server
    #[serde(default)]
    pub versions: Vec<Version>,
}

impl VersionStatus {
    pub fn contains(&self, id: VersionId) -> bool {
        self.versions.iter().any(|v| v.id == id)
    }

    /// The version currently applied to the live block.
    pub fn applied_entry(&self) -> Option<&Version> {
        if !self.applied {
            return None;
        }
        let id = self.applied_version?;
        self.versions.iter().find(|v| v.id == id)
    }

    /// `applied_version` is either unset or listed in `versions`.
    pub fn is_consistent(&self) -> bool {
        self.applied_version.is_none_or(|id| self.contains(id))
    }
}

/// A translation version entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub id: VersionId,

    /// Formatted creation date; absent for the pending sentinel
    #[serde(default)]
    pub date: Option<String>,
}

impl Version {
    pub fn new(id: VersionId, date: impl Into<String>) -> Self {
        Self {
            id,
            date: Some(date.into()),
        }
    }
}

/// Translation platform links for a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_group_url: Option<String>,
}

/// Accepts a keyed object, an empty list (sent for the course node) or null.
pub(crate) fn deserialize_child_map<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<ChildMap>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Map(ChildMap),
        List(Vec<Value>),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::Map(map)) => Ok(Some(map)),
        Some(Repr::List(items)) if items.is_empty() => Ok(Some(ChildMap::new())),
        Some(Repr::List(_)) => Err(serde::de::Error::custom(
            "child collection must be an object keyed by local id",
        )),
        None => Ok(None),
    }
}
