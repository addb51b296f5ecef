// src/models/outline.rs

//! Outline trees for a course pairing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::node::{ChildMap, Node, NodeKind, deserialize_child_map};

/// One side of a course pairing: the course node plus its section map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutlineTree {
    pub course_info: Arc<Node>,
    pub course_outline: ChildMap,
}

impl OutlineTree {
    pub fn new(course_info: Node, course_outline: ChildMap) -> Self {
        Self {
            course_info: Arc::new(course_info),
            course_outline,
        }
    }

    /// Visit every node in pre-order, course node first.
    pub fn walk(&self, mut visit: impl FnMut(&Node)) {
        fn descend(node: &Node, visit: &mut impl FnMut(&Node)) {
            visit(node);
            for child in node.child_nodes() {
                descend(child, visit);
            }
        }

        visit(&self.course_info);
        for section in self.course_outline.values() {
            descend(section, &mut visit);
        }
    }

    /// Count nodes by kind and approval state.
    pub fn stats(&self) -> OutlineStats {
        let mut stats = OutlineStats::default();
        self.walk(|node| {
            match node.kind() {
                NodeKind::CourseInfo => {}
                NodeKind::Section => stats.sections += 1,
                NodeKind::Subsection => stats.subsections += 1,
                NodeKind::Unit => {
                    stats.units += 1;
                    if node.units.is_some() {
                        stats.units_loaded += 1;
                    }
                }
                NodeKind::Content => stats.contents += 1,
            }
            if node.is_approved() {
                stats.approved += 1;
            }
            if node.is_approval_eligible() {
                stats.eligible += 1;
            }
        });
        stats
    }
}

/// Node counts for a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutlineStats {
    pub sections: usize,
    pub subsections: usize,
    pub units: usize,
    pub units_loaded: usize,
    pub contents: usize,
    pub approved: usize,
    pub eligible: usize,
}

/// Both sides of a loaded pairing. Local ids match across sides.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// Translated rerun, carries status and versions
    pub rerun: OutlineTree,
    /// Source-language base course
    pub base: OutlineTree,
}

/// Body of `GET <outline>/<rerun_id>`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutlineResponse {
    pub course_info: Node,
    pub base_course_info: Node,
    #[serde(default, deserialize_with = "deserialize_child_map")]
    pub course_outline: Option<ChildMap>,
    #[serde(default, deserialize_with = "deserialize_child_map")]
    pub base_course_outline: Option<ChildMap>,
}

impl From<OutlineResponse> for Outline {
    fn from(response: OutlineResponse) -> Self {
        Self {
            rerun: OutlineTree::new(
                response.course_info,
                response.course_outline.unwrap_or_default(),
            ),
            base: OutlineTree::new(
                response.base_course_info,
                response.base_course_outline.unwrap_or_default(),
            ),
        }
    }
}
