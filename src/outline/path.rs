// src/outline/path.rs

//! Addressing nodes inside an outline tree.
//!
//! A path is either the course node, which sits outside the section map, or
//! a prefix of local ids descending
//! `course_outline[section].children[subsection].children[unit].units[content]`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{ChildMap, Node, OutlineTree};

/// Section, subsection, unit, content.
pub const MAX_DEPTH: usize = 4;

/// Depth at which nodes are units.
pub const UNIT_DEPTH: usize = 3;

/// Which child collection a node at a given depth descends through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChildSlot {
    Children,
    Units,
}

impl ChildSlot {
    /// Slot holding the children of a node at `depth` (section = 1).
    pub(crate) fn below(depth: usize) -> Self {
        if depth >= UNIT_DEPTH {
            ChildSlot::Units
        } else {
            ChildSlot::Children
        }
    }

    pub(crate) fn get(self, node: &Node) -> Option<&ChildMap> {
        match self {
            ChildSlot::Children => node.children.as_ref(),
            ChildSlot::Units => node.units.as_ref(),
        }
    }

    pub(crate) fn get_mut(self, node: &mut Node) -> Option<&mut ChildMap> {
        match self {
            ChildSlot::Children => node.children.as_mut(),
            ChildSlot::Units => node.units.as_mut(),
        }
    }
}

/// Location of a node in an outline tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodePath {
    /// The course node itself
    CourseInfo,
    /// One to four local ids from the section down
    Outline(Vec<String>),
}

impl NodePath {
    pub fn course_info() -> Self {
        NodePath::CourseInfo
    }

    pub fn section(id: impl Into<String>) -> Self {
        NodePath::Outline(vec![id.into()])
    }

    /// Extend the path one level down.
    pub fn child(&self, id: impl Into<String>) -> Result<Self> {
        match self {
            NodePath::CourseInfo => Err(AppError::invalid_path(
                "the course node is not part of the section map",
            )),
            NodePath::Outline(ids) if ids.len() >= MAX_DEPTH => Err(AppError::invalid_path(
                format!("{self} is already at content depth"),
            )),
            NodePath::Outline(ids) => {
                let mut ids = ids.clone();
                ids.push(id.into());
                Ok(NodePath::Outline(ids))
            }
        }
    }

    /// Build a path from optional ids. The target is the deepest id given;
    /// a deeper id without its parent is rejected.
    pub fn from_ids(
        section: Option<&str>,
        subsection: Option<&str>,
        unit: Option<&str>,
        content: Option<&str>,
    ) -> Result<Self> {
        let parts = [section, subsection, unit, content];
        let depth = parts.iter().take_while(|p| p.is_some()).count();
        if depth == 0 {
            return Err(AppError::invalid_path("a section id is required"));
        }
        if parts[depth..].iter().any(Option::is_some) {
            return Err(AppError::invalid_path(format!(
                "identifier at level {} given without its parent",
                depth + 1
            )));
        }
        Ok(NodePath::Outline(
            parts[..depth]
                .iter()
                .flatten()
                .map(|id| id.to_string())
                .collect(),
        ))
    }

    /// Levels below the section map root; 0 for the course node.
    pub fn depth(&self) -> usize {
        match self {
            NodePath::CourseInfo => 0,
            NodePath::Outline(ids) => ids.len(),
        }
    }

    pub fn ids(&self) -> &[String] {
        match self {
            NodePath::CourseInfo => &[],
            NodePath::Outline(ids) => ids,
        }
    }

    pub fn is_course_info(&self) -> bool {
        matches!(self, NodePath::CourseInfo)
    }

    pub fn is_unit(&self) -> bool {
        self.depth() == UNIT_DEPTH
    }

    /// The enclosing node's path; sections have none.
    pub fn parent(&self) -> Option<Self> {
        match self {
            NodePath::Outline(ids) if ids.len() > 1 => {
                Some(NodePath::Outline(ids[..ids.len() - 1].to_vec()))
            }
            _ => None,
        }
    }

    /// `other` is this node or lies below it.
    pub fn contains(&self, other: &NodePath) -> bool {
        match (self, other) {
            (NodePath::CourseInfo, NodePath::CourseInfo) => true,
            (NodePath::Outline(mine), NodePath::Outline(theirs)) => theirs.starts_with(mine),
            _ => false,
        }
    }

    /// Find the node this path addresses.
    pub fn resolve<'a>(&self, tree: &'a OutlineTree) -> Option<&'a Arc<Node>> {
        let ids = match self {
            NodePath::CourseInfo => return Some(&tree.course_info),
            NodePath::Outline(ids) => ids,
        };

        let (first, rest) = ids.split_first()?;
        let mut node = tree.course_outline.get(first)?;
        for (level, id) in rest.iter().enumerate() {
            node = ChildSlot::below(level + 1).get(node)?.get(id)?;
        }
        Some(node)
    }

    /// Like [`NodePath::resolve`], failing with `NodeNotFound`.
    pub fn require<'a>(&self, tree: &'a OutlineTree) -> Result<&'a Arc<Node>> {
        self.resolve(tree).ok_or_else(|| AppError::not_found(self))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodePath::CourseInfo => f.write_str("course_info"),
            NodePath::Outline(ids) => f.write_str(&ids.join("/")),
        }
    }
}

impl FromStr for NodePath {
    type Err = AppError;

    /// Parses `course_info` or `section[/subsection[/unit[/content]]]`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().trim_matches('/');
        if s == "course_info" {
            return Ok(NodePath::CourseInfo);
        }
        let ids: Vec<&str> = s.split('/').collect();
        if ids.len() > MAX_DEPTH || ids.iter().any(|id| id.is_empty()) {
            return Err(AppError::invalid_path(format!("cannot parse '{s}'")));
        }
        let at = |i: usize| ids.get(i).copied();
        NodePath::from_ids(at(0), at(1), at(2), at(3))
    }
}
