// src/testing.rs

//! Shared fixtures for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{ChildMap, Node, Outline, OutlineResponse, OutlineTree, Status};
use crate::services::{ApiResponse, HttpClient, Method};

/// Unapproved, fully translated destination block.
pub fn eligible_status() -> Status {
    Status {
        approved: false,
        destination_flag: true,
        is_fully_translated: true,
        ..Status::default()
    }
}

fn approved_status() -> Status {
    Status {
        approved: true,
        ..eligible_status()
    }
}

pub fn node_with(
    usage_key: &str,
    category: &str,
    status: Option<Status>,
    children: Option<IndexMap<String, Node>>,
    units: Option<IndexMap<String, Node>>,
) -> Node {
    let share = |map: IndexMap<String, Node>| -> ChildMap {
        map.into_iter()
            .map(|(id, node)| (id, Arc::new(node)))
            .collect()
    };
    let mut node = Node::new(usage_key, category);
    node.data = json!({ "display_name": usage_key });
    node.status = status;
    node.children = children.map(share);
    node.units = units.map(share);
    node
}

fn map(entries: Vec<(&str, Node)>) -> IndexMap<String, Node> {
    entries
        .into_iter()
        .map(|(id, node)| (id.to_string(), node))
        .collect()
}

/// Build one side of the sample pairing.
///
/// ```text
/// S1 chapter-1           eligible
///   Q1 seq-1             destination_flag off
///     U1 vert-1          eligible
///       C1 html-1        eligible
///       C2 problem-1     approved
///     U2 vert-2          eligible, units not fetched
/// S2 chapter-2           approved
///   Q2 seq-2             approved
/// ```
///
/// With `with_status` false every status is dropped, as on the base side.
fn build_side(prefix: &str, course_key: &str, with_status: bool) -> (Node, IndexMap<String, Node>) {
    let status = |s: Status| with_status.then_some(s);
    let key = |name: &str| format!("{prefix}-{name}");
    let blocked = Status {
        destination_flag: false,
        ..eligible_status()
    };

    let unit_1 = node_with(
        &key("vert-1"),
        "vertical",
        status(eligible_status()),
        None,
        Some(map(vec![
            ("C1", node_with(&key("html-1"), "html", status(eligible_status()), None, None)),
            ("C2", node_with(&key("problem-1"), "problem", status(approved_status()), None, None)),
        ])),
    );
    let unit_2 = node_with(&key("vert-2"), "vertical", status(eligible_status()), None, None);
    let subsection_1 = node_with(
        &key("seq-1"),
        "sequential",
        status(blocked),
        Some(map(vec![("U1", unit_1), ("U2", unit_2)])),
        None,
    );
    let section_1 = node_with(
        &key("chapter-1"),
        "chapter",
        status(eligible_status()),
        Some(map(vec![("Q1", subsection_1)])),
        None,
    );

    let subsection_2 = node_with(
        &key("seq-2"),
        "sequential",
        status(approved_status()),
        Some(IndexMap::new()),
        None,
    );
    let section_2 = node_with(
        &key("chapter-2"),
        "chapter",
        status(approved_status()),
        Some(map(vec![("Q2", subsection_2)])),
        None,
    );

    let course = node_with(
        course_key,
        "course",
        status(eligible_status()),
        Some(IndexMap::new()),
        None,
    );
    (course, map(vec![("S1", section_1), ("S2", section_2)]))
}

fn to_tree((course, sections): (Node, IndexMap<String, Node>)) -> OutlineTree {
    OutlineTree::new(
        course,
        sections
            .into_iter()
            .map(|(id, node)| (id, Arc::new(node)))
            .collect(),
    )
}

/// Rerun side of the sample pairing.
pub fn sample_tree() -> OutlineTree {
    to_tree(build_side("r", "course-v1:rerun", true))
}

/// Both sides of the sample pairing.
pub fn sample_outline() -> Outline {
    Outline {
        rerun: sample_tree(),
        base: to_tree(build_side("b", "course-v1:base", false)),
    }
}

/// The sample pairing as the outline endpoint returns it.
pub fn sample_response() -> OutlineResponse {
    let (course_info, course_outline) = build_side("r", "course-v1:rerun", true);
    let (base_course_info, base_course_outline) = build_side("b", "course-v1:base", false);
    let share = |map: IndexMap<String, Node>| -> ChildMap {
        map.into_iter()
            .map(|(id, node)| (id, Arc::new(node)))
            .collect()
    };
    OutlineResponse {
        course_info,
        base_course_info,
        course_outline: Some(share(course_outline)),
        base_course_outline: Some(share(base_course_outline)),
    }
}

/// JSON body of the sample outline, for client-level tests.
pub fn sample_response_json() -> Value {
    let outline = sample_outline();
    json!({
        "course_info": outline.rerun.course_info,
        "base_course_info": outline.base.course_info,
        "course_outline": outline.rerun.course_outline,
        "base_course_outline": outline.base.course_outline,
    })
}

/// A canned reply.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: Value,
    pub delay: Duration,
}

/// Request seen by [`MockClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct MockState {
    routes: HashMap<(Method, String), VecDeque<MockReply>>,
    requests: Vec<RecordedRequest>,
}

/// In-memory `HttpClient` keyed by method and URL path.
///
/// Each route replays its replies in order and repeats the last one.
/// Unknown routes answer 404.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.on_delayed(method, path, status, body, Duration::ZERO)
    }

    pub fn on_delayed(
        self,
        method: Method,
        path: &str,
        status: u16,
        body: Value,
        delay: Duration,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(MockReply {
                status,
                body,
                delay,
            });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    fn next_reply(&self, method: Method, path: &str) -> Option<MockReply> {
        let mut state = self.state.lock().unwrap();
        let queue = state.routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn request(&self, method: Method, url: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let path = url::Url::parse(url)?.path().to_string();
        self.state.lock().unwrap().requests.push(RecordedRequest {
            method,
            path: path.clone(),
            body: body.cloned(),
        });

        let reply = self.next_reply(method, &path).unwrap_or(MockReply {
            status: 404,
            body: json!({"detail": "Not found."}),
            delay: Duration::ZERO,
        });
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        if !(200..300).contains(&reply.status) {
            return Err(AppError::transport(url, reply.status, reply.body.to_string()));
        }
        Ok(ApiResponse {
            status: reply.status,
            data: reply.body,
        })
    }
}
