use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Attributes every node is expected to carry. Nodes may hold any other key too.
pub const RECOGNIZED_ATTRIBUTES: [&str; 3] = ["city", "language", "team"];

pub const DEFAULT_NODE_NAME: &str = "New Person";
pub const UNDEFINED_ATTRIBUTE: &str = "Undefined";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

pub type Attributes = BTreeMap<String, String>;

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub attributes: Attributes,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Held by a drag gesture: positioned directly, skipped by integration.
    pub pinned: bool,
    pub damping: f32,
}

impl Node {
    pub fn new(id: NodeId, name: String, attributes: Attributes, position: Vec3, damping: f32) -> Self {
        Self {
            id,
            name,
            attributes,
            position,
            velocity: Vec3::ZERO,
            pinned: false,
            damping,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Present and non-empty.
    pub fn shared_attribute(&self, other: &Node, key: &str) -> bool {
        match (self.attribute(key), other.attribute(key)) {
            (Some(a), Some(b)) => !a.is_empty() && a == b,
            _ => false,
        }
    }
}
