mod edge;
mod graph;
mod node;

pub use edge::{Edge, EdgeId};
pub use graph::Graph;
pub use node::{
    Attributes, DEFAULT_NODE_NAME, Node, NodeId, RECOGNIZED_ATTRIBUTES, UNDEFINED_ATTRIBUTE,
};
