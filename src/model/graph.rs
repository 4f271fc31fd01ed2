use std::collections::{HashMap, HashSet};

use glam::Vec3;
use tracing::debug;

use super::edge::{Edge, EdgeId};
use super::node::{Attributes, Node, NodeId};

/// Nodes and edges of the editor. Node order is insertion order and stays stable across
/// removals, so anything derived from it (cluster indices, palette order) does not jump.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<NodeId, usize>,
    next_node_id: u64,
    next_edge_id: u64,
    node_revision: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Bumped whenever the node set or any node's name/attributes change.
    pub fn node_revision(&self) -> u64 {
        self.node_revision
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_by_id.contains_key(&id)
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.index_of(id).map(|index| &mut self.nodes[index])
    }

    pub fn add_node(
        &mut self,
        name: String,
        attributes: Attributes,
        position: Vec3,
        damping: f32,
    ) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        self.index_by_id.insert(id, self.nodes.len());
        self.nodes
            .push(Node::new(id, name, attributes, position, damping));
        self.node_revision = self.node_revision.wrapping_add(1);
        id
    }

    /// Removes the node and every incident edge. Returns the number of edges dropped, or
    /// `None` when the id is unknown.
    pub fn remove_node(&mut self, id: NodeId) -> Option<usize> {
        let index = self.index_of(id)?;
        self.nodes.remove(index);

        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        let dropped = before - self.edges.len();

        self.reindex();
        self.node_revision = self.node_revision.wrapping_add(1);
        debug!(node = %id, dropped_edges = dropped, "removed node");
        Some(dropped)
    }

    fn reindex(&mut self) {
        self.index_by_id.clear();
        for (index, node) in self.nodes.iter().enumerate() {
            self.index_by_id.insert(node.id, index);
        }
    }

    /// Sets `name` or any attribute. Returns false for an unknown node.
    pub fn update_property(&mut self, id: NodeId, property: &str, value: String) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };

        if property == "name" {
            node.name = value;
        } else {
            node.attributes.insert(property.to_owned(), value);
        }
        self.node_revision = self.node_revision.wrapping_add(1);
        true
    }

    /// True when an edge exists between the two nodes in either direction.
    pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.iter().any(|edge| edge.joins(a, b))
    }

    /// Creates `start -> end` unless it would be a self-loop, reference an unknown node, or
    /// duplicate an existing pair in either direction.
    pub fn connect(&mut self, start: NodeId, end: NodeId) -> Option<EdgeId> {
        if start == end || !self.contains(start) || !self.contains(end) {
            return None;
        }
        if self.are_connected(start, end) {
            return None;
        }

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.push(Edge { id, start, end });
        debug!(edge = %id, %start, %end, "connected nodes");
        Some(id)
    }

    pub fn clear_edges(&mut self) {
        self.edges.clear();
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|edge| edge.touches(id)).count()
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.start == id)
            .map(|edge| edge.end)
    }

    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.end == id)
            .map(|edge| edge.start)
    }

    pub fn outgoing_names(&self, id: NodeId) -> Vec<String> {
        self.outgoing(id)
            .filter_map(|target| self.node(target).map(|node| node.name.clone()))
            .collect()
    }

    pub fn incoming_names(&self, id: NodeId) -> Vec<String> {
        self.incoming(id)
            .filter_map(|source| self.node(source).map(|node| node.name.clone()))
            .collect()
    }

    /// Distinct values of `key` in first-seen node order. Nodes without the key are skipped.
    pub fn distinct_values(&self, key: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for node in &self.nodes {
            if let Some(value) = node.attribute(key)
                && seen.insert(value)
            {
                values.push(value.to_owned());
            }
        }
        values
    }

    /// Edges as index pairs into `nodes()`. Stale ids are skipped.
    pub fn edge_indices(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter_map(|edge| Some((self.index_of(edge.start)?, self.index_of(edge.end)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(city: &str) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("city".to_owned(), city.to_owned());
        attributes
    }

    fn graph_with(count: usize) -> (Graph, Vec<NodeId>) {
        let mut graph = Graph::new();
        let ids = (0..count)
            .map(|index| graph.add_node(format!("p{index}"), attrs("Oslo"), Vec3::ZERO, 0.9))
            .collect();
        (graph, ids)
    }

    #[test]
    fn connect_rejects_self_loops_and_duplicates() {
        let (mut graph, ids) = graph_with(2);

        assert!(graph.connect(ids[0], ids[0]).is_none());
        assert!(graph.connect(ids[0], ids[1]).is_some());
        assert!(graph.connect(ids[0], ids[1]).is_none());
        assert!(graph.connect(ids[1], ids[0]).is_none());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn connect_ignores_unknown_nodes() {
        let (mut graph, ids) = graph_with(1);
        assert!(graph.connect(ids[0], NodeId(999)).is_none());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn remove_node_cascades_only_incident_edges() {
        let (mut graph, ids) = graph_with(4);
        graph.connect(ids[0], ids[1]);
        graph.connect(ids[2], ids[0]);
        graph.connect(ids[2], ids[3]);

        assert_eq!(graph.remove_node(ids[0]), Some(2));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.are_connected(ids[2], ids[3]));
        assert!(!graph.contains(ids[0]));
        assert_eq!(graph.node(ids[3]).map(|node| node.name.as_str()), Some("p3"));
    }

    #[test]
    fn remove_unknown_node_is_noop() {
        let (mut graph, _ids) = graph_with(2);
        let revision = graph.node_revision();
        assert_eq!(graph.remove_node(NodeId(42)), None);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node_revision(), revision);
    }

    #[test]
    fn update_property_sets_name_or_attribute() {
        let (mut graph, ids) = graph_with(1);
        assert!(graph.update_property(ids[0], "name", "Alice".to_owned()));
        assert!(graph.update_property(ids[0], "team", "Core".to_owned()));
        assert!(!graph.update_property(NodeId(7), "team", "Core".to_owned()));

        let node = graph.node(ids[0]).expect("node exists");
        assert_eq!(node.name, "Alice");
        assert_eq!(node.attribute("team"), Some("Core"));
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let mut graph = Graph::new();
        for city in ["Rome", "Oslo", "Rome", "Lima"] {
            graph.add_node(city.to_owned(), attrs(city), Vec3::ZERO, 0.9);
        }
        graph.add_node("nobody".to_owned(), Attributes::new(), Vec3::ZERO, 0.9);

        assert_eq!(graph.distinct_values("city"), vec!["Rome", "Oslo", "Lima"]);
        assert!(graph.distinct_values("team").is_empty());
    }

    #[test]
    fn neighbor_names_follow_direction() {
        let (mut graph, ids) = graph_with(3);
        graph.connect(ids[0], ids[1]);
        graph.connect(ids[2], ids[0]);

        assert_eq!(graph.outgoing_names(ids[0]), vec!["p1"]);
        assert_eq!(graph.incoming_names(ids[0]), vec!["p2"]);
        assert_eq!(graph.degree(ids[0]), 2);
    }
}
