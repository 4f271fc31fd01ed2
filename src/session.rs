//! The editor's command surface. A `Session` owns the graph, the settings, the gesture
//! state and the random source; every mutation goes through it between ticks.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::cluster::{ClusterCache, ClusterCenters};
use crate::dataset::NodeSpec;
use crate::interaction::{Effect, Gesture, InteractionState};
use crate::model::{
    Attributes, Edge, EdgeId, Graph, Node, NodeId, DEFAULT_NODE_NAME, RECOGNIZED_ATTRIBUTES,
    UNDEFINED_ATTRIBUTE,
};
use crate::palette::{PropertyColors, Rgb};
use crate::physics::{ClusterField, PhysicsConfig, PhysicsScratch, step_physics};
use crate::settings::{Settings, SettingsPatch};
use crate::topology::{GenerationReport, TopologyParams, generate_edges};

/// Side length of the cube new nodes are scattered in, centered on the origin.
pub const SPAWN_EXTENT: f32 = 40.0;

/// Parses an attribute selector where `"none"` (or blank) turns the feature off.
pub fn attribute_choice(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Discrete mutation requests, queued by a front end and applied between ticks.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    AddNode { name: String, attributes: Attributes },
    RemoveSelectedNode,
    UpdateNodeProperty { node: NodeId, property: String, value: String },
    RegenerateEdges,
    UpdateSettings(SettingsPatch),
    SetClusterBy(Option<String>),
    SetColorBy(Option<String>),
    UpdatePropertyColor { attribute: String, value: String, color: String },
    ToggleConnectionMode,
    NodeClick(Option<NodeId>),
    SelectNode(Option<NodeId>),
    BeginDrag(NodeId),
    DragTo(NodeId, Vec3),
    EndDrag(NodeId),
    SetPhysicsEnabled(bool),
}

/// How an edge relates to the current selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRole {
    Plain,
    Outgoing,
    Incoming,
}

pub struct Session {
    graph: Graph,
    settings: Settings,
    interaction: InteractionState,
    cluster_by: Option<String>,
    color_by: Option<String>,
    colors: PropertyColors,
    physics_enabled: bool,
    rng: StdRng,
    cluster_cache: ClusterCache,
    scratch: PhysicsScratch,
    ticks: u64,
}

impl Session {
    pub fn new(settings: Settings, rng: StdRng) -> Self {
        Self {
            graph: Graph::new(),
            settings,
            interaction: InteractionState::default(),
            cluster_by: Some("team".to_owned()),
            color_by: Some("city".to_owned()),
            colors: PropertyColors::default(),
            physics_enabled: true,
            rng,
            cluster_cache: ClusterCache::default(),
            scratch: PhysicsScratch::default(),
            ticks: 0,
        }
    }

    /// Deterministic when `seed` is given, OS-seeded otherwise.
    pub fn seeded(settings: Settings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(settings, rng)
    }

    /// Adds the given nodes at random positions and generates the initial edge set.
    pub fn populate(&mut self, specs: impl IntoIterator<Item = NodeSpec>) -> GenerationReport {
        for spec in specs {
            let position = self.spawn_position();
            self.graph
                .add_node(spec.name, spec.properties, position, self.settings.damping);
        }
        self.colors.refresh(&self.graph);
        info!(nodes = self.graph.node_count(), "populated graph");
        self.regenerate_edges()
    }

    fn spawn_position(&mut self) -> Vec3 {
        let half = SPAWN_EXTENT * 0.5;
        Vec3::new(
            self.rng.random_range(-half..half),
            self.rng.random_range(-half..half),
            self.rng.random_range(-half..half),
        )
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.interaction
            .selected()
            .and_then(|id| self.graph.node(id))
    }

    pub fn cluster_by(&self) -> Option<&str> {
        self.cluster_by.as_deref()
    }

    pub fn color_by(&self) -> Option<&str> {
        self.color_by.as_deref()
    }

    pub fn colors(&self) -> &PropertyColors {
        &self.colors
    }

    pub fn physics_enabled(&self) -> bool {
        self.physics_enabled
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Creates a node at a random position and selects it. Blank names and missing
    /// recognized attributes get placeholders.
    pub fn add_node(&mut self, name: &str, mut attributes: Attributes) -> NodeId {
        let name = if name.trim().is_empty() {
            DEFAULT_NODE_NAME.to_owned()
        } else {
            name.to_owned()
        };
        for key in RECOGNIZED_ATTRIBUTES {
            attributes
                .entry(key.to_owned())
                .or_insert_with(|| UNDEFINED_ATTRIBUTE.to_owned());
        }

        let position = self.spawn_position();
        let id = self
            .graph
            .add_node(name, attributes, position, self.settings.damping);
        self.interaction.select(Some(id));
        self.colors.refresh(&self.graph);
        debug!(node = %id, "added node");
        id
    }

    /// Deletes the selected node and its edges. Returns the number of edges dropped.
    pub fn remove_selected_node(&mut self) -> Option<usize> {
        let id = self.interaction.selected()?;
        self.remove_node(id)
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<usize> {
        let Some(dropped) = self.graph.remove_node(id) else {
            warn!(node = %id, "ignored removal of unknown node");
            return None;
        };
        self.interaction.forget(id);
        self.colors.refresh(&self.graph);
        Some(dropped)
    }

    pub fn update_node_property(&mut self, id: NodeId, property: &str, value: &str) {
        if self.graph.update_property(id, property, value.to_owned()) {
            self.colors.refresh(&self.graph);
        } else {
            warn!(node = %id, property, "ignored property update for unknown node");
        }
    }

    pub fn regenerate_edges(&mut self) -> GenerationReport {
        let params = TopologyParams::from_settings(&self.settings);
        generate_edges(&mut self.graph, params, &mut self.rng)
    }

    /// Merges the patch. A damping change is written into every node at once.
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        self.settings.apply(patch);
        if let Some(damping) = patch.damping {
            for node in self.graph.nodes_mut() {
                node.damping = damping;
            }
        }
        debug!(?patch, "updated settings");
    }

    pub fn set_cluster_by(&mut self, attribute: Option<String>) {
        self.cluster_by = attribute;
    }

    pub fn set_color_by(&mut self, attribute: Option<String>) {
        self.color_by = attribute;
    }

    /// Returns false when `color` is not a `#rrggbb` hex string.
    pub fn update_property_color(&mut self, attribute: &str, value: &str, color: &str) -> bool {
        let Some(color) = Rgb::from_hex(color) else {
            warn!(attribute, value, color, "ignored unparsable color");
            return false;
        };
        self.colors.set_override(attribute, value, color);
        true
    }

    pub fn node_color(&self, node: &Node) -> Rgb {
        let color_by = self.color_by.as_deref();
        let value = color_by.and_then(|key| node.attribute(key));
        self.colors.color_for(color_by, value)
    }

    pub fn toggle_connection_mode(&mut self) {
        self.gesture(Gesture::ToggleConnectMode);
    }

    /// Click on a node or, for `None`, on empty space. Returns the edge a completed
    /// connect gesture created.
    pub fn handle_node_click(&mut self, node: Option<NodeId>) -> Option<EdgeId> {
        if let Some(id) = node
            && !self.graph.contains(id)
        {
            warn!(node = %id, "ignored click on unknown node");
            return None;
        }
        self.gesture(Gesture::Click(node))
    }

    pub fn select_node(&mut self, node: Option<NodeId>) {
        match node {
            Some(id) if !self.graph.contains(id) => {
                warn!(node = %id, "ignored selection of unknown node");
            }
            _ => self.interaction.select(node),
        }
    }

    pub fn begin_drag(&mut self, id: NodeId) {
        if self.graph.contains(id) {
            self.gesture(Gesture::DragStart(id));
        }
    }

    pub fn drag_to(&mut self, id: NodeId, position: Vec3) {
        if position.is_finite() {
            self.gesture(Gesture::DragMove(id, position));
        }
    }

    pub fn end_drag(&mut self, id: NodeId) {
        self.gesture(Gesture::DragEnd(id));
    }

    fn gesture(&mut self, gesture: Gesture) -> Option<EdgeId> {
        let mut created = None;
        for effect in self.interaction.apply(gesture) {
            match effect {
                Effect::CreateEdge { start, end } => {
                    created = self.graph.connect(start, end);
                    if created.is_none() {
                        debug!(%start, %end, "connect gesture produced no new edge");
                    }
                }
                Effect::Pin(id) => {
                    if let Some(node) = self.graph.node_mut(id) {
                        node.pinned = true;
                        node.velocity = Vec3::ZERO;
                    }
                }
                Effect::MoveNode(id, position) => {
                    if let Some(node) = self.graph.node_mut(id) {
                        node.position = position;
                        node.velocity = Vec3::ZERO;
                    }
                }
                Effect::Unpin(id) => {
                    if let Some(node) = self.graph.node_mut(id) {
                        node.pinned = false;
                    }
                }
            }
        }
        created
    }

    pub fn set_physics_enabled(&mut self, enabled: bool) {
        self.physics_enabled = enabled;
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::AddNode { name, attributes } => {
                self.add_node(&name, attributes);
            }
            Command::RemoveSelectedNode => {
                self.remove_selected_node();
            }
            Command::UpdateNodeProperty {
                node,
                property,
                value,
            } => self.update_node_property(node, &property, &value),
            Command::RegenerateEdges => {
                self.regenerate_edges();
            }
            Command::UpdateSettings(patch) => self.update_settings(&patch),
            Command::SetClusterBy(attribute) => self.set_cluster_by(attribute),
            Command::SetColorBy(attribute) => self.set_color_by(attribute),
            Command::UpdatePropertyColor {
                attribute,
                value,
                color,
            } => {
                self.update_property_color(&attribute, &value, &color);
            }
            Command::ToggleConnectionMode => self.toggle_connection_mode(),
            Command::NodeClick(node) => {
                self.handle_node_click(node);
            }
            Command::SelectNode(node) => self.select_node(node),
            Command::BeginDrag(id) => self.begin_drag(id),
            Command::DragTo(id, position) => self.drag_to(id, position),
            Command::EndDrag(id) => self.end_drag(id),
            Command::SetPhysicsEnabled(enabled) => self.set_physics_enabled(enabled),
        }
    }

    /// Current cluster targets; empty when clustering is off.
    pub fn cluster_centers(&mut self) -> &ClusterCenters {
        self.cluster_cache.centers(
            &self.graph,
            self.cluster_by.as_deref(),
            self.settings.cluster_layout,
            self.settings.cluster_radius,
        )
    }

    /// One fixed-step simulation tick. Returns true while the layout is still moving.
    /// With physics disabled nothing moves and this returns false.
    pub fn tick(&mut self) -> bool {
        if !self.physics_enabled {
            return false;
        }

        let config = PhysicsConfig::from_settings(&self.settings);
        let centers = self.cluster_cache.centers(
            &self.graph,
            self.cluster_by.as_deref(),
            self.settings.cluster_layout,
            self.settings.cluster_radius,
        );
        let cluster = self.cluster_by.as_deref().map(|attribute| ClusterField {
            attribute,
            centers,
        });

        let moving = step_physics(&mut self.graph, cluster, config, &mut self.scratch);
        self.ticks += 1;
        trace!(tick = self.ticks, moving, "physics tick");
        moving
    }

    pub fn edge_role(&self, edge: &Edge) -> EdgeRole {
        match self.interaction.selected() {
            Some(selected) if edge.start == selected => EdgeRole::Outgoing,
            Some(selected) if edge.end == selected => EdgeRole::Incoming,
            _ => EdgeRole::Plain,
        }
    }
}
