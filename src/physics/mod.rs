//! Force-directed layout: pairwise repulsion, edge springs and cluster attraction,
//! integrated with semi-implicit Euler at a fixed time step.

mod forces;

use glam::Vec3;

use crate::cluster::ClusterCenters;
use crate::model::{Graph, Node};
use crate::settings::Settings;
use forces::{cluster_pull, repulsion_between, spring_between};

/// Fixed simulation step, independent of the actual frame time.
pub const TIME_STEP: f32 = 1.0 / 60.0;
/// Speed cap that keeps pathological settings from blowing the layout up.
pub const MAX_SPEED: f32 = 400.0;

const MIN_SLEEP_SPEED_SQ: f32 = 0.001 * 0.001;
const MIN_SLEEP_FORCE_SQ: f32 = 0.001 * 0.001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub repulsion_strength: f32,
    pub connection_length: f32,
    pub connection_stiffness: f32,
    pub cluster_attraction: f32,
}

impl PhysicsConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            repulsion_strength: finite_or(settings.repulsion_strength, 0.0),
            connection_length: finite_or(settings.connection_length, 0.0),
            connection_stiffness: finite_or(settings.connection_stiffness, 0.0),
            cluster_attraction: finite_or(settings.cluster_attraction, 0.0),
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Clustering input for one tick: which attribute to read and where its values pull.
#[derive(Clone, Copy, Debug)]
pub struct ClusterField<'a> {
    pub attribute: &'a str,
    pub centers: &'a ClusterCenters,
}

/// Buffers reused across ticks.
#[derive(Debug, Default)]
pub struct PhysicsScratch {
    forces: Vec<Vec3>,
    positions: Vec<Vec3>,
    targets: Vec<Option<Vec3>>,
    edges: Vec<(usize, usize)>,
}

/// Per-tick velocity multiplier for a node's damping coefficient: `(1 - damping)^dt`.
pub fn damping_factor(damping: f32) -> f32 {
    let retained = (1.0 - finite_or(damping, 0.0)).clamp(0.0, 1.0);
    retained.powf(TIME_STEP)
}

/// Advances every unpinned node by one `TIME_STEP`. Returns true while anything moves.
pub fn step_physics(
    graph: &mut Graph,
    cluster: Option<ClusterField<'_>>,
    config: PhysicsConfig,
    scratch: &mut PhysicsScratch,
) -> bool {
    let node_count = graph.node_count();
    if node_count == 0 {
        return false;
    }

    // Snapshot positions and edges first; forces read only the snapshot.
    scratch.edges = graph.edge_indices();
    scratch.positions.clear();
    scratch.positions.extend(graph.nodes().iter().map(|node| node.position));
    scratch.targets.clear();
    scratch
        .targets
        .extend(graph.nodes().iter().map(|node| cluster_target(node, cluster)));
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec3::ZERO);

    let positions = &scratch.positions;
    let forces = &mut scratch.forces;

    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let push = repulsion_between(positions[i], positions[j], i, j, config.repulsion_strength);
            forces[i] += push;
            forces[j] -= push;
        }
    }

    for &(start, end) in &scratch.edges {
        if start == end {
            continue;
        }
        let pull = spring_between(
            positions[start],
            positions[end],
            config.connection_length,
            config.connection_stiffness,
        );
        forces[end] += pull;
        forces[start] -= pull;
    }

    for (index, target) in scratch.targets.iter().enumerate() {
        if let Some(center) = target {
            forces[index] += cluster_pull(positions[index], *center, config.cluster_attraction);
        }
    }

    integrate(graph.nodes_mut(), forces)
}

fn cluster_target(node: &Node, cluster: Option<ClusterField<'_>>) -> Option<Vec3> {
    let cluster = cluster?;
    let value = node.attribute(cluster.attribute)?;
    cluster.centers.get(value)
}

fn integrate(nodes: &mut [Node], forces: &[Vec3]) -> bool {
    let max_speed_sq = MAX_SPEED * MAX_SPEED;
    let mut any_motion = false;

    for (node, force) in nodes.iter_mut().zip(forces) {
        if node.pinned {
            node.velocity = Vec3::ZERO;
            continue;
        }

        let force = if force.is_finite() { *force } else { Vec3::ZERO };
        // Unit mass: acceleration equals force.
        let mut velocity = (node.velocity + force * TIME_STEP) * damping_factor(node.damping);
        let speed_sq = velocity.length_squared();
        if speed_sq > max_speed_sq {
            velocity *= MAX_SPEED / speed_sq.sqrt();
        }
        if velocity.length_squared() < MIN_SLEEP_SPEED_SQ
            && force.length_squared() < MIN_SLEEP_FORCE_SQ
        {
            velocity = Vec3::ZERO;
        }

        let position = node.position + velocity * TIME_STEP;
        if !velocity.is_finite() || !position.is_finite() {
            node.velocity = Vec3::ZERO;
            continue;
        }

        node.velocity = velocity;
        node.position = position;
        if velocity != Vec3::ZERO {
            any_motion = true;
        }
    }

    any_motion
}
