//! Edge-set generation honoring min/max degree and attribute affinity.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

use crate::model::{Graph, NodeId};
use crate::settings::Settings;

/// Chance that any two eligible nodes connect before affinity bonuses.
pub const BASE_CONNECTION_PROBABILITY: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopologyParams {
    pub min_connections: usize,
    pub max_connections: usize,
    pub city_affinity: f32,
    pub language_affinity: f32,
}

impl TopologyParams {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_connections: settings.min_connections,
            max_connections: settings.max_connections,
            city_affinity: settings.city_affinity,
            language_affinity: settings.language_affinity,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub minimum_pass_edges: usize,
    pub affinity_pass_edges: usize,
    /// Nodes left below `min_connections` because no eligible partner remained.
    pub under_connected: usize,
}

impl GenerationReport {
    pub fn total_edges(&self) -> usize {
        self.minimum_pass_edges + self.affinity_pass_edges
    }
}

/// Degree bookkeeping shared by both passes, updated as edges are created.
struct Builder<'g> {
    graph: &'g mut Graph,
    ids: Vec<NodeId>,
    degrees: Vec<usize>,
    pairs: HashSet<(usize, usize)>,
}

impl<'g> Builder<'g> {
    fn new(graph: &'g mut Graph) -> Self {
        let ids = graph.nodes().iter().map(|node| node.id).collect::<Vec<_>>();
        let degrees = vec![0; ids.len()];
        Self {
            graph,
            ids,
            degrees,
            pairs: HashSet::new(),
        }
    }

    fn connected(&self, a: usize, b: usize) -> bool {
        self.pairs.contains(&(a.min(b), a.max(b)))
    }

    fn link(&mut self, start: usize, end: usize) -> bool {
        if start == end || self.connected(start, end) {
            return false;
        }
        if self.graph.connect(self.ids[start], self.ids[end]).is_none() {
            return false;
        }
        self.pairs.insert((start.min(end), start.max(end)));
        self.degrees[start] += 1;
        self.degrees[end] += 1;
        true
    }
}

/// Discards every edge and rebuilds the set from scratch.
pub fn generate_edges<R: Rng + ?Sized>(
    graph: &mut Graph,
    params: TopologyParams,
    rng: &mut R,
) -> GenerationReport {
    graph.clear_edges();
    let mut builder = Builder::new(graph);
    let mut report = GenerationReport {
        minimum_pass_edges: minimum_degree_pass(&mut builder, params, rng),
        ..Default::default()
    };
    report.affinity_pass_edges = affinity_pass(&mut builder, params, rng);
    report.under_connected = builder
        .degrees
        .iter()
        .filter(|&&degree| degree < params.min_connections)
        .count();

    info!(
        nodes = builder.ids.len(),
        edges = report.total_edges(),
        under_connected = report.under_connected,
        "generated edges"
    );
    report
}

fn minimum_degree_pass<R: Rng + ?Sized>(
    builder: &mut Builder<'_>,
    params: TopologyParams,
    rng: &mut R,
) -> usize {
    let node_count = builder.ids.len();
    let max = params.max_connections;
    let min = params.min_connections;
    // Bounds the pass even when `min` is unreachable under `max`.
    let budget = node_count * node_count;
    let mut attempts = 0usize;
    let mut created = 0usize;

    'scan: loop {
        let mut progressed = false;

        for index in 0..node_count {
            let degree = builder.degrees[index];
            if degree >= min || degree >= max {
                continue;
            }
            if attempts >= budget {
                break 'scan;
            }
            attempts += 1;

            let eligible = (0..node_count)
                .filter(|&other| {
                    other != index
                        && builder.degrees[other] < max
                        && !builder.connected(index, other)
                })
                .collect::<Vec<_>>();
            let needy = eligible
                .iter()
                .copied()
                .filter(|&other| builder.degrees[other] < min)
                .collect::<Vec<_>>();
            let pool = if needy.is_empty() { &eligible } else { &needy };

            let Some(&target) = pool.choose(rng) else {
                continue;
            };
            if builder.link(index, target) {
                created += 1;
                progressed = true;
            }
        }

        if !progressed {
            break;
        }
    }

    created
}

fn affinity_pass<R: Rng + ?Sized>(
    builder: &mut Builder<'_>,
    params: TopologyParams,
    rng: &mut R,
) -> usize {
    let node_count = builder.ids.len();
    let max = params.max_connections;
    let mut created = 0usize;

    for a in 0..node_count {
        for b in (a + 1)..node_count {
            if builder.degrees[a] >= max || builder.degrees[b] >= max || builder.connected(a, b) {
                continue;
            }

            let probability =
                pair_probability(&*builder.graph, builder.ids[a], builder.ids[b], params);
            if rng.random::<f32>() < probability && builder.link(a, b) {
                created += 1;
            }
        }
    }

    created
}

fn pair_probability(graph: &Graph, a: NodeId, b: NodeId, params: TopologyParams) -> f32 {
    let (Some(node_a), Some(node_b)) = (graph.node(a), graph.node(b)) else {
        return 0.0;
    };

    let mut probability = BASE_CONNECTION_PROBABILITY;
    if node_a.shared_attribute(node_b, "city") {
        probability += params.city_affinity;
    }
    if node_a.shared_attribute(node_b, "language") {
        probability += params.language_affinity;
    }
    probability
}
