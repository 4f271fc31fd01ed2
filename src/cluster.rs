use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::model::Graph;
use crate::settings::ClusterLayout;

/// Attraction target per distinct value of the clustering attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterCenters {
    centers: Vec<(String, Vec3)>,
}

impl ClusterCenters {
    /// One center per value, indexed by the order of `values`.
    pub fn compute(values: &[String], layout: ClusterLayout, radius: f32) -> Self {
        let count = values.len();
        let centers = values
            .iter()
            .enumerate()
            .map(|(index, value)| (value.clone(), center_for(index, count, layout, radius)))
            .collect();
        Self { centers }
    }

    pub fn for_graph(graph: &Graph, attribute: &str, layout: ClusterLayout, radius: f32) -> Self {
        Self::compute(&graph.distinct_values(attribute), layout, radius)
    }

    pub fn get(&self, value: &str) -> Option<Vec3> {
        self.centers
            .iter()
            .find(|(key, _)| key == value)
            .map(|(_, center)| *center)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec3)> {
        self.centers
            .iter()
            .map(|(value, center)| (value.as_str(), *center))
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

fn center_for(index: usize, count: usize, layout: ClusterLayout, radius: f32) -> Vec3 {
    if layout == ClusterLayout::Sphere && count > 1 {
        // Golden-angle spiral, pole to pole.
        let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
        let y = 1.0 - (index as f32 / (count - 1) as f32) * 2.0;
        let radius_at_y = (1.0 - y * y).max(0.0).sqrt();
        let theta = golden_angle * index as f32;
        return Vec3::new(theta.cos() * radius_at_y, y, theta.sin() * radius_at_y) * radius;
    }

    if count <= 1 {
        return Vec3::ZERO;
    }

    let angle = (index as f32 / count as f32) * TAU;
    Vec3::new(angle.cos() * radius, angle.sin() * radius, 0.0)
}

/// Memoized centers, recomputed only when one of their inputs changes.
#[derive(Debug, Default)]
pub struct ClusterCache {
    key: Option<CacheKey>,
    centers: ClusterCenters,
}

#[derive(Clone, Debug, PartialEq)]
struct CacheKey {
    node_revision: u64,
    attribute: String,
    layout: ClusterLayout,
    radius_bits: u32,
}

impl ClusterCache {
    pub fn centers(
        &mut self,
        graph: &Graph,
        attribute: Option<&str>,
        layout: ClusterLayout,
        radius: f32,
    ) -> &ClusterCenters {
        let Some(attribute) = attribute else {
            self.key = None;
            self.centers = ClusterCenters::default();
            return &self.centers;
        };

        let key = CacheKey {
            node_revision: graph.node_revision(),
            attribute: attribute.to_owned(),
            layout,
            radius_bits: radius.to_bits(),
        };
        if self.key.as_ref() != Some(&key) {
            self.centers = ClusterCenters::for_graph(graph, attribute, layout, radius);
            self.key = Some(key);
        }
        &self.centers
    }
}
