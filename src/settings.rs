use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterLayout {
    #[default]
    Circle,
    Sphere,
}

impl ClusterLayout {
    pub fn label(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Sphere => "sphere",
        }
    }
}

/// Simulation and generation parameters. Values outside the nominal ranges are accepted;
/// the engine and generator stay finite and terminate regardless.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub show_node_labels: bool,
    pub cluster_layout: ClusterLayout,
    /// 0..=10
    pub min_connections: usize,
    /// 0..=10
    pub max_connections: usize,
    /// 0..=1
    pub city_affinity: f32,
    /// 0..=1
    pub language_affinity: f32,
    /// 0..=3
    pub cluster_attraction: f32,
    /// 0..=50
    pub repulsion_strength: f32,
    /// 1..=20
    pub connection_length: f32,
    /// 1..=100
    pub connection_stiffness: f32,
    /// 5..=50
    pub cluster_radius: f32,
    /// 0.5..=0.99
    pub damping: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_node_labels: true,
            cluster_layout: ClusterLayout::Circle,
            min_connections: 1,
            max_connections: 3,
            city_affinity: 0.5,
            language_affinity: 0.7,
            cluster_attraction: 1.0,
            repulsion_strength: 20.0,
            connection_length: 4.0,
            connection_stiffness: 50.0,
            cluster_radius: 25.0,
            damping: 0.9,
        }
    }
}

impl Settings {
    pub const CONNECTIONS_RANGE: std::ops::RangeInclusive<usize> = 0..=10;
    pub const AFFINITY_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;
    pub const CLUSTER_ATTRACTION_RANGE: std::ops::RangeInclusive<f32> = 0.0..=3.0;
    pub const REPULSION_RANGE: std::ops::RangeInclusive<f32> = 0.0..=50.0;
    pub const CONNECTION_LENGTH_RANGE: std::ops::RangeInclusive<f32> = 1.0..=20.0;
    pub const STIFFNESS_RANGE: std::ops::RangeInclusive<f32> = 1.0..=100.0;
    pub const CLUSTER_RADIUS_RANGE: std::ops::RangeInclusive<f32> = 5.0..=50.0;
    pub const DAMPING_RANGE: std::ops::RangeInclusive<f32> = 0.5..=0.99;

    /// Reads a (possibly partial) JSON settings file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Merges every field present in `patch`.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(value) = patch.show_node_labels {
            self.show_node_labels = value;
        }
        if let Some(value) = patch.cluster_layout {
            self.cluster_layout = value;
        }
        if let Some(value) = patch.min_connections {
            self.min_connections = value;
        }
        if let Some(value) = patch.max_connections {
            self.max_connections = value;
        }
        if let Some(value) = patch.city_affinity {
            self.city_affinity = value;
        }
        if let Some(value) = patch.language_affinity {
            self.language_affinity = value;
        }
        if let Some(value) = patch.cluster_attraction {
            self.cluster_attraction = value;
        }
        if let Some(value) = patch.repulsion_strength {
            self.repulsion_strength = value;
        }
        if let Some(value) = patch.connection_length {
            self.connection_length = value;
        }
        if let Some(value) = patch.connection_stiffness {
            self.connection_stiffness = value;
        }
        if let Some(value) = patch.cluster_radius {
            self.cluster_radius = value;
        }
        if let Some(value) = patch.damping {
            self.damping = value;
        }
    }

    /// Field-by-field difference, for a viewer that edits a copy and submits the changes.
    pub fn diff(&self, edited: &Settings) -> SettingsPatch {
        fn changed<T: PartialEq + Copy>(old: T, new: T) -> Option<T> {
            (old != new).then_some(new)
        }

        SettingsPatch {
            show_node_labels: changed(self.show_node_labels, edited.show_node_labels),
            cluster_layout: changed(self.cluster_layout, edited.cluster_layout),
            min_connections: changed(self.min_connections, edited.min_connections),
            max_connections: changed(self.max_connections, edited.max_connections),
            city_affinity: changed(self.city_affinity, edited.city_affinity),
            language_affinity: changed(self.language_affinity, edited.language_affinity),
            cluster_attraction: changed(self.cluster_attraction, edited.cluster_attraction),
            repulsion_strength: changed(self.repulsion_strength, edited.repulsion_strength),
            connection_length: changed(self.connection_length, edited.connection_length),
            connection_stiffness: changed(self.connection_stiffness, edited.connection_stiffness),
            cluster_radius: changed(self.cluster_radius, edited.cluster_radius),
            damping: changed(self.damping, edited.damping),
        }
    }
}

/// Partial settings update; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub show_node_labels: Option<bool>,
    pub cluster_layout: Option<ClusterLayout>,
    pub min_connections: Option<usize>,
    pub max_connections: Option<usize>,
    pub city_affinity: Option<f32>,
    pub language_affinity: Option<f32>,
    pub cluster_attraction: Option<f32>,
    pub repulsion_strength: Option<f32>,
    pub connection_length: Option<f32>,
    pub connection_stiffness: Option<f32>,
    pub cluster_radius: Option<f32>,
    pub damping: Option<f32>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
