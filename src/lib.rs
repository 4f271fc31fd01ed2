//! Core of an interactive 3D node-link graph editor: the graph model, a force-directed
//! layout, attribute clustering, random topology generation and export. Front ends drive
//! it through [`session::Session`].

pub mod cluster;
pub mod dataset;
pub mod error;
pub mod export;
pub mod interaction;
pub mod model;
pub mod palette;
pub mod physics;
pub mod session;
pub mod settings;
pub mod topology;

pub use error::{Error, Result};
pub use session::{Command, EdgeRole, Session};
pub use settings::{ClusterLayout, Settings, SettingsPatch};
