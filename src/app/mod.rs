use std::collections::HashMap;
use std::path::PathBuf;

use eframe::egui::Context;
use node_weaver::model::NodeId;
use node_weaver::{Command, Session};

mod camera;
mod panels;
mod render_utils;
mod view;

use camera::OrbitCamera;
use view::ProjectedNode;

/// Where the export buttons write.
pub struct ExportPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

pub struct NodeWeaverApp {
    session: Session,
    view: ViewModel,
}

struct ViewModel {
    camera: OrbitCamera,
    search: String,
    projected: Vec<ProjectedNode>,
    projected_index: HashMap<NodeId, usize>,
    dragging: Option<NodeId>,
    /// Commands gathered while drawing, applied once the frame's UI is done.
    pending: Vec<Command>,
    new_node: NewNodeForm,
    show_table: bool,
    exports: ExportPaths,
    status: Option<String>,
}

#[derive(Default)]
struct NewNodeForm {
    name: String,
    attributes: [String; 3],
}

impl NodeWeaverApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, session: Session, exports: ExportPaths) -> Self {
        Self {
            session,
            view: ViewModel {
                camera: OrbitCamera::default(),
                search: String::new(),
                projected: Vec::new(),
                projected_index: HashMap::new(),
                dragging: None,
                pending: Vec::new(),
                new_node: NewNodeForm::default(),
                show_table: false,
                exports,
                status: None,
            },
        }
    }
}

impl eframe::App for NodeWeaverApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let moving = self.session.tick();

        self.view.show(ctx, &mut self.session);

        let mutated = !self.view.pending.is_empty();
        for command in self.view.pending.drain(..) {
            self.session.apply(command);
        }

        if moving || mutated || self.view.dragging.is_some() {
            ctx.request_repaint();
        }
    }
}
