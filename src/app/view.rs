use std::collections::{HashMap, HashSet};

use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Pos2, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use node_weaver::model::{Graph, NodeId};
use node_weaver::{Command, EdgeRole, Session};

use super::ViewModel;
use super::camera::Projector;
use super::render_utils::{
    PENDING_COLOR, SEARCH_COLOR, SELECTED_COLOR, blend_color, circle_visible, dim_color,
    draw_arrow_tip, draw_background, edge_color, rgb,
};

/// Node radius in world units.
const NODE_RADIUS: f32 = 1.2;

/// Screen-space placement of a node for the current frame.
#[derive(Clone, Copy, Debug)]
pub(super) struct ProjectedNode {
    pub(super) id: NodeId,
    pub(super) screen: Pos2,
    pub(super) depth: f32,
    pub(super) radius: f32,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn search_matches(graph: &Graph, query: &str) -> HashSet<NodeId> {
    let query = query.trim();
    if query.is_empty() {
        return HashSet::new();
    }

    let matcher = SkimMatcherV2::default();
    graph
        .nodes()
        .iter()
        .filter(|node| fuzzy_match_score(&matcher, &node.name, query).is_some())
        .map(|node| node.id)
        .collect()
}

impl ViewModel {
    fn project_nodes(&mut self, projector: &Projector, graph: &Graph) {
        self.projected.clear();
        for node in graph.nodes() {
            let Some(projected) = projector.project(node.position) else {
                continue;
            };
            self.projected.push(ProjectedNode {
                id: node.id,
                screen: projected.screen,
                depth: projected.depth,
                radius: (NODE_RADIUS * projector.pixels_per_unit(projected.depth)).clamp(3.0, 28.0),
            });
        }

        // Far to near, so nearer nodes paint over farther ones.
        self.projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        self.projected_index = self
            .projected
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id, index))
            .collect::<HashMap<_, _>>();
    }

    fn projection_of(&self, id: NodeId) -> Option<&ProjectedNode> {
        self.projected_index
            .get(&id)
            .and_then(|&index| self.projected.get(index))
    }

    /// Nearest node under `pointer`.
    pub(super) fn node_at(&self, pointer: Pos2) -> Option<NodeId> {
        self.projected
            .iter()
            .rev()
            .find(|node| node.screen.distance(pointer) <= node.radius)
            .map(|node| node.id)
    }

    fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        projector: &Projector,
        graph: &Graph,
        hovered: Option<NodeId>,
    ) {
        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                self.camera.zoom(scroll);
            }
        }

        if response.drag_started_by(PointerButton::Primary) {
            let origin = ui.input(|input| input.pointer.press_origin());
            self.dragging = origin.and_then(|origin| self.node_at(origin));
            if let Some(id) = self.dragging {
                self.pending.push(Command::BeginDrag(id));
            }
        }

        if response.dragged_by(PointerButton::Primary) {
            match self.dragging {
                Some(id) => {
                    let target = response
                        .interact_pointer_pos()
                        .zip(graph.node(id))
                        .and_then(|(pointer, node)| projector.unproject_at(pointer, node.position));
                    if let Some(target) = target {
                        self.pending.push(Command::DragTo(id, target));
                    }
                }
                None => self.camera.orbit(response.drag_delta()),
            }
        } else if response.dragged_by(PointerButton::Secondary) {
            self.camera.orbit(response.drag_delta());
        }

        if response.drag_stopped()
            && let Some(id) = self.dragging.take()
        {
            self.pending.push(Command::EndDrag(id));
        }

        if response.clicked_by(PointerButton::Primary) {
            self.pending.push(Command::NodeClick(hovered));
        }
    }

    pub(super) fn draw_graph(&mut self, ui: &mut Ui, session: &mut Session) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        let centers = session.cluster_centers().clone();
        let cluster_radius = session.settings().cluster_radius;
        let show_labels = session.settings().show_node_labels;

        let projector = self.camera.projector(rect);
        self.project_nodes(&projector, session.graph());

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = pointer
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| self.node_at(pointer));
        self.handle_graph_pointer(ui, &response, &projector, session.graph(), hovered);

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        for (value, center) in centers.iter() {
            let Some(projected) = projector.project(center) else {
                continue;
            };
            let radius =
                (cluster_radius * 0.3 * projector.pixels_per_unit(projected.depth)).clamp(10.0, 160.0);
            painter.circle_stroke(
                projected.screen,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 130, 150, 70)),
            );
            painter.text(
                projected.screen - vec2(0.0, radius + 4.0),
                Align2::CENTER_BOTTOM,
                value,
                FontId::proportional(11.0),
                Color32::from_gray(150),
            );
        }

        let graph = session.graph();
        for edge in graph.edges() {
            let (Some(start), Some(end)) = (self.projection_of(edge.start), self.projection_of(edge.end))
            else {
                continue;
            };
            let role = session.edge_role(edge);
            let width = if role == EdgeRole::Plain { 1.0 } else { 2.2 };
            let stroke = Stroke::new(width, edge_color(role));
            painter.line_segment([start.screen, end.screen], stroke);
            draw_arrow_tip(&painter, start.screen, end.screen, end.radius, stroke);
        }

        let matches = search_matches(graph, &self.search);
        let searching = !self.search.trim().is_empty();
        let interaction = session.interaction();

        for projected in &self.projected {
            if !circle_visible(rect, projected.screen, projected.radius) {
                continue;
            }
            let Some(node) = graph.node(projected.id) else {
                continue;
            };

            let base = rgb(session.node_color(node));
            let is_match = matches.contains(&node.id);
            let color = if is_match {
                blend_color(base, SEARCH_COLOR, 0.55)
            } else if searching {
                dim_color(base, 0.4)
            } else {
                base
            };
            painter.circle_filled(projected.screen, projected.radius, color);

            let outline = if interaction.selected() == Some(node.id) {
                Stroke::new(2.6, SELECTED_COLOR)
            } else if interaction.pending_start() == Some(node.id) {
                Stroke::new(2.6, PENDING_COLOR)
            } else if hovered == Some(node.id) {
                Stroke::new(1.6, Color32::from_gray(235))
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(projected.screen, projected.radius, outline);

            if show_labels || hovered == Some(node.id) || is_match {
                painter.text(
                    projected.screen + vec2(projected.radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.name,
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if interaction.is_connecting() {
            let hint = if interaction.pending_start().is_some() {
                "Click a second node to connect, or toggle connect mode to cancel"
            } else {
                "Click the node the connection starts from"
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                hint,
                FontId::proportional(13.0),
                PENDING_COLOR,
            );
        }
    }
}
