use eframe::egui::{self, Align, Context, Layout, RichText, Ui};
use node_weaver::model::{Attributes, NodeId, RECOGNIZED_ATTRIBUTES};
use node_weaver::palette::Rgb;
use node_weaver::session::attribute_choice;
use node_weaver::{ClusterLayout, Command, Session, Settings, export};
use tracing::error;

use super::ViewModel;

const ATTRIBUTE_CHOICES: [&str; 4] = ["none", "city", "language", "team"];

/// Combo box over the recognized attributes. Returns the new choice when it changed.
fn attribute_combo(ui: &mut Ui, label: &str, current: Option<&str>) -> Option<Option<String>> {
    let current = current.unwrap_or("none");
    let mut selected = current.to_owned();
    egui::ComboBox::from_label(label)
        .selected_text(selected.clone())
        .show_ui(ui, |ui| {
            for choice in ATTRIBUTE_CHOICES {
                ui.selectable_value(&mut selected, choice.to_owned(), choice);
            }
        });
    (selected != current).then(|| attribute_choice(&selected))
}

impl ViewModel {
    pub(super) fn show(&mut self, ctx: &Context, session: &mut Session) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui, session));

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.draw_controls(ui, session));
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui, session));

        if self.show_table {
            egui::TopBottomPanel::bottom("node_table")
                .resizable(true)
                .default_height(220.0)
                .show(ctx, |ui| self.draw_table(ui, session));
        }

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui, session));
    }

    fn draw_top_bar(&mut self, ui: &mut Ui, session: &Session) {
        ui.horizontal(|ui| {
            ui.heading("node-weaver");
            ui.separator();
            ui.label(format!("nodes: {}", session.graph().node_count()));
            ui.label(format!("edges: {}", session.graph().edge_count()));
            ui.separator();

            let connect_label = if session.interaction().is_connecting() {
                "Cancel connection"
            } else {
                "Connect nodes"
            };
            if ui.button(connect_label).clicked() {
                self.pending.push(Command::ToggleConnectionMode);
            }
            if ui
                .button("Regenerate connections")
                .on_hover_text("Discard all edges and draw a new random set.")
                .clicked()
            {
                self.pending.push(Command::RegenerateEdges);
            }

            let mut physics = session.physics_enabled();
            if ui.checkbox(&mut physics, "Physics").changed() {
                self.pending.push(Command::SetPhysicsEnabled(physics));
            }
            ui.checkbox(&mut self.show_table, "Table");

            ui.separator();
            if ui.button("Export JSON").clicked() {
                self.status = Some(match export::write_json(session.graph(), &self.exports.json) {
                    Ok(()) => format!("Wrote {}", self.exports.json.display()),
                    Err(err) => {
                        error!(error = %err, "JSON export failed");
                        format!("Export failed: {err}")
                    }
                });
            }
            if ui.button("Export CSV").clicked() {
                self.status = Some(match export::write_csv(session.graph(), &self.exports.csv) {
                    Ok(()) => format!("Wrote {}", self.exports.csv.display()),
                    Err(err) => {
                        error!(error = %err, "CSV export failed");
                        format!("Export failed: {err}")
                    }
                });
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if let Some(status) = &self.status {
                    ui.label(status.as_str());
                }
            });
        });
    }

    fn draw_controls(&mut self, ui: &mut Ui, session: &Session) {
        ui.heading("Graph Controls");
        ui.separator();

        ui.label("Search")
            .on_hover_text("Fuzzy-highlight nodes by name.");
        ui.text_edit_singleline(&mut self.search);
        ui.separator();

        if let Some(choice) = attribute_combo(ui, "Cluster by", session.cluster_by()) {
            self.pending.push(Command::SetClusterBy(choice));
        }
        if let Some(choice) = attribute_combo(ui, "Color by", session.color_by()) {
            self.pending.push(Command::SetColorBy(choice));
        }

        let current = session.settings();
        let mut edited = current.clone();

        ui.horizontal(|ui| {
            ui.label("Cluster layout");
            for layout in [ClusterLayout::Circle, ClusterLayout::Sphere] {
                ui.selectable_value(&mut edited.cluster_layout, layout, layout.label());
            }
        });
        ui.checkbox(&mut edited.show_node_labels, "Show labels");

        ui.separator();
        ui.label(RichText::new("Connections").strong());
        ui.add(egui::Slider::new(&mut edited.min_connections, Settings::CONNECTIONS_RANGE).text("Min"));
        ui.add(egui::Slider::new(&mut edited.max_connections, Settings::CONNECTIONS_RANGE).text("Max"));
        if edited.max_connections < edited.min_connections {
            if edited.min_connections != current.min_connections {
                edited.max_connections = edited.min_connections;
            } else {
                edited.min_connections = edited.max_connections;
            }
        }
        ui.add(egui::Slider::new(&mut edited.city_affinity, Settings::AFFINITY_RANGE).text("City affinity"));
        ui.add(
            egui::Slider::new(&mut edited.language_affinity, Settings::AFFINITY_RANGE)
                .text("Language affinity"),
        );

        ui.separator();
        ui.label(RichText::new("Forces").strong());
        ui.add(
            egui::Slider::new(&mut edited.cluster_attraction, Settings::CLUSTER_ATTRACTION_RANGE)
                .text("Cluster attraction"),
        );
        ui.add(egui::Slider::new(&mut edited.repulsion_strength, Settings::REPULSION_RANGE).text("Repulsion"));
        ui.add(
            egui::Slider::new(&mut edited.connection_length, Settings::CONNECTION_LENGTH_RANGE)
                .text("Connection length"),
        );
        ui.add(
            egui::Slider::new(&mut edited.connection_stiffness, Settings::STIFFNESS_RANGE)
                .text("Connection stiffness"),
        );
        ui.add(
            egui::Slider::new(&mut edited.cluster_radius, Settings::CLUSTER_RADIUS_RANGE)
                .text("Cluster radius"),
        );
        ui.add(egui::Slider::new(&mut edited.damping, Settings::DAMPING_RANGE).text("Damping"));

        let patch = current.diff(&edited);
        if !patch.is_empty() {
            self.pending.push(Command::UpdateSettings(patch));
        }

        if let Some(attribute) = session.color_by() {
            ui.separator();
            ui.label(RichText::new(format!("Colors ({attribute})")).strong());
            for value in session.graph().distinct_values(attribute) {
                let mut channels = session
                    .colors()
                    .color(attribute, &value)
                    .unwrap_or(Rgb::UNASSIGNED)
                    .channels();
                ui.horizontal(|ui| {
                    if ui.color_edit_button_srgb(&mut channels).changed() {
                        self.pending.push(Command::UpdatePropertyColor {
                            attribute: attribute.to_owned(),
                            value: value.clone(),
                            color: Rgb::from_channels(channels).to_string(),
                        });
                    }
                    ui.label(value.as_str());
                });
            }
        }

        ui.separator();
        ui.label(RichText::new("Add node").strong());
        ui.horizontal(|ui| {
            ui.label("Name");
            ui.text_edit_singleline(&mut self.new_node.name);
        });
        for (key, value) in RECOGNIZED_ATTRIBUTES.iter().zip(self.new_node.attributes.iter_mut()) {
            ui.horizontal(|ui| {
                ui.label(*key);
                ui.text_edit_singleline(value);
            });
        }
        if ui.button("Add node").clicked() {
            let form = std::mem::take(&mut self.new_node);
            let attributes = RECOGNIZED_ATTRIBUTES
                .iter()
                .zip(form.attributes)
                .filter(|(_, value)| !value.trim().is_empty())
                .map(|(key, value)| ((*key).to_owned(), value))
                .collect::<Attributes>();
            self.pending.push(Command::AddNode {
                name: form.name,
                attributes,
            });
        }
    }

    fn neighbor_links(&mut self, ui: &mut Ui, session: &Session, heading: &str, ids: Vec<NodeId>) {
        ui.label(RichText::new(heading).strong());
        if ids.is_empty() {
            ui.label("None");
            return;
        }
        for id in ids {
            let Some(node) = session.graph().node(id) else {
                continue;
            };
            if ui.link(node.name.as_str()).clicked() {
                self.pending.push(Command::SelectNode(Some(id)));
            }
        }
    }

    fn draw_details(&mut self, ui: &mut Ui, session: &Session) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(node) = session.selected_node() else {
            ui.label("Click a node to select it.");
            return;
        };
        let id = node.id;

        let mut name = node.name.clone();
        ui.horizontal(|ui| {
            ui.label("name");
            if ui.text_edit_singleline(&mut name).changed() {
                self.pending.push(Command::UpdateNodeProperty {
                    node: id,
                    property: "name".to_owned(),
                    value: name.clone(),
                });
            }
        });

        let mut keys: Vec<&str> = RECOGNIZED_ATTRIBUTES.to_vec();
        keys.extend(
            node.attributes
                .keys()
                .map(String::as_str)
                .filter(|key| !RECOGNIZED_ATTRIBUTES.contains(key)),
        );
        for key in keys {
            let mut value = node.attribute(key).unwrap_or_default().to_owned();
            ui.horizontal(|ui| {
                ui.label(key);
                if ui.text_edit_singleline(&mut value).changed() {
                    self.pending.push(Command::UpdateNodeProperty {
                        node: id,
                        property: key.to_owned(),
                        value: value.clone(),
                    });
                }
            });
        }

        ui.separator();
        let graph = session.graph();
        self.neighbor_links(ui, session, "Connects to", graph.outgoing(id).collect());
        ui.add_space(4.0);
        self.neighbor_links(ui, session, "Connected from", graph.incoming(id).collect());

        ui.separator();
        if ui.button("Delete node").clicked() {
            self.pending.push(Command::RemoveSelectedNode);
        }
    }

    fn draw_table(&mut self, ui: &mut Ui, session: &Session) {
        let selected = session.interaction().selected();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("node_table_grid")
                    .striped(true)
                    .num_columns(5)
                    .show(ui, |ui| {
                        for header in ["Name", "City", "Language", "Team", "Connections"] {
                            ui.label(RichText::new(header).strong());
                        }
                        ui.end_row();

                        for row in export::table_rows(session.graph()) {
                            if ui
                                .selectable_label(selected == Some(row.id), row.name.as_str())
                                .clicked()
                            {
                                self.pending.push(Command::SelectNode(Some(row.id)));
                            }
                            for value in &row.attributes {
                                ui.label(value.as_str());
                            }
                            ui.label(row.connections.join(", "));
                            ui.end_row();
                        }
                    });
            });
    }
}
