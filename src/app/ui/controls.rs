use eframe::egui::{self, Color32, Key, Modifiers, Ui};

use super::super::examples::EXAMPLES;
use super::super::{LayoutMode, UiActions, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, busy: bool, actions: &mut UiActions) {
        let now = ui.ctx().input(|input| input.time);

        ui.heading("Source");
        ui.add_space(4.0);

        egui::ComboBox::from_id_salt("example_picker")
            .selected_text("insert example…")
            .width(200.0)
            .show_ui(ui, |ui| {
                for (name, snippet) in EXAMPLES {
                    if ui.selectable_label(false, *name).clicked() {
                        self.source = (*snippet).to_owned();
                    }
                }
            });
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .id_salt("source_editor")
            .max_height(280.0)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.source)
                        .code_editor()
                        .desired_rows(14)
                        .desired_width(f32::INFINITY),
                );
            });

        let parse_shortcut = ui.input_mut(|input| input.consume_key(Modifiers::CTRL, Key::Enter));
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let parse_button = ui.add_enabled(!busy, egui::Button::new("Parse (Ctrl+Enter)"));
            if parse_button.clicked() || (parse_shortcut && !busy) {
                actions.parse_requested = true;
            }
            if ui.button("Export JSON").clicked() {
                actions.export_requested = true;
            }
        });

        if let Some(error) = &self.last_error {
            ui.add_space(4.0);
            ui.colored_label(Color32::from_rgb(235, 110, 100), error.as_str());
        }

        ui.separator();
        ui.label("Layout");
        let mut mode = self.mode;
        ui.horizontal(|ui| {
            ui.radio_value(&mut mode, LayoutMode::Force, LayoutMode::Force.label());
            ui.radio_value(&mut mode, LayoutMode::Tree, LayoutMode::Tree.label());
        });
        if mode != self.mode {
            self.set_mode(mode, now);
        }

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui.button("Zoom in").clicked() {
                self.viewport.zoom_by(1.25, now);
            }
            if ui.button("Zoom out").clicked() {
                self.viewport.zoom_by(0.8, now);
            }
            if ui.button("Reset view").clicked() {
                self.reset_view(now);
            }
        });

        ui.separator();
        ui.label("Search node kinds");
        ui.text_edit_singleline(&mut self.search);

        if self.mode == LayoutMode::Force {
            ui.separator();
            egui::CollapsingHeader::new("Simulation")
                .default_open(false)
                .show(ui, |ui| {
                    let mut changed = false;
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut self.sim_params.link_distance, 40.0..=200.0)
                                .text("link distance"),
                        )
                        .changed();
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut self.sim_params.charge_strength, -1000.0..=-50.0)
                                .text("charge"),
                        )
                        .changed();
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut self.sim_params.collision_radius, 6.0..=60.0)
                                .text("collision radius"),
                        )
                        .changed();
                    if changed {
                        self.sim.reheat(now);
                    }
                });
        }
    }
}
