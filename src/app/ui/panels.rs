use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout};

use super::super::graph::PointerState;
use super::super::physics::{SimParams, Simulation};
use super::super::viewport::Viewport;
use super::super::{LayoutMode, UiActions, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new() -> Self {
        Self {
            source: String::new(),
            search: String::new(),
            mode: LayoutMode::Force,
            model: None,
            model_revision: 0,
            tree_layout: None,
            sim: Simulation::new(),
            sim_params: SimParams::default(),
            viewport: Viewport::new(),
            pointer: PointerState::Idle,
            selected: None,
            last_error: None,
            status_line: None,
            source_lines: 0,
            did_auto_fit: false,
            tree_fit_pending: false,
            search_match_cache: None,
            show_fps: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, busy: bool, actions: &mut UiActions) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("astviz");
                    ui.separator();
                    if let Some(model) = &self.model {
                        ui.label(format!("nodes: {}", model.nodes.len()));
                        ui.label(format!("links: {}", model.links.len()));
                        ui.label(format!("depth: {}", model.max_depth));
                        ui.label(format!("lines: {}", self.source_lines));
                        ui.label(format!("layout: {}", self.mode.label()));
                    } else {
                        ui.label("no tree parsed yet");
                    }
                    if busy {
                        ui.spinner();
                        ui.label("parsing…");
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        if let Some(status) = &self.status_line {
                            ui.label(status.as_str());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.draw_controls(ui, busy, actions));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}
