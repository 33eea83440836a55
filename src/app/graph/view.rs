use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::epaint::CubicBezierShape;
use eframe::egui::{
    self, Align2, Color32, FontId, PointerButton, Rect, Sense, Stroke, Ui, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::truncate_label;

use super::super::render_utils::{
    blend_color, circle_visible, depth_color, dim_color, draw_background, edge_visible,
    node_radius, screen_radius,
};
use super::super::tree::layout_tree;
use super::super::{LayoutMode, SearchMatchCache, ViewModel};
use super::PointerState;
use super::interaction::{apply_drag_delta, hit_test, select_node};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    /// Tree mode computes its layout lazily: once per model per mode
    /// switch, then reuses the cached result (the layout is pure, so there
    /// is nothing to re-run).
    fn ensure_tree_layout(&mut self, rect: Rect) {
        if self.mode != LayoutMode::Tree || self.tree_layout.is_some() {
            return;
        }

        let Some(model) = self.model.as_mut() else {
            return;
        };

        let layout = layout_tree(&model.hierarchy, rect.width(), rect.height());
        layout.apply_to(&mut model.nodes);
        self.tree_layout = Some(layout);
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        if self.selected.is_some() {
            return None;
        }

        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cache) = &self.search_match_cache
            && cache.revision == self.model_revision
            && cache.query == query
        {
            return Some(Arc::clone(&cache.matches));
        }

        let model = self.model.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = model
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.name, query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            revision: self.model_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.ctx().input(|input| input.time);

        self.ensure_tree_layout(rect);

        // Gestures work against this frame's evaluated transform; the
        // render pass below re-reads it so their effect lands immediately.
        let input_transform = self.viewport.transform(now);

        let pointer_pos = if response.hovered() {
            ui.input(|input| input.pointer.hover_pos())
        } else {
            None
        };
        let hit = match (&self.model, pointer_pos) {
            (Some(model), Some(pointer)) => {
                hit_test(&model.nodes, input_transform, rect, pointer)
            }
            _ => None,
        };

        // Wheel zoom tracks the pointer 1:1; no animation for gestures.
        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let pointer = pointer_pos.unwrap_or_else(|| rect.center());
                let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
                self.viewport.zoom_at(rect, pointer, factor);
            }
        }

        // Grabbing a node is a force-mode gesture; the tree layout is
        // static, so there every primary drag pans instead.
        if self.mode == LayoutMode::Force
            && response.drag_started_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.pointer = self.pointer.on_drag_start(hit, pointer);
            if let Some(node) = self.pointer.dragged_node() {
                self.sim.pin(node);
            }
        }

        if response.dragged_by(PointerButton::Primary)
            && let PointerState::Dragging { node, last_pointer } = self.pointer
        {
            if let Some(pointer) = response.interact_pointer_pos() {
                if let Some(model) = self.model.as_mut()
                    && let Some(graph_node) = model.nodes.get_mut(node)
                {
                    apply_drag_delta(graph_node, last_pointer, pointer, input_transform.scale);
                }
                self.sim.pin(node);
                self.sim.reheat(now);
                self.pointer = PointerState::Dragging {
                    node,
                    last_pointer: pointer,
                };
            }
        } else if response.dragged_by(PointerButton::Primary)
            || response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.viewport.pan_by(response.drag_delta());
        }

        if response.drag_stopped() && self.pointer.dragged_node().is_some() {
            self.sim.unpin();
            self.pointer = self.pointer.on_release(hit);
        }

        self.pointer = self.pointer.on_hover(hit);

        if response.clicked_by(PointerButton::Primary)
            && let Some(index) = hit
            && let Some(model) = self.model.as_ref()
        {
            select_node(&mut self.selected, model.nodes[index].id);
        }

        // One simulation tick per frame; the drag mutation above lands in
        // the same tick the integrator reads, so a pinned node is never
        // both followed and force-moved.
        let mut physics_moving = false;
        if self.mode == LayoutMode::Force
            && let Some(model) = self.model.as_mut()
        {
            if !self.sim.is_settled() {
                physics_moving = self.sim.step(&mut model.nodes, &model.links, &self.sim_params);
            }
            if self.sim.poll_settled(now) && !self.did_auto_fit {
                self.did_auto_fit = true;
                if let Some((min, max)) = model.bounding_box() {
                    self.viewport
                        .fit_to_content(min, max, rect.size(), 0.15, 1.2, None, now);
                }
            }
        }

        if self.mode == LayoutMode::Tree && self.tree_fit_pending {
            if let Some((min, max)) = self.model.as_ref().and_then(|model| model.bounding_box()) {
                self.viewport
                    .fit_to_content(min, max, rect.size(), 0.15, 1.0, Some(36.0), now);
            }
            self.tree_fit_pending = false;
        }

        if physics_moving || self.viewport.is_animating() || response.dragged() {
            ui.ctx().request_repaint();
        }

        let transform = self.viewport.transform(now);
        draw_background(&painter, rect, transform.translate.x, transform.scale);

        let search_matches = self.cached_search_matches();
        let Some(model) = self.model.as_ref() else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Parse some source to see its syntax tree.",
                FontId::proportional(14.0),
                Color32::from_gray(150),
            );
            return;
        };

        let edge_width = (1.2 * transform.scale.sqrt()).clamp(0.6, 3.0);
        let edge_color = Color32::from_rgba_unmultiplied(118, 128, 140, 170);
        match self.mode {
            LayoutMode::Force => {
                for link in &model.links {
                    let start =
                        transform.world_to_screen(rect, model.nodes[link.source as usize].pos());
                    let end =
                        transform.world_to_screen(rect, model.nodes[link.target as usize].pos());
                    if edge_visible(rect, start, end, 2.5) {
                        painter.line_segment([start, end], Stroke::new(edge_width, edge_color));
                    }
                }
            }
            LayoutMode::Tree => {
                if let Some(layout) = &self.tree_layout {
                    for curve in &layout.curves {
                        let start = transform
                            .world_to_screen(rect, model.nodes[curve.source as usize].pos());
                        let end = transform
                            .world_to_screen(rect, model.nodes[curve.target as usize].pos());
                        if !edge_visible(rect, start, end, 48.0) {
                            continue;
                        }

                        let control_a = transform.world_to_screen(rect, curve.control_a);
                        let control_b = transform.world_to_screen(rect, curve.control_b);
                        painter.add(CubicBezierShape::from_points_stroke(
                            [start, control_a, control_b, end],
                            false,
                            Color32::TRANSPARENT,
                            Stroke::new(edge_width, edge_color),
                        ));
                    }
                }
            }
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        for (index, node) in model.nodes.iter().enumerate() {
            let center = transform.world_to_screen(rect, node.pos());
            let radius = screen_radius(node_radius(node.depth), transform.scale);
            if !circle_visible(rect, center, radius) {
                continue;
            }

            let is_selected = self.selected == Some(node.id);
            let is_hovered = self.pointer.hovered_node() == Some(index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base = depth_color(node.depth, model.max_depth);
            let color = if is_selected {
                selected_color
            } else if is_hovered {
                blend_color(base, Color32::from_rgb(255, 164, 101), 0.55)
            } else if is_match {
                blend_color(base, Color32::from_rgb(103, 196, 255), 0.68)
            } else if search_active {
                dim_color(base, 0.45)
            } else {
                base
            };

            painter.circle_filled(center, radius, color);
            if is_selected {
                painter.circle_stroke(center, radius + 4.0, Stroke::new(2.0, selected_color));
            }
            painter.circle_stroke(
                center,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );

            let show_label = match self.mode {
                LayoutMode::Tree => transform.scale > 0.45,
                LayoutMode::Force => {
                    is_selected || is_hovered || is_match || transform.scale > 1.1
                }
            };
            if show_label {
                painter.text(
                    center + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(&node.name),
                    FontId::proportional(12.0),
                    Color32::from_gray(235),
                );
            }
        }

        if hit.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if let PointerState::Hovering(index) = self.pointer
            && let Some(pointer) = pointer_pos
            && let Some(node) = model.nodes.get(index)
        {
            painter.text(
                pointer + vec2(14.0, -12.0),
                Align2::LEFT_BOTTOM,
                truncate_label(&node.name),
                FontId::proportional(12.5),
                Color32::from_gray(245),
            );
        }
    }
}
