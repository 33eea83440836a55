use eframe::egui::{self, RichText, Ui};
use serde_json::Value;

use super::super::ViewModel;

fn format_attribute(value: &Value) -> String {
    match value {
        Value::Null => "None".to_owned(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => {
            if text.chars().count() > 60 {
                let head = text.chars().take(60).collect::<String>();
                format!("\"{head}…\"")
            } else {
                format!("\"{text}\"")
            }
        }
        other => other.to_string(),
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected else {
            ui.label("Click a node to inspect it.");
            return;
        };

        let Some(model) = &self.model else {
            ui.label("Selection refers to a discarded model.");
            return;
        };

        // Ids are assigned sequentially at flatten time, so they double as
        // indices into the flat array.
        let Some(node) = model.nodes.get(selected_id as usize) else {
            ui.label("Selected node no longer exists in this model.");
            return;
        };

        ui.label(RichText::new(&node.name).strong());
        ui.small(format!("id {} · depth {}", node.id, node.depth));
        ui.add_space(6.0);

        let child_count = model
            .links
            .iter()
            .filter(|link| link.source == node.id)
            .count();
        ui.label(format!("Children: {child_count}"));

        if let Some(parent_link) = model.links.iter().find(|link| link.target == node.id) {
            let parent = &model.nodes[parent_link.source as usize];
            ui.label(format!("Parent: {} (id {})", parent.name, parent.id));
        } else {
            ui.label("Parent: none (root)");
        }

        ui.separator();
        ui.label(RichText::new("Attributes").strong());
        if node.attributes.is_empty() {
            ui.label("No scalar attributes on this node.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("attribute_rows")
                .max_height(300.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for (key, value) in &node.attributes {
                        ui.horizontal(|ui| {
                            ui.monospace(key);
                            ui.label(format_attribute(value));
                        });
                    }
                });
        }
    }
}
