use anyhow::{Context, Result};
use serde::Serialize;

use super::graph::{GraphLink, GraphModel, GraphNode};
use crate::parser::SyntaxNode;

/// Export is a pure serialization of current model state: the retained
/// original tree plus the flat derivation, positions included. Nothing is
/// re-derived at export time.
#[derive(Serialize)]
struct ExportDocument<'a> {
    tree: &'a SyntaxNode,
    nodes: &'a [GraphNode],
    links: &'a [GraphLink],
}

impl<'a> ExportDocument<'a> {
    fn from_model(model: &'a GraphModel) -> Self {
        Self {
            tree: &model.source_tree,
            nodes: &model.nodes,
            links: &model.links,
        }
    }
}

pub(super) fn write_export(path: &str, model: &GraphModel) -> Result<()> {
    let document = ExportDocument::from_model(model);
    let json =
        serde_json::to_string_pretty(&document).context("failed to serialize export document")?;
    std::fs::write(path, json).with_context(|| format!("failed to write export to {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::build_graph_model;
    use std::collections::BTreeMap;

    fn model() -> GraphModel {
        let tree = SyntaxNode {
            id: 0,
            name: "Module".to_owned(),
            attributes: BTreeMap::new(),
            children: vec![SyntaxNode {
                id: 1,
                name: "Expr".to_owned(),
                attributes: BTreeMap::new(),
                children: Vec::new(),
            }],
        };
        build_graph_model(Some(&tree)).expect("tree builds")
    }

    #[test]
    fn document_carries_tree_and_flat_forms() {
        let model = model();
        let value = serde_json::to_value(ExportDocument::from_model(&model)).expect("serializes");

        assert_eq!(value["tree"]["name"], "Module");
        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["links"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["links"][0]["source"], 0);
        assert_eq!(value["links"][0]["target"], 1);
    }

    #[test]
    fn node_entries_expose_positions_but_not_velocities() {
        let mut model = model();
        model.nodes[1].x = 42.5;
        model.nodes[1].y = -7.0;

        let value = serde_json::to_value(ExportDocument::from_model(&model)).expect("serializes");
        let node = &value["nodes"][1];

        assert_eq!(node["id"], 1);
        assert_eq!(node["x"], 42.5);
        assert_eq!(node["y"], -7.0);
        assert!(node.get("vx").is_none());
    }
}
