use std::collections::BTreeMap;

use eframe::egui::{Vec2, vec2};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::parser::SyntaxNode;
use crate::util::stable_pair;

#[derive(Debug, Error)]
#[error("nothing to visualize: the parse produced no root node")]
pub struct EmptyTree;

/// Flat node as used by the layout engines and the export document.
/// Positions live in world space with the origin at the canvas center;
/// `vx`/`vy` are force-engine state and stay out of the export.
#[derive(Clone, Debug, Serialize)]
pub struct GraphNode {
    pub id: u32,
    pub name: String,
    pub attributes: BTreeMap<String, Value>,
    pub depth: u32,
    pub x: f32,
    pub y: f32,
    #[serde(skip)]
    pub vx: f32,
    #[serde(skip)]
    pub vy: f32,
}

impl GraphNode {
    pub fn pos(&self) -> Vec2 {
        vec2(self.x, self.y)
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.x = pos.x;
        self.y = pos.y;
    }

    pub fn velocity(&self) -> Vec2 {
        vec2(self.vx, self.vy)
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.vx = velocity.x;
        self.vy = velocity.y;
    }
}

/// Directed parent→child edge; exactly one per non-root node, so the link
/// set always forms a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: u32,
    pub target: u32,
}

/// Nested mirror of the flat arrays, required by the hierarchical layout.
/// Built in the same traversal as `nodes`, so a preorder walk yields the
/// same id sequence.
#[derive(Clone, Debug)]
pub struct HierarchyNode {
    pub id: u32,
    pub name: String,
    pub attributes: BTreeMap<String, Value>,
    pub children: Vec<HierarchyNode>,
}

#[derive(Debug)]
pub struct GraphModel {
    /// Original producer tree, retained so export serializes rather than
    /// re-derives.
    pub source_tree: SyntaxNode,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub hierarchy: HierarchyNode,
    pub max_depth: u32,
}

impl GraphModel {
    /// Axis-aligned bounding box over current node positions.
    pub fn bounding_box(&self) -> Option<(Vec2, Vec2)> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for node in &self.nodes {
            min.x = min.x.min(node.x);
            min.y = min.y.min(node.y);
            max.x = max.x.max(node.x);
            max.y = max.y.max(node.y);
        }

        if min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite() {
            Some((min, max))
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn hierarchy_preorder_ids(&self) -> Vec<u32> {
        fn walk(node: &HierarchyNode, out: &mut Vec<u32>) {
            out.push(node.id);
            for child in &node.children {
                walk(child, out);
            }
        }

        let mut ids = Vec::with_capacity(self.nodes.len());
        walk(&self.hierarchy, &mut ids);
        ids
    }
}

fn seed_position(id: u32, name: &str, depth: u32) -> (Vec2, Vec2) {
    if depth == 0 {
        return (Vec2::ZERO, Vec2::ZERO);
    }

    let (jx, jy) = stable_pair(&format!("{name}-{id}"));
    let mut direction = vec2(jx, jy);
    if direction.length_sq() <= 0.0001 {
        let angle = ((id as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
        direction = vec2(angle.cos(), angle.sin());
    } else {
        direction = direction.normalized();
    }

    let radius = 26.0 + (depth as f32) * 18.0;
    (direction * radius, direction * 0.9)
}

fn flatten(
    syntax: &SyntaxNode,
    depth: u32,
    parent: Option<u32>,
    nodes: &mut Vec<GraphNode>,
    links: &mut Vec<GraphLink>,
) -> HierarchyNode {
    let id = nodes.len() as u32;
    let (pos, velocity) = seed_position(id, &syntax.name, depth);

    nodes.push(GraphNode {
        id,
        name: syntax.name.clone(),
        attributes: syntax.attributes.clone(),
        depth,
        x: pos.x,
        y: pos.y,
        vx: velocity.x,
        vy: velocity.y,
    });

    if let Some(parent) = parent {
        links.push(GraphLink {
            source: parent,
            target: id,
        });
    }

    let mut hierarchy = HierarchyNode {
        id,
        name: syntax.name.clone(),
        attributes: syntax.attributes.clone(),
        children: Vec::with_capacity(syntax.children.len()),
    };

    for child in &syntax.children {
        hierarchy
            .children
            .push(flatten(child, depth + 1, Some(id), nodes, links));
    }

    hierarchy
}

/// Flattens one producer tree into the dual graph representation: a preorder
/// flat node/link set plus the retained hierarchy, both keyed by the same
/// sequential ids (root = 0). `nodes[i].id == i` holds for every node.
pub fn build_graph_model(root: Option<&SyntaxNode>) -> Result<GraphModel, EmptyTree> {
    let root = root.ok_or(EmptyTree)?;

    let mut nodes = Vec::with_capacity(root.node_count());
    let mut links = Vec::with_capacity(root.node_count().saturating_sub(1));
    let hierarchy = flatten(root, 0, None, &mut nodes, &mut links);

    let max_depth = nodes.iter().map(|node| node.depth).max().unwrap_or(0);

    Ok(GraphModel {
        source_tree: root.clone(),
        nodes,
        links,
        hierarchy,
        max_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax(name: &str, children: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode {
            id: 0,
            name: name.to_owned(),
            attributes: BTreeMap::new(),
            children,
        }
    }

    fn chain_fixture() -> SyntaxNode {
        syntax(
            "Module",
            vec![syntax(
                "FunctionDef",
                vec![syntax("Return", vec![syntax("BinOp", vec![])])],
            )],
        )
    }

    #[test]
    fn chain_scenario_produces_expected_ids_and_links() {
        let model = build_graph_model(Some(&chain_fixture())).expect("tree builds");

        assert_eq!(model.nodes.len(), 4);
        assert_eq!(
            model.nodes.iter().map(|node| node.id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(
            model.links,
            vec![
                GraphLink { source: 0, target: 1 },
                GraphLink { source: 1, target: 2 },
                GraphLink { source: 2, target: 3 },
            ]
        );
        assert_eq!(model.hierarchy.id, 0);
        assert_eq!(model.hierarchy.children.len(), 1);
        assert_eq!(model.max_depth, 3);
    }

    #[test]
    fn every_non_root_node_has_exactly_one_incoming_link() {
        let tree = syntax(
            "Module",
            vec![
                syntax("Assign", vec![syntax("Name", vec![]), syntax("Constant", vec![])]),
                syntax("Expr", vec![syntax("Call", vec![])]),
            ],
        );
        let model = build_graph_model(Some(&tree)).expect("tree builds");

        assert_eq!(model.links.len(), model.nodes.len() - 1);
        let mut incoming = vec![0usize; model.nodes.len()];
        for link in &model.links {
            incoming[link.target as usize] += 1;
        }
        assert_eq!(incoming[0], 0);
        assert!(incoming.iter().skip(1).all(|&count| count == 1));
    }

    #[test]
    fn hierarchy_preorder_matches_flat_order() {
        let tree = syntax(
            "Module",
            vec![
                syntax("If", vec![syntax("Compare", vec![]), syntax("Expr", vec![])]),
                syntax("For", vec![syntax("Call", vec![])]),
            ],
        );
        let model = build_graph_model(Some(&tree)).expect("tree builds");

        let flat_ids = model.nodes.iter().map(|node| node.id).collect::<Vec<_>>();
        assert_eq!(model.hierarchy_preorder_ids(), flat_ids);
        assert!(flat_ids.windows(2).all(|pair| pair[0] + 1 == pair[1]));
    }

    #[test]
    fn rebuilding_the_same_tree_is_deterministic() {
        let tree = chain_fixture();
        let first = build_graph_model(Some(&tree)).expect("tree builds");
        let second = build_graph_model(Some(&tree)).expect("tree builds");

        for (a, b) in first.nodes.iter().zip(second.nodes.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.name, b.name);
            assert_eq!(a.depth, b.depth);
            assert_eq!((a.x, a.y), (b.x, b.y));
        }
        assert_eq!(first.links, second.links);
    }

    #[test]
    fn missing_root_is_an_empty_tree_error() {
        let error = build_graph_model(None).expect_err("no root, no graph");
        assert!(error.to_string().contains("no root"));
    }

    #[test]
    fn attributes_are_copied_onto_both_representations() {
        let mut tree = chain_fixture();
        tree.children[0]
            .attributes
            .insert("name".to_owned(), Value::String("greet".to_owned()));

        let model = build_graph_model(Some(&tree)).expect("tree builds");
        assert_eq!(
            model.nodes[1].attributes.get("name"),
            Some(&Value::String("greet".to_owned()))
        );
        assert_eq!(
            model.hierarchy.children[0].attributes.get("name"),
            Some(&Value::String("greet".to_owned()))
        );
    }

    #[test]
    fn depths_measure_distance_from_root() {
        let model = build_graph_model(Some(&chain_fixture())).expect("tree builds");
        assert_eq!(
            model.nodes.iter().map(|node| node.depth).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }
}
