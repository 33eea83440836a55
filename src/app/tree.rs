use eframe::egui::{Vec2, vec2};

use crate::app::graph::{GraphNode, HierarchyNode};

const TOP_MARGIN: f32 = 40.0;
const BOTTOM_MARGIN: f32 = 30.0;
const SIDE_MARGIN: f32 = 24.0;

/// Deterministic top-down placement of one hierarchy: positions indexed by
/// node id, plus one cubic curve per parent→child edge.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeLayout {
    pub positions: Vec<Vec2>,
    pub curves: Vec<EdgeCurve>,
}

/// Cubic Bézier for a parent→child edge; both control points sit on the
/// horizontal midline between the two nodes, which bends the edge smoothly
/// instead of drawing a straight diagonal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCurve {
    pub source: u32,
    pub target: u32,
    pub control_a: Vec2,
    pub control_b: Vec2,
}

impl TreeLayout {
    /// Writes the computed positions onto the flat node set and stops any
    /// residual force-engine motion.
    pub fn apply_to(&self, nodes: &mut [GraphNode]) {
        for node in nodes.iter_mut() {
            if let Some(&pos) = self.positions.get(node.id as usize) {
                node.set_pos(pos);
                node.set_velocity(Vec2::ZERO);
            }
        }
    }
}

fn count_nodes(node: &HierarchyNode) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}

fn count_leaves(node: &HierarchyNode) -> usize {
    if node.children.is_empty() {
        1
    } else {
        node.children.iter().map(count_leaves).sum()
    }
}

fn max_depth(node: &HierarchyNode) -> u32 {
    1 + node.children.iter().map(max_depth).max().unwrap_or(0)
}

fn place(
    node: &HierarchyNode,
    depth: u32,
    x0: f32,
    x1: f32,
    row_height: f32,
    positions: &mut [Vec2],
) {
    let x = (x0 + x1) * 0.5;
    let y = TOP_MARGIN + (depth as f32) * row_height;
    if let Some(slot) = positions.get_mut(node.id as usize) {
        *slot = vec2(x, y);
    }

    if node.children.is_empty() {
        return;
    }

    let total_leaves = count_leaves(node) as f32;
    let span = x1 - x0;
    let mut cursor = x0;
    for child in &node.children {
        let child_span = span * (count_leaves(child) as f32 / total_leaves);
        place(child, depth + 1, cursor, cursor + child_span, row_height, positions);
        cursor += child_span;
    }
}

fn collect_curves(node: &HierarchyNode, layout: &mut TreeLayout) {
    for child in &node.children {
        let parent_pos = layout.positions[node.id as usize];
        let child_pos = layout.positions[child.id as usize];
        let mid_y = (parent_pos.y + child_pos.y) * 0.5;
        layout.curves.push(EdgeCurve {
            source: node.id,
            target: child.id,
            control_a: vec2(parent_pos.x, mid_y),
            control_b: vec2(child_pos.x, mid_y),
        });
        collect_curves(child, layout);
    }
}

/// Two-pass tidy layout: horizontal slots proportional to subtree leaf
/// counts, vertical slots proportional to depth, spread over the given
/// canvas size. Pure function of the hierarchy — identical input always
/// yields identical coordinates. Output is in world space with the origin
/// at the canvas center (root at the top).
pub fn layout_tree(root: &HierarchyNode, width: f32, height: f32) -> TreeLayout {
    let width = width.max(1.0);
    let height = height.max(1.0);
    let node_count = count_nodes(root);

    let depth_rows = max_depth(root).saturating_sub(1).max(1) as f32;
    let row_height = (height - TOP_MARGIN - BOTTOM_MARGIN).max(1.0) / depth_rows;

    let mut layout = TreeLayout {
        positions: vec![Vec2::ZERO; node_count],
        curves: Vec::with_capacity(node_count.saturating_sub(1)),
    };

    place(
        root,
        0,
        SIDE_MARGIN,
        width - SIDE_MARGIN,
        row_height,
        &mut layout.positions,
    );

    // Shift into the centered world convention shared with the force mode,
    // then derive the edge curves from the final coordinates.
    let offset = vec2(width * 0.5, height * 0.5);
    for pos in &mut layout.positions {
        *pos -= offset;
    }
    collect_curves(root, &mut layout);

    layout
}
