use eframe::egui::{Pos2, Rect};

use super::build::GraphNode;
use crate::app::render_utils::{node_radius, screen_radius};
use crate::app::viewport::ViewportTransform;

/// Pointer gesture state for the canvas. Selection is deliberately not a
/// variant here: it is an independent axis that survives hover and drag
/// changes, so it lives next to this enum rather than inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum PointerState {
    Idle,
    Hovering(usize),
    Dragging { node: usize, last_pointer: Pos2 },
}

impl PointerState {
    /// Hover transitions: enter a node circle, leave it, or move between
    /// circles. A drag in progress is never disturbed by hover changes.
    pub(in crate::app) fn on_hover(self, hit: Option<usize>) -> Self {
        match (self, hit) {
            (Self::Dragging { .. }, _) => self,
            (_, Some(index)) => Self::Hovering(index),
            (_, None) => Self::Idle,
        }
    }

    /// A primary-button drag that starts on a node grabs it; anywhere else
    /// the gesture belongs to the viewport pan and the state is unchanged.
    pub(in crate::app) fn on_drag_start(self, hit: Option<usize>, pointer: Pos2) -> Self {
        match hit {
            Some(node) => Self::Dragging {
                node,
                last_pointer: pointer,
            },
            None => self,
        }
    }

    /// Release: back to hovering whatever is under the cursor.
    pub(in crate::app) fn on_release(self, hit: Option<usize>) -> Self {
        match hit {
            Some(index) => Self::Hovering(index),
            None => Self::Idle,
        }
    }

    pub(in crate::app) fn dragged_node(self) -> Option<usize> {
        match self {
            Self::Dragging { node, .. } => Some(node),
            _ => None,
        }
    }

    pub(in crate::app) fn hovered_node(self) -> Option<usize> {
        match self {
            Self::Hovering(index) => Some(index),
            Self::Dragging { node, .. } => Some(node),
            Self::Idle => None,
        }
    }
}

/// Replaces any prior selection; at most one node is ever selected.
pub(in crate::app) fn select_node(selected: &mut Option<u32>, id: u32) {
    *selected = Some(id);
}

/// Relative drag: the node follows the pointer delta converted into world
/// units, so it tracks the cursor 1:1 under any zoom or pan.
pub(in crate::app) fn apply_drag_delta(
    node: &mut GraphNode,
    last_pointer: Pos2,
    pointer: Pos2,
    scale: f32,
) {
    let delta = (pointer - last_pointer) / scale.max(f32::EPSILON);
    node.set_pos(node.pos() + delta);
}

/// Screen-space hit test against node circles; the closest center wins
/// when circles overlap.
pub(in crate::app) fn hit_test(
    nodes: &[GraphNode],
    transform: ViewportTransform,
    rect: Rect,
    pointer: Pos2,
) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let center = transform.world_to_screen(rect, node.pos());
            let radius = screen_radius(node_radius(node.depth), transform.scale);
            let distance = center.distance(pointer);
            (distance <= radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
