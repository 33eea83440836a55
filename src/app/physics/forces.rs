use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;
use crate::app::graph::{GraphLink, GraphNode};

/// Direction fallback for coincident points; a stable per-pair angle keeps
/// repeated ticks from oscillating.
fn separation_direction(delta: Vec2, from: usize, to: usize) -> Vec2 {
    let distance = delta.length();
    if distance > 0.0001 {
        delta / distance
    } else {
        let angle =
            ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    }
}

fn repulsion_between(point_a: Vec2, point_b: Vec2, strength: f32) -> Vec2 {
    let delta = point_a - point_b;
    let distance_sq = delta.length_sq().max(1.0);
    let distance = distance_sq.sqrt();
    (delta / distance) * (strength / distance_sq)
}

/// Barnes-Hut many-body pass: exact within leaves, center-of-mass
/// approximation for far quadrants. `strength` is the positive repulsion
/// magnitude (the negated charge), already scaled by alpha.
pub(super) fn accumulate_repulsion(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other != index {
                *force += repulsion_between(point, positions[other], strength);
            }
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance_sq = delta.length_sq().max(1.0);
    let distance = distance_sq.sqrt();
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < theta
        && node.mass > 1.0;

    if can_approximate {
        *force += (delta / distance) * ((strength * node.mass) / distance_sq);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion(child, index, positions, strength, theta, force);
    }
}

/// Spring force toward the target link separation: the further a linked
/// pair sits from `link_distance`, the harder it is pulled back.
pub(super) fn accumulate_link_forces(
    nodes: &[GraphNode],
    links: &[GraphLink],
    link_distance: f32,
    strength: f32,
    forces: &mut [Vec2],
) {
    for link in links {
        let source = link.source as usize;
        let target = link.target as usize;
        if source >= nodes.len() || target >= nodes.len() || source == target {
            continue;
        }

        let delta = nodes[target].pos() - nodes[source].pos();
        let distance = delta.length().max(0.0001);
        let direction = delta / distance;
        let correction = direction * ((distance - link_distance) * strength * 0.5);

        forces[source] += correction;
        forces[target] -= correction;
    }
}

/// Shifts every node so the layout centroid drifts toward the origin.
/// Positional, like a weak anchor; not part of the velocity integration.
pub(super) fn apply_center_pull(nodes: &mut [GraphNode], strength: f32) {
    if nodes.is_empty() {
        return;
    }

    let mut centroid = Vec2::ZERO;
    for node in nodes.iter() {
        centroid += node.pos();
    }
    centroid /= nodes.len() as f32;

    let shift = centroid * strength.clamp(0.0, 1.0);
    if shift.length_sq() <= 0.000_001 {
        return;
    }

    for node in nodes.iter_mut() {
        node.set_pos(node.pos() - shift);
    }
}

/// Hard minimum-separation pass, run after the soft forces: overlapping
/// pairs are pushed apart positionally, half the overlap each.
pub(super) fn resolve_collisions(
    nodes: &mut [GraphNode],
    positions: &[Vec2],
    quadtree: &QuadNode,
    min_separation: f32,
) {
    for index in 0..positions.len() {
        let point = positions[index];
        quadtree.for_each_within(point, min_separation, &mut |other| {
            if other <= index {
                return;
            }

            let delta = point - positions[other];
            let distance = delta.length();
            if distance >= min_separation {
                return;
            }

            let direction = separation_direction(delta, index, other);
            let push = direction * ((min_separation - distance) * 0.5);
            nodes[index].set_pos(nodes[index].pos() + push);
            nodes[other].set_pos(nodes[other].pos() - push);
        });
    }
}
