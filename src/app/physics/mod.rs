mod forces;
mod quadtree;

use eframe::egui::Vec2;

use crate::app::graph::{GraphLink, GraphNode};
use forces::{
    accumulate_link_forces, accumulate_repulsion, apply_center_pull, resolve_collisions,
};
use quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.75;
const MAX_SPEED: f32 = 30.0;

/// Kinetic-energy floor below which the layout counts as settled.
pub const ALPHA_MIN: f32 = 0.001;
/// Per-tick energy decay; reaches `ALPHA_MIN` in roughly 300 ticks.
pub const ALPHA_DECAY: f32 = 0.0228;
/// Energy restored while a node is being dragged.
pub const REHEAT_ALPHA: f32 = 0.45;
/// Wall-clock ceiling: if the simulation has not settled by then, it is
/// declared settled anyway so the auto-fit never waits indefinitely.
pub const SETTLE_WATCHDOG_SECS: f64 = 1.0;

#[derive(Clone, Copy, Debug)]
pub struct SimParams {
    /// Target separation for linked pairs.
    pub link_distance: f32,
    pub link_strength: f32,
    /// Many-body charge; negative repels.
    pub charge_strength: f32,
    /// Fraction of the centroid offset removed per tick.
    pub center_strength: f32,
    /// Half the hard minimum separation between node centers.
    pub collision_radius: f32,
    pub velocity_decay: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            link_distance: 100.0,
            link_strength: 0.12,
            charge_strength: -400.0,
            center_strength: 0.05,
            collision_radius: 24.0,
            velocity_decay: 0.8,
        }
    }
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    forces: Vec<Vec2>,
}

/// Cooperative force simulation: one `step` per frame (or per test-harness
/// iteration), energy decaying toward `ALPHA_MIN`. Never blocks.
pub struct Simulation {
    alpha: f32,
    settled: bool,
    started_at: Option<f64>,
    pinned: Option<usize>,
    scratch: Scratch,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            alpha: 0.0,
            settled: true,
            started_at: None,
            pinned: None,
            scratch: Scratch::default(),
        }
    }

    /// Resets energy for a freshly built model. `now` anchors the watchdog.
    pub fn restart(&mut self, now: f64) {
        self.alpha = 1.0;
        self.settled = false;
        self.started_at = Some(now);
        self.pinned = None;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn pin(&mut self, index: usize) {
        self.pinned = Some(index);
    }

    pub fn unpin(&mut self) {
        self.pinned = None;
    }

    /// Keeps the simulation hot while a drag is in progress; also restarts
    /// the watchdog so the post-drag relaxation gets its own ceiling.
    pub fn reheat(&mut self, now: f64) {
        self.alpha = self.alpha.max(REHEAT_ALPHA);
        self.settled = false;
        self.started_at = Some(now);
    }

    /// Returns true exactly once when the simulation transitions to
    /// settled, either by energy decay or by the watchdog ceiling.
    pub fn poll_settled(&mut self, now: f64) -> bool {
        if self.settled {
            return false;
        }

        let timed_out = self
            .started_at
            .is_some_and(|started| now - started >= SETTLE_WATCHDOG_SECS);
        if self.alpha < ALPHA_MIN || timed_out {
            if timed_out && self.alpha >= ALPHA_MIN {
                log::debug!("force layout hit the settle watchdog, fitting early");
            }
            self.settled = true;
            return true;
        }

        false
    }

    /// Advances the simulation one tick: decay alpha, superpose link +
    /// many-body forces into velocities, integrate, pull the centroid
    /// toward the origin, then resolve hard collisions. A pinned node has
    /// its computed motion discarded after the fact. Returns whether
    /// anything is still moving.
    pub fn step(&mut self, nodes: &mut [GraphNode], links: &[GraphLink], params: &SimParams) -> bool {
        self.alpha += (0.0 - self.alpha) * ALPHA_DECAY;

        let node_count = nodes.len();
        if node_count < 2 {
            return false;
        }

        let pinned = self.pinned.filter(|&index| index < node_count);
        let pinned_pos = pinned.map(|index| nodes[index].pos());

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.positions.extend(nodes.iter().map(GraphNode::pos));
        scratch.forces.resize(node_count, Vec2::ZERO);
        scratch.forces.fill(Vec2::ZERO);

        let repulsion = -params.charge_strength * self.alpha;
        if let Some(tree) = QuadNode::build(&scratch.positions) {
            for (index, force) in scratch.forces.iter_mut().enumerate() {
                accumulate_repulsion(
                    &tree,
                    index,
                    &scratch.positions,
                    repulsion,
                    BARNES_HUT_THETA,
                    force,
                );
            }
        }

        accumulate_link_forces(
            nodes,
            links,
            params.link_distance,
            params.link_strength * self.alpha,
            &mut scratch.forces,
        );

        let mut any_motion = false;
        for (index, node) in nodes.iter_mut().enumerate() {
            let mut velocity = (node.velocity() + scratch.forces[index])
                * params.velocity_decay.clamp(0.0, 0.99);
            let speed_sq = velocity.length_sq();
            if speed_sq > MAX_SPEED * MAX_SPEED {
                velocity *= MAX_SPEED / speed_sq.sqrt();
            }

            node.set_velocity(velocity);
            node.set_pos(node.pos() + velocity);
            if velocity.length_sq() > 0.000_001 {
                any_motion = true;
            }
        }

        apply_center_pull(nodes, params.center_strength * self.alpha);

        scratch.positions.clear();
        scratch.positions.extend(nodes.iter().map(GraphNode::pos));
        if let Some(tree) = QuadNode::build(&scratch.positions) {
            resolve_collisions(
                nodes,
                &scratch.positions,
                &tree,
                params.collision_radius * 2.0,
            );
        }

        if let (Some(index), Some(pos)) = (pinned, pinned_pos) {
            nodes[index].set_pos(pos);
            nodes[index].set_velocity(Vec2::ZERO);
        }

        any_motion && self.alpha >= ALPHA_MIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::build_graph_model;
    use crate::parser::SyntaxNode;
    use std::collections::BTreeMap;

    fn syntax(name: &str, children: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode {
            id: 0,
            name: name.to_owned(),
            attributes: BTreeMap::new(),
            children,
        }
    }

    fn star_with_chains() -> SyntaxNode {
        syntax(
            "Module",
            vec![
                syntax("FunctionDef", vec![syntax("Return", vec![])]),
                syntax("Assign", vec![syntax("Constant", vec![])]),
                syntax("Expr", vec![syntax("Call", vec![])]),
            ],
        )
    }

    fn run_to_rest(sim: &mut Simulation, model: &mut crate::app::graph::GraphModel) {
        let params = SimParams::default();
        for _ in 0..400 {
            sim.step(&mut model.nodes, &model.links, &params);
        }
    }

    #[test]
    fn linked_pairs_settle_near_the_target_distance() {
        let tree = star_with_chains();
        let mut model = build_graph_model(Some(&tree)).expect("tree builds");
        let mut sim = Simulation::new();
        sim.restart(0.0);
        run_to_rest(&mut sim, &mut model);

        let params = SimParams::default();
        for link in &model.links {
            let distance = (model.nodes[link.source as usize].pos()
                - model.nodes[link.target as usize].pos())
            .length();
            assert!(
                (distance - params.link_distance).abs() <= 50.0,
                "link {}->{} settled at {distance}",
                link.source,
                link.target
            );
        }
    }

    #[test]
    fn no_two_centers_end_up_inside_the_collision_radius() {
        let tree = syntax(
            "Module",
            (0..8).map(|_| syntax("Expr", vec![])).collect(),
        );
        let mut model = build_graph_model(Some(&tree)).expect("tree builds");
        let mut sim = Simulation::new();
        sim.restart(0.0);
        run_to_rest(&mut sim, &mut model);

        let params = SimParams::default();
        for a in 0..model.nodes.len() {
            for b in (a + 1)..model.nodes.len() {
                let distance = (model.nodes[a].pos() - model.nodes[b].pos()).length();
                assert!(
                    distance >= params.collision_radius,
                    "nodes {a} and {b} overlap at {distance}"
                );
            }
        }
    }

    #[test]
    fn pinned_node_discards_computed_motion() {
        let tree = star_with_chains();
        let mut model = build_graph_model(Some(&tree)).expect("tree builds");
        let mut sim = Simulation::new();
        sim.restart(0.0);

        let held = eframe::egui::vec2(140.0, -60.0);
        model.nodes[1].set_pos(held);
        sim.pin(1);

        let params = SimParams::default();
        for _ in 0..10 {
            sim.step(&mut model.nodes, &model.links, &params);
        }

        assert_eq!(model.nodes[1].pos(), held);
        assert_eq!(model.nodes[1].velocity(), eframe::egui::Vec2::ZERO);
    }

    #[test]
    fn energy_decays_to_settled_and_reheat_restores_it() {
        let tree = star_with_chains();
        let mut model = build_graph_model(Some(&tree)).expect("tree builds");
        let mut sim = Simulation::new();
        sim.restart(0.0);
        run_to_rest(&mut sim, &mut model);

        assert!(sim.alpha() < ALPHA_MIN);
        assert!(sim.poll_settled(0.1));
        assert!(!sim.poll_settled(0.1), "settle fires only once");

        sim.reheat(0.2);
        assert!(!sim.is_settled());
        assert!((sim.alpha() - REHEAT_ALPHA).abs() < f32::EPSILON);
    }

    #[test]
    fn watchdog_settles_a_simulation_that_never_calms_down() {
        let mut sim = Simulation::new();
        sim.restart(0.0);

        assert!(!sim.poll_settled(0.5), "still within the ceiling");
        assert!(sim.poll_settled(1.2), "ceiling elapsed");
        assert!(sim.is_settled());
    }
}
