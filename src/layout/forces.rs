use eframe::egui::Vec2;

use crate::util::golden_direction;

use super::quadtree::QuadTree;
use super::{SimLink, SimNode};

pub const CHARGE_STRENGTH: f32 = -1000.0;
pub const CHARGE_DISTANCE_MIN: f32 = 40.0;
pub const CHARGE_DISTANCE_MAX: f32 = 400.0;
pub const CENTER_STRENGTH: f32 = 0.03;
pub const COLLISION_STRENGTH: f32 = 0.8;

const JIGGLE: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
pub struct TickContext {
    pub alpha: f32,
    pub center: Vec2,
}

/// One physical contribution to the layout.
///
/// `apply` reads the current node and link state and adds the velocity change it
/// wants for each node into `deltas` (indexed like `nodes`). It never mutates nodes.
pub trait Force {
    fn name(&self) -> &'static str;

    fn apply(&self, nodes: &[SimNode], links: &[SimLink], context: &TickContext, deltas: &mut [Vec2]);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LinkForce;

impl SimLink {
    pub fn distance(&self) -> f32 {
        (180.0 - self.weight as f32 * 6.0).max(100.0)
    }

    pub fn strength(&self) -> f32 {
        (self.weight as f32 / 15.0).min(0.9)
    }
}

impl Force for LinkForce {
    fn name(&self) -> &'static str {
        "link"
    }

    fn apply(&self, nodes: &[SimNode], links: &[SimLink], context: &TickContext, deltas: &mut [Vec2]) {
        let node_count = nodes.len();
        let mut degree = vec![0u32; node_count];
        for link in links {
            if link.source < node_count && link.target < node_count {
                degree[link.source] += 1;
                degree[link.target] += 1;
            }
        }

        for link in links {
            let (source, target) = (link.source, link.target);
            if source >= node_count || target >= node_count || source == target {
                continue;
            }

            let predicted_source = nodes[source].position + nodes[source].velocity + deltas[source];
            let predicted_target = nodes[target].position + nodes[target].velocity + deltas[target];
            let mut delta = predicted_target - predicted_source;
            if delta.length_sq() <= JIGGLE * JIGGLE {
                delta = golden_direction(source, target) * JIGGLE;
            }

            let length = delta.length();
            let stretch = (length - link.distance()) / length * context.alpha * link.strength();
            let correction = delta * stretch;

            let bias = degree[source] as f32 / (degree[source] + degree[target]) as f32;
            deltas[target] -= correction * bias;
            deltas[source] += correction * (1.0 - bias);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ChargeForce {
    pub strength: f32,
    pub distance_min: f32,
    pub distance_max: f32,
    pub theta: f32,
}

impl Default for ChargeForce {
    fn default() -> Self {
        Self {
            strength: CHARGE_STRENGTH,
            distance_min: CHARGE_DISTANCE_MIN,
            distance_max: CHARGE_DISTANCE_MAX,
            theta: 0.9,
        }
    }
}

impl ChargeForce {
    pub fn with_theta(theta: f32) -> Self {
        Self {
            theta,
            ..Self::default()
        }
    }

    fn pull(&self, point: Vec2, other: Vec2, mass: f32, alpha: f32, salt: (usize, usize)) -> Vec2 {
        let mut offset = other - point;
        let mut distance_sq = offset.length_sq();
        if distance_sq >= self.distance_max * self.distance_max {
            return Vec2::ZERO;
        }

        if distance_sq <= JIGGLE * JIGGLE {
            offset = golden_direction(salt.0, salt.1) * JIGGLE;
            distance_sq = offset.length_sq();
        }

        let min_sq = self.distance_min * self.distance_min;
        if distance_sq < min_sq {
            distance_sq = (min_sq * distance_sq).sqrt();
        }

        offset * (self.strength * alpha * mass / distance_sq)
    }

    fn accumulate(
        &self,
        tree: &QuadTree,
        id: usize,
        index: usize,
        positions: &[Vec2],
        alpha: f32,
        delta: &mut Vec2,
    ) {
        let cell = tree.cell(id);
        let point = positions[index];
        if cell.gap_sq_to_point(point) >= self.distance_max * self.distance_max {
            return;
        }

        if tree.is_leaf(id) {
            for &other in tree.items(id) {
                if other != index {
                    *delta += self.pull(point, positions[other], 1.0, alpha, (index, other));
                }
            }
            return;
        }

        let distance_sq = (cell.centroid - point).length_sq();
        let far_enough = cell.side * cell.side < self.theta * self.theta * distance_sq;
        if !cell.contains(point) && far_enough {
            *delta += self.pull(point, cell.centroid, cell.mass, alpha, (index, id));
            return;
        }

        for child in tree.children(id) {
            self.accumulate(tree, child, index, positions, alpha, delta);
        }
    }
}

impl Force for ChargeForce {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn apply(&self, nodes: &[SimNode], _links: &[SimLink], context: &TickContext, deltas: &mut [Vec2]) {
        let positions = nodes.iter().map(|node| node.position).collect::<Vec<_>>();
        let Some(tree) = QuadTree::build(&positions, |_| 0.0) else {
            return;
        };

        for (index, delta) in deltas.iter_mut().enumerate().take(nodes.len()) {
            self.accumulate(&tree, QuadTree::ROOT, index, &positions, context.alpha, delta);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CenterForce {
    pub strength: f32,
}

impl Default for CenterForce {
    fn default() -> Self {
        Self {
            strength: CENTER_STRENGTH,
        }
    }
}

impl Force for CenterForce {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&self, nodes: &[SimNode], _links: &[SimLink], context: &TickContext, deltas: &mut [Vec2]) {
        for (node, delta) in nodes.iter().zip(deltas.iter_mut()) {
            *delta += (context.center - node.position) * (self.strength * context.alpha);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CollisionForce {
    pub strength: f32,
}

impl Default for CollisionForce {
    fn default() -> Self {
        Self {
            strength: COLLISION_STRENGTH,
        }
    }
}

struct CollisionInput<'a> {
    predicted: &'a [Vec2],
    radii: &'a [f32],
}

impl CollisionForce {
    fn resolve_pair(&self, from: usize, to: usize, input: &CollisionInput<'_>, deltas: &mut [Vec2]) {
        let combined = input.radii[from] + input.radii[to];
        let mut offset = input.predicted[from] - input.predicted[to];
        let mut distance_sq = offset.length_sq();
        if distance_sq >= combined * combined {
            return;
        }

        if distance_sq <= JIGGLE * JIGGLE {
            offset = golden_direction(from, to) * JIGGLE;
            distance_sq = offset.length_sq();
        }

        let distance = distance_sq.sqrt();
        let push = offset * ((combined - distance) / distance * self.strength);
        let from_sq = input.radii[from] * input.radii[from];
        let to_sq = input.radii[to] * input.radii[to];
        let share = to_sq / (from_sq + to_sq);

        deltas[from] += push * share;
        deltas[to] -= push * (1.0 - share);
    }

    fn accumulate_pairs(
        &self,
        tree: &QuadTree,
        a: usize,
        b: usize,
        input: &CollisionInput<'_>,
        deltas: &mut [Vec2],
    ) {
        let (cell_a, cell_b) = (tree.cell(a), tree.cell(b));
        let reach = cell_a.max_radius + cell_b.max_radius;
        if cell_a.gap_sq_to(cell_b) >= reach * reach {
            return;
        }

        match (tree.is_leaf(a), tree.is_leaf(b)) {
            (true, true) if a == b => {
                let items = tree.items(a);
                for (offset, &from) in items.iter().enumerate() {
                    for &to in &items[offset + 1..] {
                        self.resolve_pair(from, to, input, deltas);
                    }
                }
            }
            (true, true) => {
                for &from in tree.items(a) {
                    for &to in tree.items(b) {
                        self.resolve_pair(from, to, input, deltas);
                    }
                }
            }
            _ if a == b => {
                let children = tree.children(a).collect::<Vec<_>>();
                for (first, &child) in children.iter().enumerate() {
                    self.accumulate_pairs(tree, child, child, input, deltas);
                    for &other in &children[first + 1..] {
                        self.accumulate_pairs(tree, child, other, input, deltas);
                    }
                }
            }
            (false, leaf_b) if leaf_b || cell_a.side >= cell_b.side => {
                for child in tree.children(a) {
                    self.accumulate_pairs(tree, child, b, input, deltas);
                }
            }
            _ => {
                for child in tree.children(b) {
                    self.accumulate_pairs(tree, a, child, input, deltas);
                }
            }
        }
    }
}

impl Force for CollisionForce {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn apply(&self, nodes: &[SimNode], _links: &[SimLink], _context: &TickContext, deltas: &mut [Vec2]) {
        let predicted = nodes
            .iter()
            .map(|node| node.position + node.velocity)
            .collect::<Vec<_>>();
        let radii = nodes.iter().map(SimNode::collision_radius).collect::<Vec<_>>();
        let Some(tree) = QuadTree::build(&predicted, |index| radii[index]) else {
            return;
        };

        let input = CollisionInput {
            predicted: &predicted,
            radii: &radii,
        };
        self.accumulate_pairs(&tree, QuadTree::ROOT, QuadTree::ROOT, &input, deltas);
    }
}
