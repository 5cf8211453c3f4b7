use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::config::SimulationConfig;
use crate::model::Graph;
use crate::util::{golden_direction, label_len, stable_jitter};

mod forces;
mod quadtree;

pub use forces::{
    CENTER_STRENGTH, CHARGE_DISTANCE_MAX, CHARGE_DISTANCE_MIN, CHARGE_STRENGTH, COLLISION_STRENGTH,
    CenterForce, ChargeForce, CollisionForce, Force, LinkForce, TickContext,
};

const SEED_JITTER: f32 = 30.0;

#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: Option<Vec2>,
    pub radius: f32,
    pub label_len: f32,
}

impl SimNode {
    pub fn new(id: String, position: Vec2, radius: f32) -> Self {
        let label_len = label_len(&id);
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            pinned: None,
            radius,
            label_len,
        }
    }

    pub fn collision_radius(&self) -> f32 {
        (self.radius + 40.0).max(self.label_len * 4.0 + 30.0)
    }

    pub fn boundary_margin(&self) -> f32 {
        (self.radius + 30.0).max(self.label_len * 3.0 + 20.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
    pub weight: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncKind {
    NewGraph,
    InPlace,
}

pub fn default_forces(config: &SimulationConfig) -> Vec<Box<dyn Force>> {
    vec![
        Box::new(LinkForce),
        Box::new(ChargeForce::with_theta(config.charge_theta)),
        Box::new(CenterForce::default()),
        Box::new(CollisionForce::default()),
    ]
}

fn clamp_axis(value: f32, margin: f32, extent: f32) -> f32 {
    let low = margin;
    let high = extent - margin;
    if !value.is_finite() || low > high {
        return extent * 0.5;
    }
    value.clamp(low, high)
}

pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    index_by_id: HashMap<String, usize>,
    forces: Vec<Box<dyn Force>>,
    config: SimulationConfig,
    viewport: Vec2,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    synced_once: bool,
    ticks: u64,
    deltas: Vec<Vec2>,
}

impl Simulation {
    pub fn new(config: SimulationConfig, viewport: Vec2) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            index_by_id: HashMap::new(),
            forces: default_forces(&config),
            config,
            viewport,
            alpha: 1.0,
            alpha_target: 0.0,
            running: false,
            synced_once: false,
            ticks: 0,
            deltas: Vec::new(),
        }
    }

    pub fn with_forces(mut self, forces: Vec<Box<dyn Force>>) -> Self {
        self.forces = forces;
        self
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.node(id).map(|node| node.position)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn force_names(&self) -> Vec<&'static str> {
        self.forces.iter().map(|force| force.name()).collect()
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        if !self.nodes.is_empty() {
            self.running = true;
        }
    }

    fn seed_position(&self, id: &str, index: usize, graph: &Graph, prior: &HashMap<String, Vec2>) -> Vec2 {
        let mut anchor_sum = Vec2::ZERO;
        let mut anchor_count = 0usize;
        for link in graph.links() {
            if let Some(other) = link.other(id)
                && let Some(position) = prior.get(other)
            {
                anchor_sum += *position;
                anchor_count += 1;
            }
        }

        let jitter = stable_jitter(id) * SEED_JITTER;
        if anchor_count > 0 {
            return anchor_sum / anchor_count as f32 + jitter;
        }

        let center = self.viewport * 0.5;
        let ring = self.viewport.min_elem().max(1.0) * 0.25;
        center + golden_direction(index, 0) * ring + jitter
    }

    pub fn sync(&mut self, graph: &Graph) -> SyncKind {
        let kind = if !self.synced_once || graph.nodes().len() != self.nodes.len() {
            SyncKind::NewGraph
        } else {
            SyncKind::InPlace
        };

        let prior_positions = self
            .nodes
            .iter()
            .map(|node| (node.id.clone(), node.position))
            .collect::<HashMap<_, _>>();
        let mut prior_nodes = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect::<HashMap<_, _>>();

        let mut next_nodes = Vec::with_capacity(graph.nodes().len());
        let mut index_by_id = HashMap::with_capacity(graph.nodes().len());
        let mut seeded = 0usize;
        for (index, character) in graph.nodes().iter().enumerate() {
            let node = match prior_nodes.remove(&character.id) {
                Some(mut node) => {
                    node.radius = character.radius;
                    node
                }
                None => {
                    seeded += 1;
                    let position = self.seed_position(&character.id, index, graph, &prior_positions);
                    SimNode::new(character.id.clone(), position, character.radius)
                }
            };
            index_by_id.insert(node.id.clone(), index);
            next_nodes.push(node);
        }

        self.links = graph
            .links()
            .iter()
            .filter_map(|link| {
                let source = *index_by_id.get(&link.source)?;
                let target = *index_by_id.get(&link.target)?;
                Some(SimLink {
                    source,
                    target,
                    weight: link.weight,
                })
            })
            .collect();
        self.nodes = next_nodes;
        self.index_by_id = index_by_id;
        self.synced_once = true;

        match kind {
            SyncKind::NewGraph => self.alpha = 1.0,
            SyncKind::InPlace => self.alpha = self.alpha.max(self.config.update_alpha),
        }
        self.running = !self.nodes.is_empty();

        debug!(
            ?kind,
            nodes = self.nodes.len(),
            links = self.links.len(),
            seeded,
            removed = prior_nodes.len(),
            "simulation synced"
        );
        kind
    }

    /// Advances the simulation by one tick. Returns `false` when it is at rest.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let context = TickContext {
            alpha: self.alpha,
            center: self.viewport * 0.5,
        };

        for force in &self.forces {
            self.deltas.clear();
            self.deltas.resize(self.nodes.len(), Vec2::ZERO);
            force.apply(&self.nodes, &self.links, &context, &mut self.deltas);
            for (node, delta) in self.nodes.iter_mut().zip(&self.deltas) {
                node.velocity += *delta;
            }
        }

        let keep = 1.0 - self.config.velocity_decay;
        let viewport = self.viewport;
        for node in &mut self.nodes {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Vec2::ZERO;
            } else {
                node.velocity *= keep;
                node.position += node.velocity;
            }

            let margin = node.boundary_margin();
            node.position = vec2(
                clamp_axis(node.position.x, margin, viewport.x),
                clamp_axis(node.position.y, margin, viewport.y),
            );
        }

        self.ticks += 1;
        if self.alpha < self.config.alpha_min {
            self.running = false;
            debug!(ticks = self.ticks, "layout settled");
        }
        true
    }

    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.running = !self.nodes.is_empty();
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.alpha_target = 0.0;
    }

    pub fn begin_drag(&mut self, id: &str, pointer: Vec2) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        self.nodes[index].pinned = Some(pointer);
        self.alpha_target = self.config.drag_alpha_target;
        self.running = true;
        true
    }

    pub fn drag_to(&mut self, id: &str, pointer: Vec2) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        self.nodes[index].pinned = Some(pointer);
        true
    }

    pub fn end_drag(&mut self, id: &str) -> bool {
        self.alpha_target = 0.0;
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        self.nodes[index].pinned = None;
        true
    }
}
