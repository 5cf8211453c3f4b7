use std::fmt;

use eframe::egui::{Color32, Vec2};
use tracing::{info, warn};

use crate::camera::{CameraController, CameraTransform};
use crate::config::DramatisConfig;
use crate::highlight::{HighlightCoordinator, LinkState, NodeState, VisualState};
use crate::ingest::UpdateEvent;
use crate::layout::{Simulation, SyncKind};
use crate::model::{AnalysisResult, BatchOutcome, CharacterSummary, Graph, interaction_summary};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running { batch_index: u32, total_batches: u32 },
    Complete,
    Failed(String),
}

impl SessionStatus {
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("waiting for analysis"),
            Self::Running {
                batch_index,
                total_batches: 0,
            } => write!(f, "batch {batch_index}"),
            Self::Running {
                batch_index,
                total_batches,
            } => write!(f, "batch {batch_index}/{total_batches}"),
            Self::Complete => f.write_str("complete"),
            Self::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    StatusOnly,
    GraphUpdated {
        kind: SyncKind,
        nodes: usize,
        links: usize,
    },
    BatchIgnored,
    Ignored,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeFrame {
    pub name: String,
    pub position: Vec2,
    pub radius: f32,
    pub color: Color32,
    pub importance: u8,
    pub state: NodeState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkFrame {
    pub source: String,
    pub target: String,
    pub from: Vec2,
    pub to: Vec2,
    pub weight: u32,
    pub stroke_width: f32,
    pub state: LinkState,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
    pub transform: CameraTransform,
    pub nodes: Vec<NodeFrame>,
    pub links: Vec<LinkFrame>,
    pub highlight_active: bool,
}

pub struct AnalysisSession {
    config: DramatisConfig,
    graph: Graph,
    simulation: Simulation,
    camera: CameraController,
    highlight: HighlightCoordinator,
    summary: Vec<CharacterSummary>,
    status: SessionStatus,
    message: Option<String>,
    viewport: Vec2,
    dragging: Option<String>,
    settle_fit_pending: bool,
}

impl AnalysisSession {
    pub fn new(config: DramatisConfig, viewport: Vec2) -> Self {
        let graph = if config.palette.sticky_colors {
            Graph::with_sticky_colors()
        } else {
            Graph::new()
        };

        Self {
            simulation: Simulation::new(config.simulation, viewport),
            camera: CameraController::new(config.camera),
            config,
            graph,
            highlight: HighlightCoordinator::new(),
            summary: Vec::new(),
            status: SessionStatus::Idle,
            message: None,
            viewport,
            dragging: None,
            settle_fit_pending: false,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn summary(&self) -> &[CharacterSummary] {
        &self.summary
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn selection(&self) -> Option<&str> {
        self.highlight.selection()
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.simulation.set_viewport(viewport);
    }

    pub fn handle_event(&mut self, event: UpdateEvent, now: f64) -> EventOutcome {
        if self.status.is_ended() {
            warn!(kind = event.kind(), "event after session end ignored");
            return EventOutcome::Ignored;
        }

        match event {
            UpdateEvent::Progress { message } => {
                if self.status == SessionStatus::Idle {
                    self.status = SessionStatus::Running {
                        batch_index: 0,
                        total_batches: 0,
                    };
                }
                self.message = Some(message);
                EventOutcome::StatusOnly
            }
            UpdateEvent::BatchComplete {
                batch_index,
                total_batches,
                data,
            } => {
                self.status = SessionStatus::Running {
                    batch_index,
                    total_batches,
                };
                self.apply(&data, now)
            }
            UpdateEvent::AnalysisComplete { data } => {
                let outcome = self.apply(&data, now);
                self.status = SessionStatus::Complete;
                info!(
                    nodes = self.graph.nodes().len(),
                    links = self.graph.links().len(),
                    "analysis complete"
                );
                outcome
            }
            UpdateEvent::Error { message } => {
                warn!(%message, "analysis failed, keeping partial graph");
                self.status = SessionStatus::Failed(message);
                EventOutcome::StatusOnly
            }
        }
    }

    fn apply(&mut self, data: &AnalysisResult, now: f64) -> EventOutcome {
        let BatchOutcome::Applied { nodes, links } = self.graph.apply_batch(data) else {
            warn!("incomplete snapshot ignored");
            return EventOutcome::BatchIgnored;
        };

        let kind = self.simulation.sync(&self.graph);
        self.summary = interaction_summary(&self.graph);
        self.camera
            .auto_fit(self.simulation.nodes(), self.viewport, true, now);
        self.settle_fit_pending = true;

        info!(?kind, nodes, links, "graph updated");
        EventOutcome::GraphUpdated { kind, nodes, links }
    }

    /// Advances layout and camera to `now`. Returns whether another frame is needed.
    pub fn tick(&mut self, now: f64) -> bool {
        let stepped = self.simulation.step();

        if self.settle_fit_pending
            && self.dragging.is_none()
            && self.simulation.alpha() < self.config.simulation.settle_alpha
        {
            self.settle_fit_pending = false;
            self.camera
                .auto_fit(self.simulation.nodes(), self.viewport, false, now);
        }

        self.camera.tick(now);
        stepped || self.camera.is_animating()
    }

    pub fn set_highlight(&mut self, name: Option<&str>) -> bool {
        self.highlight.set_highlight(name)
    }

    pub fn visual_state(&self) -> VisualState {
        self.highlight.visual_state(&self.graph)
    }

    pub fn begin_drag(&mut self, name: &str, pointer_world: Vec2) -> bool {
        if !self.simulation.begin_drag(name, pointer_world) {
            return false;
        }
        self.dragging = Some(name.to_owned());
        self.settle_fit_pending = false;
        true
    }

    pub fn drag_to(&mut self, pointer_world: Vec2) -> bool {
        let Some(name) = self.dragging.as_deref() else {
            return false;
        };
        self.simulation.drag_to(name, pointer_world)
    }

    pub fn end_drag(&mut self) -> bool {
        let Some(name) = self.dragging.take() else {
            return false;
        };
        self.simulation.end_drag(&name)
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn node_at(&self, world: Vec2) -> Option<&str> {
        self.simulation
            .nodes()
            .iter()
            .rev()
            .find(|node| (node.position - world).length() <= node.radius)
            .map(|node| node.id.as_str())
    }

    pub fn shutdown(&mut self) {
        self.simulation.stop();
        self.dragging = None;
        self.settle_fit_pending = false;
    }

    pub fn frame(&self) -> RenderFrame {
        let visual = self.visual_state();

        let nodes = self
            .graph
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let position = self.simulation.position(&node.id)?;
                Some(NodeFrame {
                    name: node.id.clone(),
                    position,
                    radius: node.radius,
                    color: node.color,
                    importance: node.importance,
                    state: visual.node(index),
                })
            })
            .collect();

        let links = self
            .graph
            .links()
            .iter()
            .enumerate()
            .filter_map(|(index, link)| {
                let from = self.simulation.position(&link.source)?;
                let to = self.simulation.position(&link.target)?;
                Some(LinkFrame {
                    source: link.source.clone(),
                    target: link.target.clone(),
                    from,
                    to,
                    weight: link.weight,
                    stroke_width: link.stroke_width,
                    state: visual.link(index),
                })
            })
            .collect();

        RenderFrame {
            transform: self.camera.current(),
            nodes,
            links,
            highlight_active: visual.is_active(),
        }
    }
}
