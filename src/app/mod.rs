use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use eframe::egui::{Context, vec2};
use tracing::{info, warn};

use crate::config::DramatisConfig;
use crate::ingest::{EventSource, ReplayMessage, spawn_replay};
use crate::session::AnalysisSession;

mod graph;
mod render_utils;
mod ui;

const INITIAL_VIEWPORT: [f32; 2] = [1100.0, 800.0];

pub struct DramatisApp {
    source: EventSource,
    config: DramatisConfig,
    model: ViewModel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum StreamState {
    Streaming,
    Finished,
    Failed(String),
}

struct ViewModel {
    session: AnalysisSession,
    replay_rx: Option<Receiver<ReplayMessage>>,
    stream: StreamState,
    search: String,
    hovered: Option<String>,
}

impl DramatisApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: EventSource, config: DramatisConfig) -> Self {
        let model = ViewModel::start(&source, &config);
        Self {
            source,
            config,
            model,
        }
    }

    fn replay(&mut self) {
        info!(source = %self.source.label(), "restarting replay");
        let viewport = self.model.session.viewport();
        self.model.session.shutdown();
        self.model = ViewModel::start(&self.source, &self.config);
        self.model.session.set_viewport(viewport);
    }
}

impl ViewModel {
    fn start(source: &EventSource, config: &DramatisConfig) -> Self {
        let interval = Duration::from_millis(config.replay.batch_interval_ms);
        Self {
            session: AnalysisSession::new(config.clone(), vec2(INITIAL_VIEWPORT[0], INITIAL_VIEWPORT[1])),
            replay_rx: Some(spawn_replay(source.clone(), interval)),
            stream: StreamState::Streaming,
            search: String::new(),
            hovered: None,
        }
    }

    fn drain_replay(&mut self, now: f64) {
        let Some(rx) = self.replay_rx.take() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(ReplayMessage::Event(event)) => {
                    self.session.handle_event(event, now);
                }
                Ok(ReplayMessage::Finished) => {
                    self.stream = StreamState::Finished;
                    return;
                }
                Ok(ReplayMessage::Failed(error)) => {
                    self.stream = StreamState::Failed(error);
                    return;
                }
                Err(TryRecvError::Empty) => {
                    self.replay_rx = Some(rx);
                    return;
                }
                Err(TryRecvError::Disconnected) => {
                    warn!("replay worker disconnected");
                    self.stream = StreamState::Failed("Replay worker disconnected".to_owned());
                    return;
                }
            }
        }
    }
}

impl eframe::App for DramatisApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        self.model.drain_replay(now);

        let mut replay_requested = false;
        self.model.show(ctx, &self.source.label(), &mut replay_requested);

        if self.model.replay_rx.is_some() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        if replay_requested {
            self.replay();
            ctx.request_repaint();
        }
    }
}

impl StreamState {
    fn label(&self) -> Option<String> {
        match self {
            Self::Streaming => None,
            Self::Finished => Some("stream ended".to_owned()),
            Self::Failed(error) => Some(format!("stream error: {error}")),
        }
    }
}
