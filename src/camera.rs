use eframe::egui::{Vec2, vec2};

use crate::config::CameraConfig;
use crate::layout::SimNode;

const FOOTPRINT_PADDING: f32 = 20.0;
const MIN_CONTENT_SIZE: f32 = 100.0;

/// Maps world coordinates to screen coordinates: `screen = world * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CameraTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn world_to_screen(self, world: Vec2) -> Vec2 {
        world * self.scale + self.translate
    }

    pub fn screen_to_world(self, screen: Vec2) -> Vec2 {
        (screen - self.translate) / self.scale
    }

    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            translate: self.translate + (other.translate - self.translate) * t,
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }
}

pub fn approx_text_width(label_len: f32) -> f32 {
    label_len * 8.0 + 20.0
}

pub fn footprint_radius(node: &SimNode) -> f32 {
    node.radius.max(approx_text_width(node.label_len) / 2.0) + FOOTPRINT_PADDING
}

pub fn fit_transform(nodes: &[SimNode], viewport: Vec2, config: &CameraConfig) -> Option<CameraTransform> {
    let mut min = vec2(f32::INFINITY, f32::INFINITY);
    let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for node in nodes {
        if !node.position.x.is_finite() || !node.position.y.is_finite() {
            continue;
        }
        let reach = footprint_radius(node);
        min = min.min(node.position - vec2(reach, reach));
        max = max.max(node.position + vec2(reach, reach));
    }

    if !min.x.is_finite() || !max.x.is_finite() {
        return None;
    }

    let center = (min + max) * 0.5;
    let content = (max - min).max(vec2(MIN_CONTENT_SIZE, MIN_CONTENT_SIZE));
    let available = (viewport - vec2(config.padding, config.padding) * 2.0).max(vec2(1.0, 1.0));
    let scale = (available.x / content.x)
        .min(available.y / content.y)
        .min(config.max_scale);

    Some(CameraTransform {
        translate: viewport * 0.5 - center * scale,
        scale,
    })
}

fn ease_cubic_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Clone, Copy, Debug)]
struct CameraAnimation {
    from: Option<CameraTransform>,
    to: CameraTransform,
    start_at: f64,
    duration: f64,
}

#[derive(Clone, Debug)]
pub struct CameraController {
    config: CameraConfig,
    current: CameraTransform,
    animation: Option<CameraAnimation>,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            current: CameraTransform::IDENTITY,
            animation: None,
        }
    }

    pub fn current(&self) -> CameraTransform {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn target(&self) -> Option<CameraTransform> {
        self.animation.map(|animation| animation.to)
    }

    pub fn auto_fit(
        &mut self,
        nodes: &[SimNode],
        viewport: Vec2,
        immediate: bool,
        now: f64,
    ) -> Option<CameraTransform> {
        let target = fit_transform(nodes, viewport, &self.config)?;
        let duration_ms = if immediate {
            self.config.immediate_ms
        } else {
            self.config.settle_ms
        };

        self.animation = Some(CameraAnimation {
            from: None,
            to: target,
            start_at: now + self.config.delay_ms as f64 / 1000.0,
            duration: (duration_ms as f64 / 1000.0).max(f64::EPSILON),
        });
        Some(target)
    }

    pub fn tick(&mut self, now: f64) -> CameraTransform {
        let Some(animation) = self.animation.as_mut() else {
            return self.current;
        };
        if now < animation.start_at {
            return self.current;
        }

        let from = *animation.from.get_or_insert(self.current);
        let t = ((now - animation.start_at) / animation.duration).clamp(0.0, 1.0) as f32;
        self.current = from.lerp(animation.to, ease_cubic_in_out(t));
        if t >= 1.0 {
            self.current = animation.to;
            self.animation = None;
        }
        self.current
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.animation = None;
        self.current.translate += delta;
    }

    pub fn zoom_about(&mut self, pointer: Vec2, factor: f32) {
        self.animation = None;
        let world_before = self.current.screen_to_world(pointer);
        self.current.scale = (self.current.scale * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        self.current.translate = pointer - world_before * self.current.scale;
    }
}
