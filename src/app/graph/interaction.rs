use eframe::egui::{self, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.session
            .camera_mut()
            .zoom_about(pointer - rect.min, zoom_factor);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.session.camera_mut().pan_by(response.drag_delta());
        }
    }

    pub(in crate::app) fn handle_node_drag(&mut self, rect: Rect, response: &egui::Response) {
        let transform = self.session.camera().current();
        let pointer = response
            .interact_pointer_pos()
            .map(|screen| screen_to_world(rect, transform, screen));

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(world) = pointer
            && let Some(name) = self.session.node_at(world).map(str::to_owned)
        {
            self.session.begin_drag(&name, world);
        }

        if self.session.dragging().is_some()
            && response.dragged_by(egui::PointerButton::Primary)
            && let Some(world) = pointer
        {
            self.session.drag_to(world);
        }

        if response.drag_stopped() {
            self.session.end_drag();
        }
    }

    pub(in crate::app) fn handle_graph_click(&mut self, rect: Rect, response: &egui::Response) {
        if !response.clicked_by(egui::PointerButton::Primary) {
            return;
        }

        let transform = self.session.camera().current();
        let hit = response
            .interact_pointer_pos()
            .map(|screen| screen_to_world(rect, transform, screen))
            .and_then(|world| self.session.node_at(world))
            .map(str::to_owned);
        self.session.set_highlight(hit.as_deref());
    }

    pub(in crate::app) fn update_hovered(&mut self, ui: &Ui, rect: Rect) {
        let transform = self.session.camera().current();
        self.hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .map(|pointer| screen_to_world(rect, transform, pointer))
            .and_then(|world| self.session.node_at(world))
            .map(str::to_owned);
    }
}
