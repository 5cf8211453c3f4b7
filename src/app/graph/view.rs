use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use crate::highlight::{LinkState, NodeState};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, outline, world_to_screen,
};

const LINK_COLOR: Color32 = Color32::from_rgb(153, 153, 153);
const ACTIVE_LINK_COLOR: Color32 = Color32::from_rgb(214, 96, 77);
const SELECTED_RING: Color32 = Color32::from_rgb(40, 40, 40);
const LABEL_COLOR: Color32 = Color32::from_rgb(40, 40, 40);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        if rect.size() != self.session.viewport() {
            self.session.set_viewport(rect.size());
        }

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.handle_node_drag(rect, &response);
        self.handle_graph_click(rect, &response);
        self.update_hovered(ui, rect);

        let now = ui.input(|input| input.time);
        if self.session.tick(now) || response.dragged() {
            ui.ctx().request_repaint();
        }

        let frame = self.session.frame();
        let transform = frame.transform;
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, transform);

        if frame.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No characters yet",
                FontId::proportional(16.0),
                Color32::from_gray(130),
            );
            return;
        }

        let zoom_sqrt = transform.scale.sqrt();
        for link in &frame.links {
            let start = world_to_screen(rect, transform, link.from);
            let end = world_to_screen(rect, transform, link.to);
            let (width, color) = match link.state {
                LinkState::Active => ((link.stroke_width + 1.5) * zoom_sqrt, ACTIVE_LINK_COLOR),
                LinkState::Default if frame.highlight_active => {
                    (link.stroke_width * zoom_sqrt, LINK_COLOR.gamma_multiply(0.2))
                }
                LinkState::Default => (link.stroke_width * zoom_sqrt, LINK_COLOR.gamma_multiply(0.6)),
            };
            painter.line_segment([start, end], Stroke::new(width.max(0.5), color));
        }

        for node in &frame.nodes {
            let position = world_to_screen(rect, transform, node.position);
            let radius = node.radius * transform.scale;
            if !circle_visible(rect, position, radius + 80.0) {
                continue;
            }

            let is_hovered = self.hovered.as_deref() == Some(node.name.as_str());
            let fill = match node.state {
                NodeState::Selected => node.color,
                NodeState::Connected => blend_color(node.color, Color32::WHITE, 0.15),
                NodeState::Default if frame.highlight_active => dim_color(node.color, 0.35),
                NodeState::Default if is_hovered => blend_color(node.color, Color32::WHITE, 0.25),
                NodeState::Default => node.color,
            };

            painter.circle_filled(position, radius, fill);
            painter.circle_stroke(position, radius, outline(node.color));
            if node.state == NodeState::Selected {
                painter.circle_stroke(position, radius + 4.0, Stroke::new(2.5, SELECTED_RING));
            }

            let label_color = if frame.highlight_active && node.state == NodeState::Default {
                dim_color(LABEL_COLOR, 0.5)
            } else {
                LABEL_COLOR
            };
            painter.text(
                position + vec2(0.0, radius + 6.0),
                Align2::CENTER_TOP,
                node.name.as_str(),
                FontId::proportional((13.0 * zoom_sqrt).clamp(9.0, 20.0)),
                label_color,
            );
            if node.importance > 0 && transform.scale > 0.6 {
                painter.text(
                    position,
                    Align2::CENTER_CENTER,
                    "•".repeat(usize::from(node.importance)),
                    FontId::proportional((10.0 * zoom_sqrt).clamp(8.0, 16.0)),
                    Color32::from_rgba_unmultiplied(255, 255, 255, 200),
                );
            }
        }

        if let Some(hovered) = self.hovered.as_deref()
            && let Some(node) = self.session.graph().node(hovered)
        {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });

            let mut panel_text = format!(
                "{}  |  mentions {}  |  importance {}",
                node.name(),
                node.mentions,
                node.importance
            );
            if !node.description.is_empty() {
                panel_text.push('\n');
                panel_text.push_str(&node.description);
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(60),
            );
        }
    }
}
