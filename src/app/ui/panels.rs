use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, source_label: &str, replay_requested: &mut bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("dramatis");
                    ui.separator();
                    ui.label(format!("source: {source_label}"));
                    ui.label(format!("status: {}", self.session.status()));
                    if let Some(message) = self.session.message() {
                        ui.label(message);
                    }
                    if !self.session.status().is_ended() && self.replay_rx.is_some() {
                        ui.spinner();
                    }
                    if ui.button("Replay").clicked() {
                        *replay_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "characters: {}  links: {}",
                            self.session.graph().nodes().len(),
                            self.session.graph().links().len()
                        ));
                        if let Some(stream) = self.stream.label() {
                            ui.label(stream);
                        }
                    });
                });
            });

        egui::SidePanel::right("summary")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_summary(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
