use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::model::CharacterSummary;

use super::super::ViewModel;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

fn filter_summary<'a>(summary: &'a [CharacterSummary], query: &str) -> Vec<&'a CharacterSummary> {
    let query = query.trim();
    if query.is_empty() {
        return summary.iter().collect();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = summary
        .iter()
        .filter_map(|entry| fuzzy_match_score(&matcher, &entry.name, query).map(|score| (score, entry)))
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, entry)| entry).collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_summary(&mut self, ui: &mut Ui) {
        ui.heading("Interactions");
        ui.add_space(6.0);
        ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("Filter characters"));
        ui.add_space(6.0);

        let selection = self.session.selection().map(str::to_owned);
        if let Some(selected) = &selection {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("Selected: {selected}")).strong());
                if ui.small_button("Clear").clicked() {
                    self.session.set_highlight(None);
                }
            });
            if let Some(node) = self.session.graph().node(selected) {
                ui.label(format!(
                    "mentions {}  |  importance {}/5",
                    node.mentions, node.importance
                ));
                if !node.description.is_empty() {
                    ui.label(node.description.as_str());
                }
            }
            ui.separator();
        }

        let summary = self.session.summary();
        if summary.is_empty() {
            ui.label("No characters yet.");
            return;
        }

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("summary_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in filter_summary(summary, &self.search) {
                    let is_selected = selection.as_deref() == Some(entry.name.as_str());
                    let label = format!("{}  ({})", entry.name, entry.total_interactions);
                    if ui.selectable_label(is_selected, label).clicked() {
                        clicked = Some(if is_selected {
                            None
                        } else {
                            Some(entry.name.clone())
                        });
                    }

                    if !entry.partners.is_empty() {
                        ui.horizontal_wrapped(|ui| {
                            ui.add_space(12.0);
                            for partner in &entry.partners {
                                let chip = format!("{} · {}", partner.name, partner.weight);
                                if ui.small_button(chip).clicked() {
                                    clicked = Some(Some(partner.name.clone()));
                                }
                            }
                        });
                    }
                    ui.add_space(4.0);
                }
            });

        if let Some(next) = clicked {
            self.session.set_highlight(next.as_deref());
        }
    }
}
