//! Modal dialogs (confirmations, errors, about) and the toast

use super::App;
use crate::constants::*;
use crate::theme;
use crate::types::*;
use eframe::egui;
use tracing::info;

/// Longest id list spelled out in a confirmation before it is summarized
const MAX_LISTED_IDS: usize = 8;

fn id_list(ids: &[String]) -> String {
    let mut text = ids.iter().take(MAX_LISTED_IDS).cloned().collect::<Vec<_>>().join(", ");
    if ids.len() > MAX_LISTED_IDS {
        text.push_str(&format!(" and {} more", ids.len() - MAX_LISTED_IDS));
    }
    text
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Choice {
    Accept,
    Alternate,
    Cancel,
}

/// Title, message and up to three buttons. Returns the button pressed;
/// escape or a click outside counts as cancel.
fn confirm_modal(
    ctx: &egui::Context,
    id: &str,
    title: &str,
    message: &str,
    accept: egui::Button<'static>,
    alternate: Option<&str>,
) -> Option<Choice> {
    let mut choice = None;
    let area = egui::Modal::default_area(egui::Id::new(id)).default_width(400.0 + theme::SPACING_XL * 2.0);
    let response = egui::Modal::new(egui::Id::new(id))
        .area(area)
        .backdrop_color(egui::Color32::from_black_alpha(180))
        .frame(theme::modal_frame())
        .show(ctx, |ui| {
            ui.set_width(400.0);
            ui.add(egui::Label::new(egui::RichText::new(title).size(16.0).strong()).selectable(false));
            ui.add_space(theme::SPACING_MD);
            ui.add(egui::Label::new(egui::RichText::new(message).color(theme::TEXT_MUTED)).wrap());
            ui.add_space(theme::SPACING_XL);
            ui.horizontal(|ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add(accept).clicked() {
                        choice = Some(Choice::Accept);
                    }
                    if let Some(label) = alternate {
                        if ui.add(theme::button(label)).clicked() {
                            choice = Some(Choice::Alternate);
                        }
                    }
                    if ui.add(theme::button("Cancel")).clicked() {
                        choice = Some(Choice::Cancel);
                    }
                });
            });
        });
    if choice.is_none() && response.should_close() {
        choice = Some(Choice::Cancel);
    }
    choice
}

impl App {
    pub(crate) fn render_confirm(&mut self, ctx: &egui::Context) {
        let Some(confirm) = self.confirm.take() else {
            return;
        };

        let choice = match &confirm {
            Confirm::Delete(ids) => confirm_modal(
                ctx,
                "confirm_delete",
                &format!("Delete {} asset(s)?", ids.len()),
                &format!("{}\n\nThis cannot be undone once the file is saved.", id_list(ids)),
                theme::button_danger(format!("{}  Delete", egui_phosphor::regular::TRASH)),
                None,
            ),
            Confirm::ImportOverwrite { duplicates, incoming, .. } => confirm_modal(
                ctx,
                "confirm_import",
                "Overwrite existing assets?",
                &format!(
                    "{} of {} imported asset(s) use ids that already exist: {}\n\nOverwrite replaces the existing records.",
                    duplicates.len(),
                    incoming.len(),
                    id_list(duplicates)
                ),
                theme::button_danger("Overwrite"),
                None,
            ),
            Confirm::DiscardChanges(_) => confirm_modal(
                ctx,
                "confirm_discard",
                "Unsaved changes",
                "The register has changes that are not saved yet.",
                theme::button_accent(format!("{}  Save", egui_phosphor::regular::FLOPPY_DISK)),
                Some("Discard"),
            ),
        };

        match (choice, confirm) {
            (None, confirm) => self.confirm = Some(confirm),
            (Some(Choice::Cancel), _) => {}
            (Some(_), Confirm::Delete(ids)) => self.delete_assets(&ids),
            (Some(_), Confirm::ImportOverwrite { path, incoming, .. }) => {
                self.finish_import(&path, incoming, true);
            }
            (Some(Choice::Accept), Confirm::DiscardChanges(action)) => {
                self.save();
                // Save may have been cancelled in the Save As dialog
                if !self.store.is_dirty() {
                    self.run_pending(ctx, action);
                }
            }
            (Some(Choice::Alternate), Confirm::DiscardChanges(action)) => {
                info!(?action, "Discarding unsaved changes");
                self.run_pending(ctx, action);
            }
        }
    }

    pub(crate) fn render_error_modal(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_message.clone() else {
            return;
        };
        let mut close = false;
        let response = egui::Modal::new(egui::Id::new("error_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(180))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(380.0);
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(egui_phosphor::regular::WARNING_CIRCLE)
                            .size(22.0)
                            .color(theme::STATUS_ERROR),
                    );
                    ui.add(egui::Label::new(egui::RichText::new("Error").size(16.0).strong()).selectable(false));
                });
                ui.add_space(theme::SPACING_MD);
                ui.add(egui::Label::new(egui::RichText::new(&message).color(theme::TEXT_SECONDARY)).wrap());
                ui.add_space(theme::SPACING_XL);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add(theme::button_accent("OK")).clicked() {
                        close = true;
                    }
                });
            });
        if close || response.should_close() {
            self.error_message = None;
        }
    }

    pub(crate) fn render_about(&mut self, ctx: &egui::Context) {
        if !self.show_about {
            return;
        }
        let mut close = false;
        let response = egui::Modal::new(egui::Id::new("about_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(120))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(320.0);
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new(APP_NAME).size(18.0).strong().color(theme::ACCENT));
                    ui.label(egui::RichText::new(format!("v{APP_VERSION}")).color(theme::TEXT_DIM));
                    ui.add_space(theme::SPACING_MD);
                    ui.label("Asset register kept in an Excel or CSV file.");
                    ui.label(
                        egui::RichText::new(format!("Settings and logs: {}", self.data_dir.display()))
                            .size(11.0)
                            .color(theme::TEXT_DIM),
                    );
                    ui.add_space(theme::SPACING_LG);
                    if ui.add(theme::button("Close")).clicked() {
                        close = true;
                    }
                });
            });
        if close || response.should_close() {
            self.show_about = false;
        }
    }

    /// Bottom-right of the central panel, 3s visible then fade, paused on hover
    pub(crate) fn render_toast(&mut self, ctx: &egui::Context) {
        let (Some(msg), Some(panel_rect)) = (self.toast_message.clone(), self.central_panel_rect) else {
            return;
        };
        let visible_duration = 3.0;
        let fade_duration = 0.5;
        let total_duration = visible_duration + fade_duration;
        let margin = 12.0;
        let toast_pos = egui::pos2(panel_rect.right() - margin, panel_rect.bottom() - margin);

        let response = egui::Area::new(egui::Id::new("toast"))
            .fixed_pos(toast_pos)
            .pivot(egui::Align2::RIGHT_BOTTOM)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let elapsed = self.toast_start.map(|t| t.elapsed().as_secs_f32()).unwrap_or(0.0);
                let alpha = if elapsed > visible_duration {
                    ((total_duration - elapsed) / fade_duration).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let bg = theme::BG_ELEVATED;
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(bg.r(), bg.g(), bg.b(), (235.0 * alpha) as u8))
                    .stroke(egui::Stroke::new(
                        1.0,
                        egui::Color32::from_rgba_unmultiplied(
                            theme::ACCENT.r(),
                            theme::ACCENT.g(),
                            theme::ACCENT.b(),
                            (100.0 * alpha) as u8,
                        ),
                    ))
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(16, 10))
                    .show(ui, |ui| {
                        ui.set_max_width(420.0);
                        ui.label(
                            egui::RichText::new(&msg)
                                .color(egui::Color32::from_rgba_unmultiplied(255, 255, 255, (255.0 * alpha) as u8)),
                        );
                    });
            });

        if response.response.hovered() {
            self.toast_start = Some(std::time::Instant::now());
        }
        let elapsed = self.toast_start.map(|t| t.elapsed().as_secs_f32()).unwrap_or(0.0);
        if elapsed >= total_duration {
            self.toast_message = None;
            self.toast_start = None;
        } else {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_id_lists_are_summarized() {
        let ids: Vec<String> = (1..=10).map(|i| format!("A-{i}")).collect();
        let text = id_list(&ids);
        assert!(text.starts_with("A-1, A-2"));
        assert!(text.ends_with("A-8 and 2 more"));
        assert_eq!(id_list(&ids[..2]), "A-1, A-2");
    }
}
