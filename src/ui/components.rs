//! Reusable UI components

use crate::asset::DeviceStatus;
use crate::theme;
use chrono::NaiveDate;
use eframe::egui;

/// Custom checkbox widget with consistent styling
pub fn styled_checkbox(ui: &mut egui::Ui, selected: bool, size: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());

    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        if selected {
            painter.rect_stroke(
                rect,
                3.0,
                egui::Stroke::new(1.5, theme::ACCENT),
                egui::StrokeKind::Inside,
            );
            painter.rect_filled(rect.shrink(3.0), 2.0, theme::ACCENT);
        } else {
            painter.rect_stroke(
                rect,
                3.0,
                egui::Stroke::new(1.5, theme::BORDER_DEFAULT),
                egui::StrokeKind::Inside,
            );
        }
    }

    response
}

/// Status text, drawn as a tinted badge for states that need attention
pub fn status_badge(ui: &mut egui::Ui, status: DeviceStatus) {
    let Some((bg, fg)) = theme::status_colors(status) else {
        ui.add(
            egui::Label::new(egui::RichText::new(status.label()).size(12.0).color(theme::TEXT_MUTED))
                .selectable(false),
        );
        return;
    };
    let galley = ui.fonts(|f| {
        f.layout_no_wrap(status.label().to_string(), egui::FontId::proportional(12.0), fg)
    });
    let size = galley.size() + egui::vec2(12.0, 6.0);
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    ui.painter().rect_filled(rect, 3.0, bg);
    ui.painter().rect_stroke(
        rect,
        3.0,
        egui::Stroke::new(theme::STROKE_DEFAULT, fg.gamma_multiply(0.5)),
        egui::StrokeKind::Inside,
    );
    ui.painter().galley(rect.center() - galley.size() / 2.0, galley, fg);
}

/// Optional date: a checkbox toggles whether a date is set, the picker edits it.
/// Returns true when the value changed.
pub fn date_field(ui: &mut egui::Ui, id: &str, value: &mut Option<NaiveDate>) -> bool {
    let before = *value;
    ui.horizontal(|ui| {
        let mut set = value.is_some();
        if ui.checkbox(&mut set, "").changed() {
            *value = set.then(|| chrono::Local::now().date_naive());
        }
        match value {
            Some(date) => {
                ui.add(egui_extras::DatePickerButton::new(date).id_salt(id));
            }
            None => {
                ui.add(
                    egui::Label::new(egui::RichText::new("Not set").color(theme::TEXT_DIM))
                        .selectable(false),
                );
            }
        }
    });
    *value != before
}

/// Fixed-width label followed by the field widget, for form grids
pub fn form_row<R>(
    ui: &mut egui::Ui,
    label: &str,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> R {
    ui.horizontal(|ui| {
        ui.add_sized(
            [theme::FORM_LABEL_WIDTH, 20.0],
            egui::Label::new(egui::RichText::new(label).color(theme::TEXT_MUTED)).selectable(false),
        );
        add_contents(ui)
    })
    .inner
}
