//! Left sidebar: current file, search form and column toggles

use super::App;
use crate::asset::{DeviceStatus, CATEGORIES};
use crate::constants::MAX_EXPIRY_WINDOW_DAYS;
use crate::search::{ExpiryBucket, TextField};
use crate::theme;
use crate::types::TableColumn;
use crate::ui::components::form_row;
use crate::utils::file_label;
use eframe::egui;
use std::collections::BTreeSet;

impl App {
    /// Reset every search input, including the expiry controls
    pub(crate) fn clear_search(&mut self) {
        self.query.clear();
        self.expiry_enabled = false;
        self.expiry_bucket = ExpiryBucket::default();
    }

    /// Built-in categories first, then any others found in the register
    fn category_choices(&self) -> Vec<String> {
        let extra: BTreeSet<&str> = self
            .store
            .assets()
            .iter()
            .map(|a| a.category.as_str())
            .filter(|c| !c.is_empty() && !CATEGORIES.contains(c))
            .collect();
        CATEGORIES
            .iter()
            .map(|c| c.to_string())
            .chain(extra.into_iter().map(str::to_string))
            .collect()
    }

    fn render_file_section(&mut self, ui: &mut egui::Ui) {
        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            theme::section_title(ui, "FILE");
            match self.store.current_file().map(|p| (file_label(p), p.display().to_string())) {
                Some((name, full)) => {
                    let dirty = if self.store.is_dirty() { " *" } else { "" };
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(egui_phosphor::regular::FILE_XLS).color(theme::ACCENT));
                        ui.add(egui::Label::new(format!("{name}{dirty}")).truncate())
                            .on_hover_text(full);
                    });
                }
                None => {
                    ui.label(egui::RichText::new("No file open").color(theme::TEXT_DIM));
                }
            }
            ui.label(
                egui::RichText::new(format!(
                    "{}  Keep a backup copy before editing",
                    egui_phosphor::regular::WARNING
                ))
                .size(11.0)
                .color(theme::STATUS_WARNING),
            );
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui.add(theme::button(format!("{}  Open", egui_phosphor::regular::FOLDER_OPEN))).clicked() {
                    self.guard_unsaved(ui.ctx(), crate::types::PendingAction::Open);
                }
                if ui
                    .add(theme::button(format!("{}  Template", egui_phosphor::regular::FILE_PLUS)))
                    .on_hover_text("Create an empty workbook with example rows")
                    .clicked()
                {
                    self.create_template_dialog();
                }
                let has_file = self.store.current_file().is_some();
                if ui
                    .add_enabled(has_file, egui::Button::new(egui_phosphor::regular::FOLDER).frame(false))
                    .on_hover_text("Show in folder")
                    .clicked()
                {
                    self.reveal_current_file();
                }
            });
        });
    }

    /// Returns true when any search input changed
    fn render_search_section(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        let categories = self.category_choices();
        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            theme::section_title(ui, "SEARCH");

            for field in TextField::ALL {
                form_row(ui, field.label(), |ui| {
                    if field == TextField::AssetId {
                        if ui
                            .add(egui::Button::new(egui_phosphor::regular::QR_CODE).frame(false))
                            .on_hover_text("Import QR image")
                            .clicked()
                        {
                            self.import_qr_dialog();
                        }
                    }
                    let edit = egui::TextEdit::singleline(self.query.text_mut(field))
                        .desired_width(f32::INFINITY);
                    changed |= ui.add(edit).changed();
                });
            }

            form_row(ui, "Category", |ui| {
                let selected = self.query.category.clone().unwrap_or_else(|| "Any".to_string());
                egui::ComboBox::from_id_salt("search_category")
                    .width(ui.available_width())
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        changed |= ui.selectable_value(&mut self.query.category, None, "Any").changed();
                        for category in &categories {
                            changed |= ui
                                .selectable_value(&mut self.query.category, Some(category.clone()), category.as_str())
                                .changed();
                        }
                    });
            });

            form_row(ui, "Status", |ui| {
                let selected = self.query.status.map(|s| s.label()).unwrap_or("Any");
                egui::ComboBox::from_id_salt("search_status")
                    .width(ui.available_width())
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        changed |= ui.selectable_value(&mut self.query.status, None, "Any").changed();
                        for status in DeviceStatus::ALL {
                            changed |= ui
                                .selectable_value(&mut self.query.status, Some(status), status.label())
                                .changed();
                        }
                    });
            });

            ui.add_space(4.0);
            changed |= ui.checkbox(&mut self.expiry_enabled, "Maintenance expiry").changed();
            ui.add_enabled_ui(self.expiry_enabled, |ui| {
                form_row(ui, "Show", |ui| {
                    egui::ComboBox::from_id_salt("search_expiry")
                        .width(ui.available_width())
                        .selected_text(self.expiry_bucket.label())
                        .show_ui(ui, |ui| {
                            for bucket in ExpiryBucket::ALL {
                                changed |= ui
                                    .selectable_value(&mut self.expiry_bucket, bucket, bucket.label())
                                    .changed();
                            }
                        });
                });
                form_row(ui, "Window (days)", |ui| {
                    changed |= ui
                        .add(egui::DragValue::new(&mut self.settings.expiry_window_days).range(1..=MAX_EXPIRY_WINDOW_DAYS))
                        .changed();
                });
            });

            ui.add_space(theme::SPACING_MD);
            ui.horizontal(|ui| {
                if ui.add(theme::button(format!("{}  Clear", egui_phosphor::regular::X))).clicked() {
                    self.clear_search();
                    changed = true;
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} of {}",
                            self.filtered_indices.len(),
                            self.store.len()
                        ))
                        .color(theme::TEXT_DIM),
                    );
                });
            });
        });
        changed
    }

    fn render_columns_section(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new(egui::RichText::new("Columns").color(theme::TEXT_MUTED))
            .default_open(false)
            .show(ui, |ui| {
                for col in TableColumn::ALL {
                    // The id column always stays visible
                    if col == TableColumn::AssetId {
                        continue;
                    }
                    let mut visible = self.settings.is_column_visible(col);
                    if ui.checkbox(&mut visible, col.title()).changed() {
                        self.settings.set_column_visible(col, visible);
                    }
                }
            });
    }

    pub(crate) fn render_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("search_panel")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin { left: 12, right: 4, top: 12, bottom: 12 }),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_file_section(ui);
                    ui.add_space(theme::SPACING_MD);
                    if self.render_search_section(ui) {
                        self.apply_filters();
                    }
                    ui.add_space(theme::SPACING_MD);
                    self.render_columns_section(ui);
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn clear_resets_expiry_bucket() {
        let mut app = App::with_settings(Settings::default(), std::env::temp_dir());
        *app.query.text_mut(TextField::Name) = "switch".into();
        app.query.status = Some(DeviceStatus::Retiring);
        app.expiry_enabled = true;
        app.expiry_bucket = ExpiryBucket::Overdue;

        app.clear_search();
        app.apply_filters();

        assert!(app.query.is_empty());
        assert!(!app.expiry_enabled);
        assert_eq!(app.expiry_bucket, ExpiryBucket::default());
        assert_eq!(app.query.expiry, None);
    }
}
