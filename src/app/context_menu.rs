//! Right-click menu for table rows

use super::App;
use crate::theme;
use eframe::egui;

pub(crate) enum RowAction {
    Edit(usize),
    GenerateQr(String),
    Copy,
    Delete(Vec<String>),
}

impl App {
    pub(crate) fn row_context_menu(&mut self, ui: &mut egui::Ui, idx: usize) -> Option<RowAction> {
        ui.spacing_mut().item_spacing.y = 2.0;
        let selected_count = self.selected_indices.len().max(1);
        let asset_id = self.store.assets().get(idx)?.asset_id.clone();

        let delete_label = if selected_count > 1 {
            format!("Delete {selected_count} assets")
        } else {
            "Delete".to_string()
        };
        let copy_label = if selected_count > 1 {
            format!("Copy {selected_count} rows")
        } else {
            "Copy".to_string()
        };
        let labels = [
            format!("{}  Edit", egui_phosphor::regular::PENCIL_SIMPLE),
            format!("{}  Generate QR", egui_phosphor::regular::QR_CODE),
            format!("{}  {copy_label}", egui_phosphor::regular::COPY),
            format!("{}  {delete_label}", egui_phosphor::regular::TRASH),
        ];
        let label_refs: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
        theme::set_menu_width(ui, &label_refs);

        let mut action = None;
        if theme::menu_item(ui, egui_phosphor::regular::PENCIL_SIMPLE, "Edit") {
            action = Some(RowAction::Edit(idx));
        }
        if theme::menu_item(ui, egui_phosphor::regular::QR_CODE, "Generate QR") {
            action = Some(RowAction::GenerateQr(asset_id.clone()));
        }
        if theme::menu_item(ui, egui_phosphor::regular::COPY, &copy_label) {
            action = Some(RowAction::Copy);
        }
        ui.separator();
        if theme::menu_item(ui, egui_phosphor::regular::TRASH, &delete_label) {
            let ids = if self.selected_indices.contains(&idx) {
                self.selected_ids()
            } else {
                vec![asset_id]
            };
            action = Some(RowAction::Delete(ids));
        }

        if action.is_some() {
            ui.close_menu();
        }
        action
    }

    pub(crate) fn run_row_action(&mut self, ctx: &egui::Context, action: RowAction) {
        match action {
            RowAction::Edit(idx) => self.edit_asset(idx),
            RowAction::GenerateQr(asset_id) => self.generate_qr(&asset_id),
            RowAction::Copy => self.copy_selection(ctx),
            RowAction::Delete(ids) => self.request_delete(ids),
        }
    }
}
