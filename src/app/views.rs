//! Asset table rendering

use super::context_menu::RowAction;
use super::App;
use crate::asset::Asset;
use crate::theme;
use crate::types::*;
use crate::ui::components::{status_badge, styled_checkbox};
use crate::utils::{format_date, format_price};
use eframe::egui;

/// Display text of one table cell, also used for sorting and copying
pub(crate) fn cell_text(asset: &Asset, col: TableColumn) -> String {
    match col {
        TableColumn::AssetId => asset.asset_id.clone(),
        TableColumn::Name => asset.name.clone(),
        TableColumn::Model => asset.model.clone(),
        TableColumn::Category => asset.category.clone(),
        TableColumn::Serial => asset.serial.clone(),
        TableColumn::IpAddress => asset.ip_address.clone(),
        TableColumn::Location => asset.location.clone(),
        TableColumn::Cabinet => asset.cabinet.clone(),
        TableColumn::Contract => asset.contract.clone(),
        TableColumn::Project => asset.project.clone(),
        TableColumn::Owner => asset.owner.clone(),
        TableColumn::VendorName => asset.vendor_name.clone(),
        TableColumn::MaintenanceExpiry => format_date(asset.maintenance_expiry),
        TableColumn::Status => asset.status.label().to_string(),
        TableColumn::Note => asset.note.clone(),
    }
}

/// Tooltip with the fields the table does not show
fn row_tooltip(asset: &Asset) -> String {
    let mut lines = vec![format!("{}  {}", asset.asset_id, asset.name)];
    let price = format_price(asset.price);
    if !price.is_empty() {
        lines.push(format!("Price: {price}"));
    }
    for (label, date) in [
        ("Purchased", asset.purchase_date),
        ("Intake", asset.intake_date),
        ("Go-live", asset.go_live_date),
    ] {
        if date.is_some() {
            lines.push(format!("{label}: {}", format_date(date)));
        }
    }
    if !asset.vendor_contact.is_empty() || !asset.vendor_code.is_empty() {
        lines.push(format!("Vendor: {} {}", asset.vendor_code, asset.vendor_contact).trim_end().to_string());
    }
    lines.join("\n")
}

impl App {
    /// Apply a click on the row at display position `pos`
    fn click_row(&mut self, idx: usize, pos: usize, modifiers: egui::Modifiers) {
        if modifiers.shift {
            if let Some(anchor) = self
                .last_selected
                .and_then(|last| self.filtered_indices.iter().position(|&i| i == last))
            {
                let (start, end) = (anchor.min(pos), anchor.max(pos));
                if !modifiers.command {
                    self.selected_indices.clear();
                }
                self.selected_indices.extend(self.filtered_indices[start..=end].iter().copied());
                return;
            }
        }
        if modifiers.command {
            if !self.selected_indices.remove(&idx) {
                self.selected_indices.insert(idx);
            }
        } else {
            self.selected_indices.clear();
            self.selected_indices.insert(idx);
        }
        self.last_selected = Some(idx);
    }

    pub(crate) fn render_table(&mut self, ui: &mut egui::Ui) {
        use egui_extras::{Column, TableBuilder};

        let columns = self.visible_columns();
        let modifiers = ui.input(|i| i.modifiers);
        let today = Self::today();
        let window = self.settings.expiry_window_days;
        let ctx = ui.ctx().clone();

        let mut sort_clicked: Option<TableColumn> = None;
        let mut clicked: Option<(usize, usize)> = None;
        let mut action: Option<RowAction> = None;

        let mut table = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .sense(egui::Sense::click())
            .min_scrolled_height(0.0)
            .column(Column::exact(32.0));
        for (i, col) in columns.iter().enumerate() {
            let column = if i + 1 == columns.len() {
                Column::remainder().at_least(col.default_width())
            } else {
                Column::initial(col.default_width()).at_least(48.0)
            };
            table = table.column(column.clip(true));
        }

        table
            .header(theme::HEADER_HEIGHT, |mut header| {
                header.col(|_ui| {});
                for &col in &columns {
                    header.col(|ui| {
                        let is_sorted = self.sort_column == Some(col);
                        let icon = match (is_sorted, self.sort_direction) {
                            (true, SortDirection::Ascending) => egui_phosphor::regular::CARET_UP,
                            (true, SortDirection::Descending) => egui_phosphor::regular::CARET_DOWN,
                            (false, _) => egui_phosphor::regular::CARET_UP_DOWN,
                        };
                        let color = if is_sorted { theme::TEXT_PRIMARY } else { theme::TEXT_MUTED };
                        let resp = ui.add(
                            egui::Label::new(
                                egui::RichText::new(format!("{} {}", col.title(), icon))
                                    .size(12.0)
                                    .strong()
                                    .color(color),
                            )
                            .selectable(false)
                            .truncate()
                            .sense(egui::Sense::click()),
                        );
                        if resp.clicked() {
                            sort_clicked = Some(col);
                        }
                    });
                }
            })
            .body(|mut body| {
                body.ui_mut().visuals_mut().selection.bg_fill = theme::TABLE_ROW_SELECTED;
                let indices = self.filtered_indices.clone();

                body.rows(theme::ROW_HEIGHT, indices.len(), |mut row| {
                    let pos = row.index();
                    let idx = indices[pos];
                    let Some(asset) = self.store.assets().get(idx).cloned() else {
                        return;
                    };
                    let is_selected = self.selected_indices.contains(&idx);
                    row.set_selected(is_selected);

                    row.col(|ui| {
                        ui.centered_and_justified(|ui| {
                            styled_checkbox(ui, is_selected, theme::CHECKBOX_SIZE);
                        });
                    });

                    for &col in &columns {
                        row.col(|ui| match col {
                            TableColumn::Status => status_badge(ui, asset.status),
                            TableColumn::MaintenanceExpiry => {
                                let color = asset
                                    .expiry_state(today, window)
                                    .map(theme::expiry_color)
                                    .unwrap_or(theme::TEXT_MUTED);
                                ui.add(
                                    egui::Label::new(
                                        egui::RichText::new(cell_text(&asset, col)).size(12.0).color(color),
                                    )
                                    .selectable(false),
                                );
                            }
                            TableColumn::AssetId => {
                                ui.add(
                                    egui::Label::new(egui::RichText::new(&asset.asset_id).strong())
                                        .truncate()
                                        .selectable(false),
                                );
                            }
                            _ => {
                                ui.add(
                                    egui::Label::new(
                                        egui::RichText::new(cell_text(&asset, col))
                                            .size(12.0)
                                            .color(theme::TEXT_SECONDARY),
                                    )
                                    .truncate()
                                    .selectable(false),
                                );
                            }
                        });
                    }

                    let response = row.response();
                    if response.hovered() {
                        ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
                    }
                    let response = response.on_hover_text_at_pointer(row_tooltip(&asset));

                    // Right-click keeps an existing multi-selection
                    if response.clicked_by(egui::PointerButton::Secondary)
                        && !self.selected_indices.contains(&idx)
                    {
                        self.selected_indices.clear();
                        self.selected_indices.insert(idx);
                        self.last_selected = Some(idx);
                    }

                    let is_valid_double_click =
                        response.double_clicked() && self.last_clicked_item == Some(idx);
                    if is_valid_double_click {
                        action = Some(RowAction::Edit(idx));
                    } else if response.clicked_by(egui::PointerButton::Primary) {
                        clicked = Some((idx, pos));
                    }

                    response.context_menu(|ui| {
                        if let Some(a) = self.row_context_menu(ui, idx) {
                            action = Some(a);
                        }
                    });
                });
            });

        if let Some((idx, pos)) = clicked {
            self.last_clicked_item = Some(idx);
            self.click_row(idx, pos, modifiers);
        }
        if let Some(col) = sort_clicked {
            self.toggle_sort(col);
        }
        if let Some(action) = action {
            self.run_row_action(&ctx, action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::DeviceStatus;
    use chrono::NaiveDate;

    #[test]
    fn cells_render_typed_fields() {
        let asset = Asset {
            asset_id: "SRV-1".into(),
            maintenance_expiry: NaiveDate::from_ymd_opt(2024, 1, 24),
            status: DeviceStatus::UnderRepair,
            ..Default::default()
        };
        assert_eq!(cell_text(&asset, TableColumn::AssetId), "SRV-1");
        assert_eq!(cell_text(&asset, TableColumn::MaintenanceExpiry), "2024-01-24");
        assert_eq!(cell_text(&asset, TableColumn::Status), "Under repair");
        assert_eq!(cell_text(&asset, TableColumn::Note), "");
    }

    #[test]
    fn tooltip_lists_hidden_fields() {
        let asset = Asset {
            asset_id: "SW-2".into(),
            name: "Core switch".into(),
            price: Some(18000.0),
            purchase_date: NaiveDate::from_ymd_opt(2023, 2, 10),
            vendor_code: "SUP-002".into(),
            ..Default::default()
        };
        let tip = row_tooltip(&asset);
        assert!(tip.starts_with("SW-2  Core switch"));
        assert!(tip.contains("Price: 18000"));
        assert!(tip.contains("Purchased: 2023-02-10"));
        assert!(tip.ends_with("Vendor: SUP-002"));
    }
}
