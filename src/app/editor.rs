//! Asset editor dialog: add, edit, delete and QR generation for one record

use super::App;
use crate::asset::{normalize_category, Asset, DeviceStatus, CATEGORIES};
use crate::schema::parse_price_text;
use crate::store::StoreError;
use crate::theme;
use crate::ui::components::{date_field, form_row};
use crate::utils::format_price;
use chrono::NaiveDate;
use eframe::egui;
use std::fmt::{Display, Formatter};
use tracing::info;

#[derive(Debug, PartialEq)]
pub(crate) enum FormError {
    EmptyId,
    InvalidPrice(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Asset ID is required"),
            Self::InvalidPrice(text) => write!(f, "Price \"{text}\" is not a number"),
        }
    }
}

/// Editable copy of an asset. Text stays as typed until submit.
#[derive(Debug, Clone)]
pub(crate) struct AssetForm {
    /// Id of the record being edited; `None` for a new record
    original_id: Option<String>,
    pub asset_id: String,
    pub name: String,
    pub model: String,
    pub category: String,
    pub serial: String,
    pub ip_address: String,
    pub location: String,
    pub cabinet: String,
    pub contract: String,
    pub project: String,
    pub owner: String,
    pub price: String,
    pub purchase_date: Option<NaiveDate>,
    pub intake_date: Option<NaiveDate>,
    pub go_live_date: Option<NaiveDate>,
    pub maintenance_expiry: Option<NaiveDate>,
    pub vendor_code: String,
    pub vendor_name: String,
    pub vendor_contact: String,
    pub status: DeviceStatus,
    pub note: String,
    /// Inline message shown above the buttons
    pub error: Option<String>,
}

impl AssetForm {
    pub fn new() -> Self {
        Self::from_asset(None, &Asset::with_defaults())
    }

    pub fn edit(asset: &Asset) -> Self {
        Self::from_asset(Some(asset.asset_id.clone()), asset)
    }

    fn from_asset(original_id: Option<String>, a: &Asset) -> Self {
        Self {
            original_id,
            asset_id: a.asset_id.clone(),
            name: a.name.clone(),
            model: a.model.clone(),
            category: a.category.clone(),
            serial: a.serial.clone(),
            ip_address: a.ip_address.clone(),
            location: a.location.clone(),
            cabinet: a.cabinet.clone(),
            contract: a.contract.clone(),
            project: a.project.clone(),
            owner: a.owner.clone(),
            price: format_price(a.price),
            purchase_date: a.purchase_date,
            intake_date: a.intake_date,
            go_live_date: a.go_live_date,
            maintenance_expiry: a.maintenance_expiry,
            vendor_code: a.vendor_code.clone(),
            vendor_name: a.vendor_name.clone(),
            vendor_contact: a.vendor_contact.clone(),
            status: a.status,
            note: a.note.clone(),
            error: None,
        }
    }

    pub fn original_id(&self) -> Option<&str> {
        self.original_id.as_deref()
    }

    /// Validate and build the record. Blank location, cabinet and note get defaults.
    pub fn to_asset(&self) -> Result<Asset, FormError> {
        let asset_id = self.asset_id.trim().to_string();
        if asset_id.is_empty() {
            return Err(FormError::EmptyId);
        }
        let price = parse_price_text(&self.price)
            .map_err(|_| FormError::InvalidPrice(self.price.trim().to_string()))?;
        let text = |s: &String| s.trim().to_string();

        let mut asset = Asset {
            asset_id,
            name: text(&self.name),
            model: text(&self.model),
            category: normalize_category(&self.category),
            serial: text(&self.serial),
            ip_address: text(&self.ip_address),
            location: text(&self.location),
            cabinet: text(&self.cabinet),
            contract: text(&self.contract),
            project: text(&self.project),
            owner: text(&self.owner),
            price,
            purchase_date: self.purchase_date,
            intake_date: self.intake_date,
            go_live_date: self.go_live_date,
            maintenance_expiry: self.maintenance_expiry,
            vendor_code: text(&self.vendor_code),
            vendor_name: text(&self.vendor_name),
            vendor_contact: text(&self.vendor_contact),
            status: self.status,
            note: text(&self.note),
        };
        asset.fill_blank_defaults();
        Ok(asset)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EditorAction {
    Save,
    AddNew,
    Delete,
    Cancel,
    GenerateQr,
}

fn text_row(ui: &mut egui::Ui, label: &str, value: &mut String) {
    form_row(ui, label, |ui| {
        ui.add(egui::TextEdit::singleline(value).desired_width(f32::INFINITY));
    });
}

fn section(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    theme::section_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        theme::section_title(ui, title);
        add_contents(ui);
    });
    ui.add_space(theme::SPACING_MD);
}

fn render_fields(ui: &mut egui::Ui, form: &mut AssetForm) {
    ui.columns(2, |cols| {
        let left = &mut cols[0];
        section(left, "BASIC", |ui| {
            text_row(ui, "Asset ID *", &mut form.asset_id);
            text_row(ui, "Asset Name", &mut form.name);
            text_row(ui, "Model", &mut form.model);
            form_row(ui, "Category", |ui| {
                egui::ComboBox::from_id_salt("editor_category")
                    .width(ui.available_width())
                    .selected_text(form.category.clone())
                    .show_ui(ui, |ui| {
                        for category in CATEGORIES {
                            ui.selectable_value(&mut form.category, category.to_string(), category);
                        }
                    });
            });
            text_row(ui, "Serial Number", &mut form.serial);
            text_row(ui, "IP Address", &mut form.ip_address);
        });
        section(left, "LOCATION", |ui| {
            text_row(ui, "Location", &mut form.location);
            text_row(ui, "Cabinet", &mut form.cabinet);
        });
        section(left, "PROJECT", |ui| {
            text_row(ui, "Contract", &mut form.contract);
            text_row(ui, "Project", &mut form.project);
            text_row(ui, "Owner", &mut form.owner);
        });

        let right = &mut cols[1];
        section(right, "FINANCE", |ui| {
            text_row(ui, "Price", &mut form.price);
            form_row(ui, "Purchase Date", |ui| date_field(ui, "purchase_date", &mut form.purchase_date));
            form_row(ui, "Intake Date", |ui| date_field(ui, "intake_date", &mut form.intake_date));
            form_row(ui, "Go-live Date", |ui| date_field(ui, "go_live_date", &mut form.go_live_date));
            form_row(ui, "Maint. Expiry", |ui| {
                date_field(ui, "maintenance_expiry", &mut form.maintenance_expiry)
            });
        });
        section(right, "VENDOR", |ui| {
            text_row(ui, "Vendor Code", &mut form.vendor_code);
            text_row(ui, "Vendor Name", &mut form.vendor_name);
            text_row(ui, "Contact", &mut form.vendor_contact);
        });
        section(right, "STATUS", |ui| {
            form_row(ui, "Status", |ui| {
                egui::ComboBox::from_id_salt("editor_status")
                    .width(ui.available_width())
                    .selected_text(form.status.label())
                    .show_ui(ui, |ui| {
                        for status in DeviceStatus::ALL {
                            ui.selectable_value(&mut form.status, status, status.label());
                        }
                    });
            });
            form_row(ui, "Note", |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut form.note)
                        .desired_rows(3)
                        .desired_width(f32::INFINITY),
                );
            });
        });
    });
}

impl App {
    pub(crate) fn render_editor(&mut self, ctx: &egui::Context) {
        let Some(mut form) = self.editor.take() else {
            return;
        };
        let is_edit = form.original_id().is_some();
        let mut action = None;

        let title = if is_edit { "Edit Asset" } else { "Add Asset" };
        let modal_area = egui::Modal::default_area(egui::Id::new("asset_editor"))
            .default_width(theme::EDITOR_WIDTH + theme::SPACING_XL * 2.0);
        let modal_response = egui::Modal::new(egui::Id::new("asset_editor"))
            .area(modal_area)
            .backdrop_color(egui::Color32::from_black_alpha(160))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(theme::EDITOR_WIDTH);
                ui.horizontal(|ui| {
                    ui.add(
                        egui::Label::new(egui::RichText::new(title).size(16.0).strong())
                            .selectable(false),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(theme::button(format!("{}  Generate QR", egui_phosphor::regular::QR_CODE)))
                            .clicked()
                        {
                            action = Some(EditorAction::GenerateQr);
                        }
                    });
                });
                ui.separator();
                ui.add_space(theme::SPACING_MD);

                egui::ScrollArea::vertical()
                    .max_height(ctx.screen_rect().height() * 0.7)
                    .show(ui, |ui| render_fields(ui, &mut form));

                if let Some(err) = &form.error {
                    ui.add_space(4.0);
                    ui.label(
                        egui::RichText::new(format!("{}  {}", egui_phosphor::regular::WARNING, err))
                            .color(theme::STATUS_ERROR),
                    );
                }
                ui.add_space(theme::SPACING_LG);

                ui.horizontal(|ui| {
                    if is_edit
                        && ui
                            .add(theme::button_danger(format!("{}  Delete", egui_phosphor::regular::TRASH)))
                            .clicked()
                    {
                        action = Some(EditorAction::Delete);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(theme::button_accent(format!("{}  Save", egui_phosphor::regular::FLOPPY_DISK)))
                            .clicked()
                        {
                            action = Some(EditorAction::Save);
                        }
                        if is_edit && ui.add(theme::button("Add as new")).clicked() {
                            action = Some(EditorAction::AddNew);
                        }
                        if ui.add(theme::button("Cancel")).clicked() {
                            action = Some(EditorAction::Cancel);
                        }
                    });
                });
            });

        if action.is_none() && modal_response.should_close() {
            action = Some(EditorAction::Cancel);
        }

        match action {
            None => self.editor = Some(form),
            Some(EditorAction::Cancel) => {}
            Some(EditorAction::GenerateQr) => {
                self.generate_qr(&form.asset_id);
                self.editor = Some(form);
            }
            Some(EditorAction::Delete) => {
                let ids = form.original_id().map(|id| vec![id.to_string()]).unwrap_or_default();
                self.editor = Some(form);
                self.request_delete(ids);
            }
            Some(EditorAction::Save) => self.submit_form(form, false),
            Some(EditorAction::AddNew) => self.submit_form(form, true),
        }
    }

    /// Write the form into the store. On failure the editor stays open with the reason.
    fn submit_form(&mut self, mut form: AssetForm, as_new: bool) {
        let asset = match form.to_asset() {
            Ok(asset) => asset,
            Err(e) => {
                form.error = Some(e.to_string());
                self.editor = Some(form);
                return;
            }
        };
        let id = asset.asset_id.clone();
        let result = match form.original_id() {
            Some(old_id) if !as_new => self.store.update(old_id, asset),
            _ => self.store.add(asset),
        };
        match result {
            Ok(()) => {
                let verb = if form.original_id().is_some() && !as_new { "Updated" } else { "Added" };
                info!(asset_id = %id, verb, "Asset saved from editor");
                self.apply_filters();
                self.show_toast(format!("{verb} {id}"));
            }
            Err(e @ (StoreError::EmptyId | StoreError::DuplicateId(_))) => {
                form.error = Some(e.to_string());
                self.editor = Some(form);
            }
            Err(e) => {
                self.editor = Some(form);
                self.show_error("Save asset", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_CABINET, DEFAULT_LOCATION, DEFAULT_NOTE};

    #[test]
    fn new_form_starts_with_defaults() {
        let form = AssetForm::new();
        assert!(form.original_id().is_none());
        assert_eq!(form.location, DEFAULT_LOCATION);
        assert_eq!(form.cabinet, DEFAULT_CABINET);
        assert_eq!(form.note, DEFAULT_NOTE);
        assert_eq!(form.status, DeviceStatus::NotInService);
    }

    #[test]
    fn submit_trims_and_fills_blanks() {
        let mut form = AssetForm::new();
        form.asset_id = "  SRV-9 ".into();
        form.location = "   ".into();
        form.note.clear();
        form.category = "服务器".into();
        form.price = "1,200.50".into();
        let asset = form.to_asset().unwrap();
        assert_eq!(asset.asset_id, "SRV-9");
        assert_eq!(asset.location, DEFAULT_LOCATION);
        assert_eq!(asset.note, DEFAULT_NOTE);
        assert_eq!(asset.category, "Server");
        assert_eq!(asset.price, Some(1200.5));
    }

    #[test]
    fn submit_rejects_missing_id_and_bad_price() {
        let mut form = AssetForm::new();
        assert_eq!(form.to_asset(), Err(FormError::EmptyId));

        form.asset_id = "A".into();
        form.price = "12k".into();
        assert_eq!(form.to_asset(), Err(FormError::InvalidPrice("12k".into())));

        form.price = " inf ".into();
        assert_eq!(form.to_asset(), Err(FormError::InvalidPrice("inf".into())));

        form.price = "  ".into();
        assert_eq!(form.to_asset().unwrap().price, None);
    }

    #[test]
    fn edit_form_round_trips_record() {
        let asset = Asset {
            asset_id: "SW-1".into(),
            price: Some(18000.0),
            maintenance_expiry: NaiveDate::from_ymd_opt(2025, 2, 19),
            status: DeviceStatus::Retiring,
            ..Asset::with_defaults()
        };
        let form = AssetForm::edit(&asset);
        assert_eq!(form.original_id(), Some("SW-1"));
        assert_eq!(form.price, "18000");
        assert_eq!(form.to_asset().unwrap(), asset);
    }
}
