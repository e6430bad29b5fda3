//! File actions behind the menu and sidebar: open, import, export, save,
//! template and QR files. Each action runs a native dialog, then reports
//! through a toast or the error modal.

use super::App;
use crate::asset::Asset;
use crate::constants::TEMPLATE_FILE_NAME;
use crate::files;
use crate::qr;
use crate::schema::LoadReport;
use crate::search::TextField;
use crate::store::StoreError;
use crate::types::Confirm;
use crate::utils::file_label;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "csv"];
const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif"];

/// One-line notes about what loading had to fix up, if anything
pub(crate) fn describe_load(report: &LoadReport) -> Vec<String> {
    let mut notes = Vec::new();
    if !report.filled_columns.is_empty() {
        let names: Vec<&str> = report.filled_columns.iter().map(|c| c.header()).collect();
        notes.push(format!("Added missing columns with defaults: {}", names.join(", ")));
    }
    if !report.duplicate_ids.is_empty() {
        notes.push(format!(
            "Skipped duplicate ids (first row kept): {}",
            report.duplicate_ids.join(", ")
        ));
    }
    if !report.invalid_cells.is_empty() {
        notes.push(format!("{} unreadable cell(s) left empty", report.invalid_cells.len()));
    }
    if !report.ignored_columns.is_empty() {
        notes.push(format!("Ignored columns: {}", report.ignored_columns.join(", ")));
    }
    notes
}

impl App {
    fn remember_dir(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.settings.last_dir = Some(parent.to_path_buf());
        }
    }

    fn sheet_dialog(&self) -> rfd::FileDialog {
        rfd::FileDialog::new()
            .set_directory(self.settings.dialog_dir())
            .add_filter("Spreadsheet", &SHEET_EXTENSIONS)
    }

    fn save_dialog(&self, default_name: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_directory(self.settings.dialog_dir())
            .set_file_name(default_name)
            .add_filter("Excel workbook", &["xlsx"])
            .add_filter("CSV", &["csv"])
            .save_file()
    }

    fn default_save_name(&self) -> String {
        self.store
            .current_file()
            .and_then(|p| p.file_stem())
            .map(|s| format!("{}.xlsx", s.to_string_lossy()))
            .unwrap_or_else(|| "Assets.xlsx".to_string())
    }

    // ========================================================================
    // OPEN / IMPORT
    // ========================================================================

    pub(crate) fn open_dialog(&mut self) {
        if let Some(path) = self.sheet_dialog().set_title("Open asset file").pick_file() {
            self.open_path(path);
        }
    }

    pub(crate) fn open_path(&mut self, path: PathBuf) {
        self.remember_dir(&path);
        match self.store.open(&path) {
            Ok(report) => {
                self.editor = None;
                self.clear_selection();
                self.apply_filters();
                self.settings.last_file = Some(path.clone());

                let mut message = format!("Opened {} ({} assets)", file_label(&path), self.store.len());
                for note in describe_load(&report) {
                    warn!(path = %path.display(), note = %note, "Load adjusted data");
                    message.push('\n');
                    message.push_str(&note);
                }
                self.show_toast(message);
            }
            Err(e) => self.show_error("Open", e),
        }
    }

    pub(crate) fn import_dialog(&mut self) {
        let Some(path) = self.sheet_dialog().set_title("Import assets").pick_file() else {
            return;
        };
        self.remember_dir(&path);
        match self.store.import_preview(&path) {
            Ok(preview) if preview.duplicates.is_empty() => {
                self.finish_import(&path, preview.report.assets, false);
            }
            Ok(preview) => {
                info!(path = %path.display(), count = preview.duplicates.len(), "Import collides with existing ids");
                self.confirm = Some(Confirm::ImportOverwrite {
                    path,
                    incoming: preview.report.assets,
                    duplicates: preview.duplicates,
                });
            }
            Err(e) => self.show_error("Import", e),
        }
    }

    pub(crate) fn finish_import(&mut self, path: &Path, incoming: Vec<Asset>, overwrite: bool) {
        if incoming.is_empty() {
            self.show_toast(format!("{} has no assets to import", file_label(path)));
            return;
        }
        match self.store.merge(incoming, overwrite) {
            Ok(count) => {
                self.clear_selection();
                self.apply_filters();
                self.show_toast(format!("Imported {count} asset(s) from {}", file_label(path)));
            }
            Err(e) => self.show_error("Import", e),
        }
    }

    // ========================================================================
    // SAVE / EXPORT
    // ========================================================================

    pub(crate) fn save(&mut self) {
        match self.store.save() {
            Ok(path) => self.show_toast(format!("Saved {}", file_label(&path))),
            Err(StoreError::NoCurrentFile) => self.save_as_dialog(),
            Err(e) => self.show_error("Save", e),
        }
    }

    pub(crate) fn save_as_dialog(&mut self) {
        if self.store.is_empty() {
            self.show_error("Save", StoreError::Empty);
            return;
        }
        let Some(path) = self.save_dialog(&self.default_save_name()) else {
            return;
        };
        self.remember_dir(&path);
        match self.store.save_as(&path) {
            Ok(written) => {
                self.settings.last_file = Some(written.clone());
                self.show_toast(format!("Saved {}", file_label(&written)));
            }
            Err(e) => self.show_error("Save", e),
        }
    }

    pub(crate) fn export_dialog(&mut self) {
        if self.store.is_empty() {
            self.show_error("Export", StoreError::Empty);
            return;
        }
        let Some(path) = self.save_dialog("Asset export.xlsx") else {
            return;
        };
        self.remember_dir(&path);
        match self.store.export(&path) {
            Ok(written) => self.show_toast(format!("Exported to {}", file_label(&written))),
            Err(e) => self.show_error("Export", e),
        }
    }

    pub(crate) fn create_template_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_directory(self.settings.dialog_dir())
            .set_file_name(TEMPLATE_FILE_NAME)
            .add_filter("Excel workbook", &["xlsx"])
            .save_file()
        else {
            return;
        };
        self.remember_dir(&path);
        match files::write_template(&path) {
            Ok(written) => self.show_toast(format!("Template saved to {}", file_label(&written))),
            Err(e) => self.show_error("Create template", e),
        }
    }

    /// Show the current file in the system file manager
    pub(crate) fn reveal_current_file(&mut self) {
        let Some(dir) = self.store.current_file().and_then(|p| p.parent()).map(Path::to_path_buf) else {
            return;
        };
        if let Err(e) = open::that(&dir) {
            self.show_error("Open folder", e);
        }
    }

    // ========================================================================
    // QR CODES
    // ========================================================================

    pub(crate) fn generate_qr(&mut self, asset_id: &str) {
        let asset_id = asset_id.trim();
        if asset_id.is_empty() {
            self.show_error("Generate QR", qr::QrError::EmptyInput);
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .set_directory(self.settings.dialog_dir())
            .set_file_name(format!("{asset_id}.png"))
            .add_filter("PNG image", &["png"])
            .save_file()
        else {
            return;
        };
        self.remember_dir(&path);
        match qr::encode_png(asset_id, &path) {
            Ok(written) => {
                info!(asset_id, path = %written.display(), "QR code generated");
                self.show_toast(format!("QR code saved to {}", file_label(&written)));
            }
            Err(e) => self.show_error("Generate QR", e),
        }
    }

    /// Decode a QR image and search by the asset id it holds
    pub(crate) fn import_qr_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_directory(self.settings.dialog_dir())
            .set_title("Import QR image")
            .add_filter("Image", &IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        self.remember_dir(&path);
        match qr::decode_file(&path) {
            Ok(asset_id) => {
                info!(asset_id = %asset_id, "QR code decoded");
                *self.query.text_mut(TextField::AssetId) = asset_id.clone();
                self.apply_filters();
                if self.filtered_indices.is_empty() {
                    self.show_toast(format!("Scanned {asset_id}: no matching asset"));
                } else {
                    self.show_toast(format!("Scanned {asset_id}"));
                }
            }
            Err(e) => self.show_error("Read QR code", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    #[test]
    fn clean_load_has_no_notes() {
        assert!(describe_load(&LoadReport::default()).is_empty());
    }

    #[test]
    fn load_notes_name_the_fixups() {
        let report = LoadReport {
            filled_columns: vec![Column::Location, Column::Note],
            duplicate_ids: vec!["A-1".into()],
            invalid_cells: vec!["row 3: Price".into(), "row 4: Purchase Date".into()],
            ..Default::default()
        };
        let notes = describe_load(&report);
        assert_eq!(notes.len(), 3);
        assert!(notes[0].contains(Column::Location.header()));
        assert!(notes[1].contains("A-1"));
        assert!(notes[2].starts_with("2 unreadable"));
    }
}
