//! App module - contains the main application state and logic

mod context_menu;
mod editor;
mod file_ops;
mod filters;
mod modals;
mod sidebar;
mod views;

use crate::constants::*;
use crate::search::{ExpiryBucket, SearchQuery};
use crate::settings::Settings;
use crate::store::AssetStore;
use crate::theme;
use crate::types::*;
use crate::utils::file_label;
use chrono::NaiveDate;
use eframe::egui;
use editor::AssetForm;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{error, info, warn};

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) store: AssetStore,
    /// Store indices of the rows currently shown, in display order
    pub(crate) filtered_indices: Vec<usize>,
    pub(crate) query: SearchQuery,
    // Expiry query controls; the bucket only applies while enabled
    pub(crate) expiry_enabled: bool,
    pub(crate) expiry_bucket: ExpiryBucket,
    // Selection (store indices)
    pub(crate) selected_indices: HashSet<usize>,
    pub(crate) last_selected: Option<usize>,
    pub(crate) last_clicked_item: Option<usize>,
    // Sorting
    pub(crate) sort_column: Option<TableColumn>,
    pub(crate) sort_direction: SortDirection,
    // Dialogs
    pub(crate) editor: Option<AssetForm>,
    pub(crate) confirm: Option<Confirm>,
    pub(crate) error_message: Option<String>,
    pub(crate) show_about: bool,
    // Set once the user agreed to leave with unsaved changes
    pub(crate) allow_close: bool,
    // Toast notification
    pub(crate) toast_message: Option<String>,
    pub(crate) toast_start: Option<std::time::Instant>,
    pub(crate) central_panel_rect: Option<egui::Rect>,
    // Settings
    pub(crate) settings: Settings,
    pub(crate) data_dir: PathBuf,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) last_title: String,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, data_dir: PathBuf) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Phosphor icons as a fallback in the default fonts
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let mut app = Self::with_settings(settings, data_dir);
        if app.settings.reopen_last_file {
            if let Some(path) = app.settings.last_file.clone().filter(|p| p.is_file()) {
                info!(path = %path.display(), "Reopening last file");
                app.open_path(path);
            }
        }
        app.apply_filters();
        app
    }

    /// State with an empty register, before any window exists
    pub(crate) fn with_settings(settings: Settings, data_dir: PathBuf) -> Self {
        Self {
            store: AssetStore::default(),
            filtered_indices: Vec::new(),
            query: SearchQuery::default(),
            expiry_enabled: false,
            expiry_bucket: ExpiryBucket::default(),
            selected_indices: HashSet::new(),
            last_selected: None,
            last_clicked_item: None,
            sort_column: None,
            sort_direction: SortDirection::Ascending,
            editor: None,
            confirm: None,
            error_message: None,
            show_about: false,
            allow_close: false,
            toast_message: None,
            toast_start: None,
            central_panel_rect: None,
            settings,
            data_dir,
            window_pos: None,
            window_size: None,
            needs_center: false,
            last_title: String::new(),
        }
    }

    pub fn save_settings(&mut self) {
        self.settings.window_x = self.window_pos.map(|p| p.x);
        self.settings.window_y = self.window_pos.map(|p| p.y);
        self.settings.window_w = self.window_size.map(|s| s.x);
        self.settings.window_h = self.window_size.map(|s| s.y);
        self.settings.last_file = self.store.current_file().map(|p| p.to_path_buf());
        self.settings.save(&self.data_dir);
    }

    pub(crate) fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    pub(crate) fn window_title(&self) -> String {
        let file = self
            .store
            .current_file()
            .map(file_label)
            .unwrap_or_else(|| "Untitled".to_string());
        let dirty = if self.store.is_dirty() { "*" } else { "" };
        format!("{dirty}{file} - {APP_NAME}")
    }

    pub(crate) fn show_toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_start = Some(std::time::Instant::now());
    }

    /// Log a failed action and surface it in the error modal
    pub(crate) fn show_error(&mut self, action: &str, err: impl std::fmt::Display) {
        error!(action, error = %err, "Action failed");
        self.error_message = Some(format!("{action} failed: {err}"));
    }

    /// Store indices of selected rows, in display order
    pub(crate) fn selected_in_view(&self) -> Vec<usize> {
        self.filtered_indices
            .iter()
            .copied()
            .filter(|i| self.selected_indices.contains(i))
            .collect()
    }

    pub(crate) fn selected_ids(&self) -> Vec<String> {
        self.selected_in_view()
            .into_iter()
            .filter_map(|i| self.store.assets().get(i).map(|a| a.asset_id.clone()))
            .collect()
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected_indices.clear();
        self.last_selected = None;
        self.last_clicked_item = None;
    }

    /// Open the editor for the record at a store index
    pub(crate) fn edit_asset(&mut self, idx: usize) {
        match self.store.assets().get(idx) {
            Some(asset) => self.editor = Some(AssetForm::edit(asset)),
            None => warn!(idx, "Edit requested for missing row"),
        }
    }

    pub(crate) fn new_asset(&mut self) {
        self.editor = Some(AssetForm::new());
    }

    /// Ask before deleting the given ids
    pub(crate) fn request_delete(&mut self, ids: Vec<String>) {
        if ids.is_empty() {
            self.show_toast("Select a row to delete first");
            return;
        }
        self.confirm = Some(Confirm::Delete(ids));
    }

    pub(crate) fn delete_assets(&mut self, ids: &[String]) {
        let mut deleted = 0;
        for id in ids {
            match self.store.delete(id) {
                Ok(_) => deleted += 1,
                Err(e) => {
                    self.show_error("Delete", e);
                    break;
                }
            }
        }
        if let Some(form) = &self.editor {
            if form.original_id().is_some_and(|id| ids.iter().any(|d| d == id)) {
                self.editor = None;
            }
        }
        self.clear_selection();
        self.apply_filters();
        if deleted > 0 {
            info!(count = deleted, "Assets deleted");
            self.show_toast(format!("Deleted {deleted} asset(s)"));
        }
    }

    /// Selected rows as tab-separated text, visible columns only
    pub(crate) fn copy_selection(&mut self, ctx: &egui::Context) {
        let rows = self.selected_in_view();
        if rows.is_empty() {
            self.show_toast("Select rows to copy first");
            return;
        }
        let columns = self.visible_columns();
        let grid: Vec<Vec<String>> = rows
            .iter()
            .filter_map(|&i| self.store.assets().get(i))
            .map(|asset| columns.iter().map(|&c| views::cell_text(asset, c)).collect())
            .collect();
        ctx.copy_text(crate::utils::rows_to_tsv(&grid));
        self.show_toast(format!("Copied {} row(s)", grid.len()));
    }

    pub(crate) fn visible_columns(&self) -> Vec<TableColumn> {
        TableColumn::ALL
            .into_iter()
            .filter(|&c| self.settings.is_column_visible(c))
            .collect()
    }

    /// Run `action` now, or ask first when there are unsaved changes
    pub(crate) fn guard_unsaved(&mut self, ctx: &egui::Context, action: PendingAction) {
        if self.store.is_dirty() {
            self.confirm = Some(Confirm::DiscardChanges(action));
        } else {
            self.run_pending(ctx, action);
        }
    }

    pub(crate) fn run_pending(&mut self, ctx: &egui::Context, action: PendingAction) {
        match action {
            PendingAction::Open => self.open_dialog(),
            PendingAction::Exit => {
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }
}
