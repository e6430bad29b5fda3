#![windows_subsystem = "windows"]
//! IT Asset Manager - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod asset;
mod constants;
mod files;
mod qr;
mod schema;
mod search;
mod settings;
mod store;
mod theme;
mod types;
mod ui;
mod utils;

use app::App;
use constants::*;
use eframe::egui;
use tracing::{debug, info};
use types::PendingAction;

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "it-asset-manager.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,it_asset_manager=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = utils::get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "IT Asset Manager starting");

    // Load saved window position/size
    let settings = settings::Settings::load(&data_dir);
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(1400.0, 820.0)))
        .with_min_inner_size([1000.0, 600.0])
        .with_title(APP_NAME);

    if let Some((rgba, width, height)) = utils::rasterize_icon(64) {
        viewport = viewport.with_icon(std::sync::Arc::new(egui::IconData { rgba, width, height }));
    }

    let needs_center = win_pos.is_none();
    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, settings, data_dir);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP & UI RENDERING
// ============================================================================

impl App {
    fn any_modal_open(&self) -> bool {
        self.editor.is_some() || self.confirm.is_some() || self.error_message.is_some() || self.show_about
    }

    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar")
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_ELEVATED)
                    .inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("File", |ui| {
                        if ui.button("Open...").clicked() {
                            ui.close_menu();
                            self.guard_unsaved(ctx, PendingAction::Open);
                        }
                        if ui.button("Import...").clicked() {
                            ui.close_menu();
                            self.import_dialog();
                        }
                        if ui.button("Export...").clicked() {
                            ui.close_menu();
                            self.export_dialog();
                        }
                        ui.separator();
                        if ui.button("Save").clicked() {
                            ui.close_menu();
                            self.save();
                        }
                        if ui.button("Save As...").clicked() {
                            ui.close_menu();
                            self.save_as_dialog();
                        }
                        ui.separator();
                        if ui.button("Create Template...").clicked() {
                            ui.close_menu();
                            self.create_template_dialog();
                        }
                        ui.separator();
                        if ui.button("Exit").clicked() {
                            ui.close_menu();
                            self.guard_unsaved(ctx, PendingAction::Exit);
                        }
                    });
                    ui.menu_button("Edit", |ui| {
                        if ui.button("Select All").clicked() {
                            ui.close_menu();
                            self.selected_indices.extend(self.filtered_indices.iter().copied());
                        }
                        if ui.button("Copy").clicked() {
                            ui.close_menu();
                            self.copy_selection(ctx);
                        }
                        ui.separator();
                        if ui.button("Add Asset...").clicked() {
                            ui.close_menu();
                            self.new_asset();
                        }
                    });
                    ui.menu_button("Help", |ui| {
                        if ui.button("About").clicked() {
                            ui.close_menu();
                            self.show_about = true;
                        }
                    });
                });
            });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if self.any_modal_open() {
            return;
        }
        let typing = ctx.wants_keyboard_input();
        let mut copy = false;
        ctx.input(|i| {
            if i.events.iter().any(|e| matches!(e, egui::Event::Copy)) && !typing {
                copy = true;
            }
        });
        if copy {
            self.copy_selection(ctx);
        }

        let (save, open, add, select_all, escape, delete, enter) = ctx.input_mut(|i| {
            (
                i.consume_key(egui::Modifiers::COMMAND, egui::Key::S),
                i.consume_key(egui::Modifiers::COMMAND, egui::Key::O),
                i.consume_key(egui::Modifiers::COMMAND, egui::Key::N),
                !typing && i.consume_key(egui::Modifiers::COMMAND, egui::Key::A),
                !typing && i.key_pressed(egui::Key::Escape),
                !typing && i.key_pressed(egui::Key::Delete),
                !typing && i.key_pressed(egui::Key::Enter),
            )
        });

        if save {
            self.save();
        }
        if open {
            self.guard_unsaved(ctx, PendingAction::Open);
        }
        if add {
            self.new_asset();
        }
        if select_all {
            self.selected_indices.extend(self.filtered_indices.iter().copied());
        }
        if escape {
            self.clear_selection();
        }
        if delete {
            let ids = self.selected_ids();
            self.request_delete(ids);
        }
        if enter {
            if let [idx] = self.selected_in_view().as_slice() {
                self.edit_asset(*idx);
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Hold the window open while there are unsaved changes
        if ctx.input(|i| i.viewport().close_requested()) && self.store.is_dirty() && !self.allow_close {
            debug!("Close requested with unsaved changes");
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.confirm = Some(types::Confirm::DiscardChanges(PendingAction::Exit));
        }

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        let title = self.window_title();
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }

        self.handle_shortcuts(ctx);
        self.render_menu_bar(ctx);
        self.render_sidebar(ctx);

        // Central panel - asset table (added after the side/top panels)
        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(12)),
            )
            .show(ctx, |ui| {
                self.central_panel_rect = Some(ui.max_rect());

                ui.horizontal(|ui| {
                    let mut status = format!(
                        "Showing {} of {} assets",
                        self.filtered_indices.len(),
                        self.store.len()
                    );
                    let selected = self.selected_indices.len();
                    if selected > 0 {
                        status.push_str(&format!(" • {selected} selected"));
                    }
                    ui.add(egui::Label::new(egui::RichText::new(status).color(theme::TEXT_DIM)).selectable(false));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(theme::button_accent(format!("{}  Add Asset", egui_phosphor::regular::PLUS)))
                            .clicked()
                        {
                            self.new_asset();
                        }
                    });
                });
                ui.add_space(theme::SPACING_MD);

                if self.store.is_empty() {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new("Open an asset file or add an asset to get started")
                                .color(theme::TEXT_DIM),
                        );
                    });
                } else {
                    if self.filtered_indices.is_empty() {
                        ui.label(egui::RichText::new("No assets match the search").color(theme::STATUS_WARNING));
                    }
                    self.render_table(ui);
                }
            });

        self.render_editor(ctx);
        self.render_confirm(ctx);
        self.render_about(ctx);
        self.render_error_modal(ctx);
        self.render_toast(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.save_settings();
    }
}
