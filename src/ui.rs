use std::path::{Path, PathBuf};
use std::time::Instant;

use eframe::egui;

use crate::controller::{Controller, Dialogs, SaveOutcome};
use crate::save::ImageFormat;
use crate::texture;

const UI_PADDING: f32 = 10.0;

// ============================================================================
// MAIN APP STRUCT
// ============================================================================

pub struct WebcamApp {
    controller: Controller,
    preview_texture: Option<egui::TextureHandle>,
    last_tick: Option<Instant>,
}

impl WebcamApp {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            preview_texture: None,
            last_tick: None,
        }
    }
}

// ============================================================================
// MAIN UPDATE LOOP
// ============================================================================

impl eframe::App for WebcamApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Window manager close: let it proceed, just tear down first
        if ctx.input(|i| i.viewport().close_requested()) {
            self.shut_down();
        }

        self.update_camera_preview(ctx);
        self.render_ui(ctx);

        // Re-arm the host timer while the tick is still scheduled
        if let Some(delay) = self.controller.preview().next_tick() {
            ctx.request_repaint_after(delay);
        }
    }
}

impl WebcamApp {
    fn shut_down(&mut self) {
        if self.controller.shutdown() {
            log::info!("Controller {:?}", self.controller.lifecycle());
        }
    }

    fn update_camera_preview(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let interval = self.controller.preview().interval();
        let due = match self.last_tick {
            None => true,
            Some(last) => now.duration_since(last) >= interval,
        };
        if !due {
            return;
        }

        self.last_tick = Some(now);
        let slot = &mut self.preview_texture;
        self.controller
            .tick(|frame| texture::upload_preview(slot, ctx, frame));
    }

    fn render_ui(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                self.render_preview(ui);
                ui.add_space(UI_PADDING);
                self.render_save_buttons(ui);
                ui.add_space(UI_PADDING / 2.0);
                self.render_format_picker(ui);
                ui.add_space(UI_PADDING / 2.0);
                self.render_directory_row(ui);
                ui.add_space(UI_PADDING);

                if ui.button("Exit").clicked() {
                    self.shut_down();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });
    }

    fn render_preview(&mut self, ui: &mut egui::Ui) {
        // Leave room for the controls below the image
        let available = ui.available_size() - egui::vec2(0.0, 160.0);
        let available = available.max(egui::vec2(1.0, 1.0));

        match &self.preview_texture {
            Some(texture) => {
                let display_size = fit_image_in_rect(texture.size_vec2(), available);
                ui.add(egui::Image::new(texture).fit_to_exact_size(display_size));
            }
            None => {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(available.x, available.y), egui::Sense::hover());
                ui.painter().rect_filled(rect, 0.0, egui::Color32::from_rgb(40, 40, 40));
            }
        }
    }

    fn render_save_buttons(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Quick Save").clicked() {
                self.controller.quick_save();
            }
            if ui.button("Save As...").clicked() {
                if let SaveOutcome::Written(path) = self.controller.save_as() {
                    log::debug!("Save as wrote {}", path.display());
                }
            }
        });
    }

    fn render_format_picker(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Image Format");
            ui.horizontal(|ui| {
                let mut selected = self.controller.state().format();
                for format in ImageFormat::ALL {
                    ui.radio_value(&mut selected, format, format.label());
                }
                if selected != self.controller.state().format() {
                    self.controller.select_format(selected);
                }
            });
        });
    }

    fn render_directory_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Change Save Location").clicked() {
                self.controller.change_save_dir();
            }
            ui.label(format!("Save to: {}", self.controller.state().save_dir().display()));
        });
    }
}

// ============================================================================
// DIALOGS
// ============================================================================

/// Native pickers and message boxes.
pub struct RfdDialogs;

impl Dialogs for RfdDialogs {
    fn pick_directory(&mut self, initial: &Path) -> Option<PathBuf> {
        rfd::FileDialog::new().set_directory(initial).pick_folder()
    }

    fn pick_save_path(&mut self, initial: &Path, default: ImageFormat) -> Option<PathBuf> {
        // Selected format's filter goes first so it is the active one
        let ordered = std::iter::once(default)
            .chain(ImageFormat::ALL.into_iter().filter(move |f| *f != default));

        let mut dialog = rfd::FileDialog::new()
            .set_directory(initial)
            .set_file_name(&format!("webcam.{}", default.extension()));
        for format in ordered {
            dialog = dialog.add_filter(format.filter_name(), &[format.extension()]);
        }

        dialog.add_filter("All files", &["*"]).save_file()
    }

    fn info(&mut self, title: &str, message: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn error(&mut self, title: &str, message: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn fit_image_in_rect(image_size: egui::Vec2, container_size: egui::Vec2) -> egui::Vec2 {
    let scale = (container_size.x / image_size.x).min(container_size.y / image_size.y);
    image_size * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_image_in_rect_keeps_aspect() {
        let fitted = fit_image_in_rect(egui::vec2(640.0, 480.0), egui::vec2(320.0, 480.0));
        assert_eq!(fitted, egui::vec2(320.0, 240.0));

        let fitted = fit_image_in_rect(egui::vec2(100.0, 50.0), egui::vec2(400.0, 400.0));
        assert_eq!(fitted, egui::vec2(400.0, 200.0));
    }
}
