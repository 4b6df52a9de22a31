use anyhow::{anyhow, Result};
use eframe::egui;
use log::{error, info};

mod camera;
mod camera_controller;
mod config;
mod controller;
mod frame;
mod preview;
mod save;
mod state;
mod texture;
mod ui;

use crate::camera::{Capture, CaptureError, CaptureSource};
use crate::camera_controller::{V4lCamera, DEFAULT_DEVICE_INDEX};
use crate::config::Config;
use crate::controller::{Controller, Dialogs};
use crate::state::AppState;
use crate::ui::{RfdDialogs, WebcamApp};

fn main() -> Result<()> {
    env_logger::init();
    info!("📷 Starting webcam capture");

    // Load configuration
    let config = Config::load();
    info!("Configuration loaded: {}x{} window", config.window.width, config.window.height);

    let capture = open_camera(|| V4lCamera::open(DEFAULT_DEVICE_INDEX), &mut RfdDialogs)?;

    let state = AppState::default();
    info!("Saving to {}", state.save_dir().display());

    let controller = Controller::new(
        state,
        capture,
        Box::new(RfdDialogs),
        config.output.jpeg_quality,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window.title.clone())
            .with_inner_size([config.window.width as f32, config.window.height as f32])
            .with_min_inner_size([320.0, 320.0]),
        ..Default::default()
    };

    info!("Launching GUI application...");

    eframe::run_native(
        &config.window.title,
        options,
        Box::new(|cc| {
            setup_style(&cc.egui_ctx);
            Box::new(WebcamApp::new(controller))
        }),
    )
    .map_err(|e| anyhow!("Failed to run application: {}", e))?;

    info!("Application shut down gracefully");
    Ok(())
}

/// Startup is the only place a camera failure is fatal: the user gets a
/// blocking error dialog and the process exits.
fn open_camera<S, F>(open: F, dialogs: &mut dyn Dialogs) -> Result<Capture>
where
    S: CaptureSource + 'static,
    F: FnOnce() -> Result<S, CaptureError>,
{
    match open() {
        Ok(camera) => Ok(Capture::new(Box::new(camera))),
        Err(e) => {
            error!("Camera initialization failed: {}", e);
            dialogs.error("Error", "Could not open webcam!");
            Err(anyhow!(e).context("Failed to start"))
        }
    }
}

fn setup_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);

    style.text_styles.insert(
        egui::TextStyle::Button,
        egui::FontId::new(15.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Body,
        egui::FontId::new(14.0, egui::FontFamily::Proportional),
    );

    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::camera::testing::StubSource;
    use crate::controller::testing::StubDialogs;

    #[test]
    fn test_open_failure_shows_one_error_and_fails() {
        let mut dialogs = StubDialogs::default();
        let recorded = dialogs.recorded.clone();

        let result = open_camera(
            || -> Result<StubSource, CaptureError> {
                Err(CaptureError::Open {
                    index: DEFAULT_DEVICE_INDEX,
                    source: io::Error::new(io::ErrorKind::NotFound, "no /dev/video0"),
                })
            },
            &mut dialogs,
        );

        let err = result.err().unwrap();
        assert!(format!("{:#}", err).starts_with("Failed to start"));

        let recorded = recorded.borrow();
        assert_eq!(
            recorded.errors,
            vec![("Error".to_string(), "Could not open webcam!".to_string())]
        );
        assert!(recorded.infos.is_empty());
    }

    #[test]
    fn test_open_success_is_silent() {
        let mut dialogs = StubDialogs::default();
        let recorded = dialogs.recorded.clone();

        let Ok(mut capture) = open_camera(|| Ok(StubSource::always()), &mut dialogs) else {
            panic!("opening a working camera failed");
        };
        assert!(capture.read_frame().is_ok());
        assert!(recorded.borrow().errors.is_empty());
    }
}
