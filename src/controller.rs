use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::camera::Capture;
use crate::frame::Frame;
use crate::preview::{Preview, TickOutcome};
use crate::save::{self, ImageFormat, SaveRequest};
use crate::state::AppState;

/// OS-provided pickers and notifications.
pub trait Dialogs {
    /// Existing directory chosen by the user, or `None` on cancel.
    fn pick_directory(&mut self, initial: &Path) -> Option<PathBuf>;
    fn pick_save_path(&mut self, initial: &Path, default: ImageFormat) -> Option<PathBuf>;
    fn info(&mut self, title: &str, message: &str);
    fn error(&mut self, title: &str, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    ShuttingDown,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written(PathBuf),
    /// No fresh frame, or the encoder failed. Nothing is shown to the user.
    Skipped,
    /// Save-as picker dismissed.
    Cancelled,
}

/// Owns everything the window drives: session state, camera and preview.
pub struct Controller {
    state: AppState,
    capture: Capture,
    preview: Preview,
    dialogs: Box<dyn Dialogs>,
    jpeg_quality: u8,
    lifecycle: Lifecycle,
}

impl Controller {
    pub fn new(state: AppState, capture: Capture, dialogs: Box<dyn Dialogs>, jpeg_quality: u8) -> Self {
        Self {
            state,
            capture,
            preview: Preview::default(),
            dialogs,
            jpeg_quality,
            lifecycle: Lifecycle::Running,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn tick<R>(&mut self, render: R) -> TickOutcome
    where
        R: FnOnce(&Frame),
    {
        self.preview.tick(&self.state, &mut self.capture, render)
    }

    pub fn select_format(&mut self, format: ImageFormat) {
        self.state.set_format(format);
    }

    /// Asks for a new save directory. Returns `true` if it changed.
    pub fn change_save_dir(&mut self) -> bool {
        match self.dialogs.pick_directory(self.state.save_dir()) {
            Some(dir) => {
                self.state.set_save_dir(dir);
                true
            }
            None => false,
        }
    }

    pub fn quick_save(&mut self) -> SaveOutcome {
        self.quick_save_at(&Local::now())
    }

    /// Saves under a timestamped name in the current directory. Same-second
    /// repeats overwrite.
    pub fn quick_save_at(&mut self, now: &DateTime<Local>) -> SaveOutcome {
        let filename = save::quick_save_filename(self.state.format(), now);
        let path = self.state.save_dir().join(&filename);

        let outcome = self.save_image(path);
        if let SaveOutcome::Written(_) = outcome {
            self.dialogs.info("Saved", &format!("Image saved as:\n{}", filename));
        }
        outcome
    }

    pub fn save_as(&mut self) -> SaveOutcome {
        let format = self.state.format();
        let Some(picked) = self.dialogs.pick_save_path(self.state.save_dir(), format) else {
            return SaveOutcome::Cancelled;
        };

        let path = save::resolve_save_as_path(self.state.save_dir(), &picked, format);
        self.save_image(path)
    }

    /// Pulls a fresh frame and writes it to `path`, encoder chosen by
    /// extension. Every failure is logged and swallowed.
    pub fn save_image(&mut self, path: PathBuf) -> SaveOutcome {
        let request = match SaveRequest::for_path(path) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Save skipped: {}", e);
                return SaveOutcome::Skipped;
            }
        };

        let frame = match self.capture.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Save skipped, no frame: {}", e);
                return SaveOutcome::Skipped;
            }
        };

        match save::write_frame(&frame, &request, self.jpeg_quality) {
            Ok(()) => {
                log::info!("Frame {} saved to {}", frame.sequence(), request.path.display());
                SaveOutcome::Written(request.path)
            }
            Err(e) => {
                log::warn!("Failed to save {}: {}", request.path.display(), e);
                SaveOutcome::Skipped
            }
        }
    }

    /// Stops the preview and releases the camera. Safe to call from both
    /// the Exit action and the window close. Returns `true` on the call
    /// that did the work.
    pub fn shutdown(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Running {
            return false;
        }

        log::info!("Shutting down");
        self.lifecycle = Lifecycle::ShuttingDown;
        self.state.stop();
        self.capture.release();
        self.lifecycle = Lifecycle::Terminated;
        true
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    pub struct Recorded {
        pub infos: Vec<(String, String)>,
        pub errors: Vec<(String, String)>,
        pub save_prompts: Vec<(PathBuf, ImageFormat)>,
    }

    /// Pickers return scripted answers; notifications are recorded.
    #[derive(Default)]
    pub struct StubDialogs {
        pub directories: VecDeque<Option<PathBuf>>,
        pub save_paths: VecDeque<Option<PathBuf>>,
        pub recorded: Rc<RefCell<Recorded>>,
    }

    impl Dialogs for StubDialogs {
        fn pick_directory(&mut self, _initial: &Path) -> Option<PathBuf> {
            self.directories.pop_front().flatten()
        }

        fn pick_save_path(&mut self, initial: &Path, default: ImageFormat) -> Option<PathBuf> {
            self.recorded
                .borrow_mut()
                .save_prompts
                .push((initial.to_path_buf(), default));
            self.save_paths.pop_front().flatten()
        }

        fn info(&mut self, title: &str, message: &str) {
            self.recorded
                .borrow_mut()
                .infos
                .push((title.to_string(), message.to_string()));
        }

        fn error(&mut self, title: &str, message: &str) {
            self.recorded
                .borrow_mut()
                .errors
                .push((title.to_string(), message.to_string()));
        }
    }
}
