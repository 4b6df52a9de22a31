use std::path::{Path, PathBuf};

use crate::save::ImageFormat;

/// Mutable session state. Reset to defaults on every launch.
#[derive(Debug, Clone)]
pub struct AppState {
    save_dir: PathBuf,
    format: ImageFormat,
    running: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(default_save_dir())
    }
}

impl AppState {
    pub fn new(save_dir: PathBuf) -> Self {
        Self {
            save_dir,
            format: ImageFormat::default(),
            running: true,
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn set_save_dir(&mut self, dir: PathBuf) {
        log::info!("Save directory changed to {}", dir.display());
        self.save_dir = dir;
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn set_format(&mut self, format: ImageFormat) {
        self.format = format;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// One-way: nothing sets the flag back.
    pub fn stop(&mut self) {
        self.running = false;
    }
}

/// The user's home directory, or the working directory if it is unknown.
pub fn default_save_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = AppState::default();
        assert_eq!(state.format(), ImageFormat::Jpeg);
        assert!(state.is_running());
        if let Some(home) = dirs::home_dir() {
            assert_eq!(state.save_dir(), home.as_path());
        }
    }

    #[test]
    fn test_mutations() {
        let mut state = AppState::new(PathBuf::from("/tmp/a"));
        state.set_format(ImageFormat::Bmp);
        state.set_save_dir(PathBuf::from("/tmp/b"));
        state.stop();

        assert_eq!(state.format(), ImageFormat::Bmp);
        assert_eq!(state.save_dir(), Path::new("/tmp/b"));
        assert!(!state.is_running());
    }
}
