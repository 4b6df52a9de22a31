use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use thiserror::Error;

use crate::frame::Frame;

pub const QUICK_SAVE_PREFIX: &str = "webcam";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("unsupported image extension: {0:?}")]
    UnsupportedExtension(String),
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Output formats offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
    Bmp,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 3] = [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Bmp];

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPG",
            ImageFormat::Png => "PNG",
            ImageFormat::Bmp => "BMP",
        }
    }

    /// Name used for the save-as picker filter.
    pub fn filter_name(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG files",
            ImageFormat::Png => "PNG files",
            ImageFormat::Bmp => "BMP files",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, SaveError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| SaveError::UnsupportedExtension(ext.to_string()))
    }
}

/// A single pending write: where, and with which encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub path: PathBuf,
    pub format: ImageFormat,
}

impl SaveRequest {
    /// Picks the encoder from the path's extension.
    pub fn for_path(path: PathBuf) -> Result<Self, SaveError> {
        let format = ImageFormat::from_path(&path)?;
        Ok(Self { path, format })
    }
}

/// `webcam_YYYYMMDD_HHMMSS.<ext>` for the given moment.
pub fn quick_save_filename(format: ImageFormat, now: &DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        QUICK_SAVE_PREFIX,
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Final destination of a save-as pick. Absolute picks are used verbatim,
/// relative ones land in `save_dir`. A missing extension gets `default`'s.
pub fn resolve_save_as_path(save_dir: &Path, picked: &Path, default: ImageFormat) -> PathBuf {
    let mut path = save_dir.join(picked);
    if path.extension().is_none() {
        path.set_extension(default.extension());
    }
    path
}

/// Encodes `frame` to `request.path`. Frames are converted to RGB first,
/// which is what every `image` encoder consumes.
pub fn write_frame(frame: &Frame, request: &SaveRequest, jpeg_quality: u8) -> Result<(), SaveError> {
    let rgb = frame.to_rgb_image();
    let (width, height) = rgb.dimensions();

    match request.format {
        ImageFormat::Jpeg => {
            let mut writer = BufWriter::new(File::create(&request.path)?);
            JpegEncoder::new_with_quality(&mut writer, jpeg_quality).encode(
                rgb.as_raw(),
                width,
                height,
                ColorType::Rgb8,
            )?;
            writer.flush()?;
        }
        ImageFormat::Png => rgb.save_with_format(&request.path, image::ImageFormat::Png)?,
        ImageFormat::Bmp => rgb.save_with_format(&request.path, image::ImageFormat::Bmp)?,
    }

    Ok(())
}
