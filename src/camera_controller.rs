use crate::camera::{CaptureError, CaptureSource};
use crate::frame::Frame;

#[cfg(target_os = "linux")]
pub use linux::V4lCamera;

#[cfg(not(target_os = "linux"))]
pub use unsupported::V4lCamera;

/// Index of the default system camera (`/dev/video0`)
pub const DEFAULT_DEVICE_INDEX: usize = 0;

#[cfg(target_os = "linux")]
mod linux {
    use v4l::buffer::Type;
    use v4l::io::traits::CaptureStream;
    use v4l::prelude::*;
    use v4l::video::Capture;
    use v4l::FourCC;

    use super::*;
    use crate::frame::{mjpeg_to_bgr, yuyv_to_bgr};

    const BUFFER_COUNT: u32 = 4;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum PixelFormat {
        Yuyv,
        Mjpeg,
    }

    /// Webcam driven through V4L2 memory-mapped streaming
    pub struct V4lCamera {
        index: usize,
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
        stream: Option<MmapStream<'static>>,
        device: Option<Device>,
    }

    impl V4lCamera {
        /// Opens the camera and starts streaming. YUYV is requested; drivers
        /// that only stream MJPG are accepted too.
        pub fn open(index: usize) -> Result<Self, CaptureError> {
            log::info!("Opening camera {}...", index);
            let open_err = |source| CaptureError::Open { index, source };

            let device = Device::new(index).map_err(open_err)?;
            let mut requested = device.format().map_err(open_err)?;
            requested.fourcc = FourCC::new(b"YUYV");

            let negotiated = match device.set_format(&requested) {
                Ok(format) => format,
                Err(e) => {
                    log::warn!("Could not set YUYV format ({}), using current device format", e);
                    device.format().map_err(open_err)?
                }
            };

            let format = if negotiated.fourcc == FourCC::new(b"YUYV") {
                PixelFormat::Yuyv
            } else if negotiated.fourcc == FourCC::new(b"MJPG") {
                PixelFormat::Mjpeg
            } else {
                return Err(CaptureError::UnsupportedFormat(negotiated.fourcc.to_string()));
            };

            let stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
                .map_err(open_err)?;

            log::info!(
                "Camera {} streaming {}x{} {:?}",
                index,
                negotiated.width,
                negotiated.height,
                format
            );

            Ok(Self {
                index,
                width: negotiated.width,
                height: negotiated.height,
                stride: negotiated.stride,
                format,
                stream: Some(stream),
                device: Some(device),
            })
        }
    }

    impl CaptureSource for V4lCamera {
        fn read_frame(&mut self) -> Result<Frame, CaptureError> {
            let stream = self.stream.as_mut().ok_or(CaptureError::Released)?;
            let (buf, meta) = stream.next()?;

            let used = (meta.bytesused as usize).min(buf.len());
            if used == 0 {
                return Err(CaptureError::NoFrame);
            }
            let buf = &buf[..used];

            let frame = match self.format {
                PixelFormat::Yuyv => yuyv_to_bgr(buf, self.width, self.height, self.stride)?,
                PixelFormat::Mjpeg => mjpeg_to_bgr(buf)?,
            };
            Ok(frame)
        }

        fn release(&mut self) {
            // Stream first so buffers are unmapped before the device closes
            self.stream.take();
            self.device.take();
            log::debug!("V4L2 device {} closed", self.index);
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod unsupported {
    use super::*;

    pub struct V4lCamera;

    impl V4lCamera {
        pub fn open(_index: usize) -> Result<Self, CaptureError> {
            Err(CaptureError::UnsupportedPlatform)
        }
    }

    impl CaptureSource for V4lCamera {
        fn read_frame(&mut self) -> Result<Frame, CaptureError> {
            Err(CaptureError::UnsupportedPlatform)
        }

        fn release(&mut self) {}
    }
}
