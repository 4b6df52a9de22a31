use thiserror::Error;

use crate::frame::{Frame, FrameError};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not open camera {index}: {source}")]
    Open {
        index: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("camera offers no supported pixel format (got {0})")]
    UnsupportedFormat(String),
    #[error("camera capture is not supported on this platform")]
    #[cfg_attr(target_os = "linux", allow(dead_code))]
    UnsupportedPlatform,
    #[error("frame read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("frame could not be decoded: {0}")]
    Decode(#[from] FrameError),
    #[error("no frame available")]
    NoFrame,
    #[error("camera already released")]
    Released,
}

/// Anything that can hand out frames on demand.
pub trait CaptureSource {
    fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Frees the underlying device. Only ever called once by [`Capture`].
    fn release(&mut self);
}

/// Exclusive owner of the open capture source.
///
/// Stamps the arrival sequence on each frame, refuses reads once released
/// and forwards `release` to the source at most once.
pub struct Capture {
    source: Option<Box<dyn CaptureSource>>,
    next_sequence: u64,
}

impl Capture {
    pub fn new(source: Box<dyn CaptureSource>) -> Self {
        Self {
            source: Some(source),
            next_sequence: 0,
        }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    pub fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let source = self.source.as_mut().ok_or(CaptureError::Released)?;
        let frame = source.read_frame()?;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Ok(frame.with_sequence(sequence))
    }

    /// Returns `true` if this call actually released the source.
    pub fn release(&mut self) -> bool {
        match self.source.take() {
            Some(mut source) => {
                source.release();
                log::info!("Camera released");
                true
            }
            None => false,
        }
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::frame::ChannelOrder;

    /// Scripted source: pops `true` (frame) / `false` (miss) per read, then
    /// keeps yielding frames once the script runs out.
    pub struct StubSource {
        pub script: VecDeque<bool>,
        pub reads: Rc<Cell<usize>>,
        pub releases: Rc<Cell<usize>>,
    }

    impl StubSource {
        pub fn new(script: &[bool]) -> Self {
            Self {
                script: script.iter().copied().collect(),
                reads: Rc::new(Cell::new(0)),
                releases: Rc::new(Cell::new(0)),
            }
        }

        pub fn always() -> Self {
            Self::new(&[])
        }
    }

    /// 4x2 BGR frame: blue, green, red, white on top, black row below.
    pub fn sample_frame() -> Frame {
        let data = vec![
            255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255, //
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        Frame::new(4, 2, ChannelOrder::Bgr, data).unwrap()
    }

    impl CaptureSource for StubSource {
        fn read_frame(&mut self) -> Result<Frame, CaptureError> {
            self.reads.set(self.reads.get() + 1);
            match self.script.pop_front() {
                Some(false) => Err(CaptureError::NoFrame),
                _ => Ok(sample_frame()),
            }
        }

        fn release(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }
}
