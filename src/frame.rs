use image::RgbImage;
use thiserror::Error;

/// Byte order of the three color channels in a packed 24-bit frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Order the capture device delivers (B, G, R)
    Bgr,
    /// Order the display surface and the encoders expect (R, G, B)
    Rgb,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame buffer holds {actual} bytes, {width}x{height} needs {expected}")]
    BadLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to decode MJPEG frame: {0}")]
    Mjpeg(#[from] image::ImageError),
}

/// One still image pulled from the capture device.
///
/// Pixel data is packed, 3 bytes per pixel, row-major. `sequence` is the
/// arrival order assigned by [`crate::camera::Capture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    order: ChannelOrder,
    data: Vec<u8>,
    sequence: u64,
}

impl Frame {
    pub fn new(width: u32, height: u32, order: ChannelOrder, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(FrameError::BadLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            order,
            data,
            sequence: 0,
        })
    }

    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Reorders channels into `order`. Swapping the first and third byte of
    /// every pixel is its own inverse, so converting back reproduces the
    /// original buffer exactly.
    pub fn to_order(&self, order: ChannelOrder) -> Frame {
        if order == self.order {
            return self.clone();
        }

        let mut data = self.data.clone();
        swap_red_blue(&mut data);

        Frame {
            width: self.width,
            height: self.height,
            order,
            data,
            sequence: self.sequence,
        }
    }

    /// Display-order copy of the frame as an `image` buffer.
    pub fn to_rgb_image(&self) -> RgbImage {
        let rgb = self.to_order(ChannelOrder::Rgb);
        // Length is validated in `Frame::new`, so `from_raw` cannot fail here
        RgbImage::from_raw(rgb.width, rgb.height, rgb.data)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

pub fn swap_red_blue(data: &mut [u8]) {
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
}

fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Converts a packed YUYV (YUV 4:2:2) buffer into BGR using integer BT.601
/// coefficients. Each 4-byte group `Y0 U Y1 V` yields two pixels. `stride`
/// is the driver's bytes per line; 0 means rows are tightly packed.
pub fn yuyv_to_bgr(yuyv: &[u8], width: u32, height: u32, stride: u32) -> Result<Frame, FrameError> {
    let row_bytes = (width as usize).div_ceil(2) * 4;
    let stride = (stride as usize).max(row_bytes);
    let expected = match height as usize {
        0 => 0,
        rows => stride * (rows - 1) + row_bytes,
    };
    if yuyv.len() < expected {
        return Err(FrameError::BadLength {
            width,
            height,
            expected,
            actual: yuyv.len(),
        });
    }

    let mut bgr = Vec::with_capacity(width as usize * height as usize * 3);
    for row in 0..height as usize {
        let line = &yuyv[row * stride..row * stride + row_bytes];
        for x in 0..width as usize {
            let group = &line[(x / 2) * 4..(x / 2) * 4 + 4];
            let y = group[(x % 2) * 2] as i32;
            let u = group[1] as i32 - 128;
            let v = group[3] as i32 - 128;

            let c = (y - 16).max(0) * 298;
            let r = (c + 409 * v + 128) >> 8;
            let g = (c - 100 * u - 208 * v + 128) >> 8;
            let b = (c + 516 * u + 128) >> 8;
            bgr.extend_from_slice(&[clamp_u8(b), clamp_u8(g), clamp_u8(r)]);
        }
    }

    Frame::new(width, height, ChannelOrder::Bgr, bgr)
}

/// Decodes a motion-JPEG buffer and returns it in BGR order.
pub fn mjpeg_to_bgr(jpeg: &[u8]) -> Result<Frame, FrameError> {
    let decoded = image::load_from_memory_with_format(jpeg, image::ImageFormat::Jpeg)?.to_rgb8();
    let (width, height) = decoded.dimensions();
    let mut data = decoded.into_raw();
    swap_red_blue(&mut data);
    Frame::new(width, height, ChannelOrder::Bgr, data)
}
