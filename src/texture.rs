use egui::{Context, TextureHandle, TextureOptions};

use crate::frame::{ChannelOrder, Frame};

/// Uploads a display-order frame into `slot`, reusing the texture across ticks.
pub fn upload_preview(slot: &mut Option<TextureHandle>, ctx: &Context, frame: &Frame) {
    // Skip invalid frames to prevent a white flash
    if frame.width() == 0 || frame.height() == 0 || frame.order() != ChannelOrder::Rgb {
        return;
    }

    let size = [frame.width() as usize, frame.height() as usize];
    let color_image = egui::ColorImage::from_rgb(size, frame.data());

    match slot {
        Some(texture) => {
            // Resolution changes recreate the texture
            if texture.size() == size {
                texture.set(color_image, TextureOptions::LINEAR);
            } else {
                *texture = ctx.load_texture("camera_preview", color_image, TextureOptions::LINEAR);
            }
        }
        None => {
            *slot = Some(ctx.load_texture("camera_preview", color_image, TextureOptions::LINEAR));
        }
    }
}
