use glam::IVec2;
use image::{imageops, RgbaImage};

use crate::image::Image;

/// A surface frames are drawn onto.
///
/// The animation never owns a surface, the game loop hands one in per draw.
pub trait RenderTarget {
    /// Draw `image` with its top-left corner at `pos`
    fn draw(&mut self, image: &Image, pos: IVec2);
}

/// Software surface, alpha blends the frame over the existing pixels
impl RenderTarget for RgbaImage {
    fn draw(&mut self, image: &Image, pos: IVec2) {
        imageops::overlay(self, image.pixels(), pos.x as i64, pos.y as i64);
    }
}
