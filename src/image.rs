use core::fmt;
use std::{fmt::Debug, sync::Arc};

use glam::UVec2;
use image::{DynamicImage, RgbaImage};

/// Image
/// Decoded RGBA pixels shared between animations.
/// Cloning an image only bumps a reference count; pixels are never written
/// through an `Image`, transforms always produce a new one.
#[derive(Clone)]
pub struct Image {
    pixels: Arc<RgbaImage>,
}

impl Image {
    /// Build image from decoded pixels
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Build a fully transparent image
    pub fn empty(size: UVec2) -> Self {
        Self::new(RgbaImage::new(size.x, size.y))
    }

    /// Return the pixel buffer
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether both images share the same pixel buffer
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl From<RgbaImage> for Image {
    fn from(value: RgbaImage) -> Self {
        Self::new(value)
    }
}

impl From<DynamicImage> for Image {
    fn from(value: DynamicImage) -> Self {
        Self::new(value.into_rgba8())
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.pixels == *other.pixels
    }
}

impl Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        f.debug_struct("Image").field("size", &size).finish()
    }
}

impl Image {
    /// Return image size
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.pixels.width(), self.pixels.height())
    }
}
