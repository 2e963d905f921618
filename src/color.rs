use image::Rgba;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xff)
    }

    pub fn with_a(mut self, a: u8) -> Self {
        self.a = a;
        self
    }

    /// Compare colour channels only, ignoring alpha
    pub fn same_rgb(&self, pixel: &Rgba<u8>) -> bool {
        let [r, g, b, _] = pixel.0;
        self.r == r && self.g == g && self.b == b
    }
}

impl From<Color> for Rgba<u8> {
    fn from(value: Color) -> Self {
        let Color { r, g, b, a } = value;
        Rgba([r, g, b, a])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(value: Rgba<u8>) -> Self {
        let [r, g, b, a] = value.0;
        Self { r, g, b, a }
    }
}

pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const BLUE: Color = Color::rgb(0, 0, 0xff);
pub const GREEN: Color = Color::rgb(0, 0x80, 0);
pub const RED: Color = Color::rgb(0xff, 0, 0);
pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0);
pub const FUCHSIA: Color = Color::rgb(0xff, 0x00, 0xff);
