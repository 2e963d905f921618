//! Pixel transforms applied to animation frames.
//!
//! Every function reads a source buffer and returns a new one, nothing is
//! modified in place. Angles are in degrees, counterclockwise on screen.

use bitflags::bitflags;
use glam::{UVec2, Vec2};
use image::{
    imageops::{self, FilterType},
    Rgba, RgbaImage,
};

use crate::{
    color::Color,
    errors::{Error, Result},
    types::Anchor,
};

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flip: u8 {
        const NONE = 0;
        // Mirror horizontally
        const X = 1 << 0;
        // Mirror vertically
        const Y = 1 << 1;
        const BOTH = Flip::X.bits() | Flip::Y.bits();
    }
}

impl Flip {
    pub fn new(x: bool, y: bool) -> Self {
        let mut flip = Flip::NONE;
        flip.set(Flip::X, x);
        flip.set(Flip::Y, y);
        flip
    }
}

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

pub fn flip(src: &RgbaImage, flip: Flip) -> RgbaImage {
    match (flip.contains(Flip::X), flip.contains(Flip::Y)) {
        (true, true) => imageops::rotate180(src),
        (true, false) => imageops::flip_horizontal(src),
        (false, true) => imageops::flip_vertical(src),
        (false, false) => src.clone(),
    }
}

pub(crate) fn check_size(size: UVec2) -> Result<()> {
    if size.x == 0 || size.y == 0 {
        return Err(Error::InvalidTargetSize {
            width: size.x,
            height: size.y,
        });
    }
    Ok(())
}

pub(crate) fn check_scale(scale: f32) -> Result<()> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(Error::InvalidScale(scale));
    }
    Ok(())
}

/// Resize with nearest neighbour sampling
pub fn scale(src: &RgbaImage, size: UVec2) -> Result<RgbaImage> {
    check_size(size)?;
    Ok(imageops::resize(src, size.x, size.y, FilterType::Nearest))
}

/// Resize with linear filtering, slower but smoother than `scale`
pub fn smoothscale(src: &RgbaImage, size: UVec2) -> Result<RgbaImage> {
    check_size(size)?;
    Ok(imageops::resize(src, size.x, size.y, FilterType::Triangle))
}

/// Double the size with the Scale2x (EPX) pixel art algorithm
pub fn scale2x(src: &RgbaImage) -> RgbaImage {
    let (w, h) = src.dimensions();
    let mut dst = RgbaImage::new(w * 2, h * 2);
    if w == 0 || h == 0 {
        return dst;
    }
    for y in 0..h {
        for x in 0..w {
            let p = *src.get_pixel(x, y);
            let a = *src.get_pixel(x, y.saturating_sub(1));
            let b = *src.get_pixel((x + 1).min(w - 1), y);
            let c = *src.get_pixel(x.saturating_sub(1), y);
            let d = *src.get_pixel(x, (y + 1).min(h - 1));

            let e0 = if c == a && c != d && a != b { a } else { p };
            let e1 = if a == b && a != c && b != d { b } else { p };
            let e2 = if d == c && d != b && c != a { c } else { p };
            let e3 = if b == d && b != a && d != c { d } else { p };

            dst.put_pixel(x * 2, y * 2, e0);
            dst.put_pixel(x * 2 + 1, y * 2, e1);
            dst.put_pixel(x * 2, y * 2 + 1, e2);
            dst.put_pixel(x * 2 + 1, y * 2 + 1, e3);
        }
    }
    dst
}

/// Rotate, growing the canvas to fit. Uncovered pixels are transparent.
pub fn rotate(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let degrees = degrees.rem_euclid(360.0);
    // right angles are exact, imageops rotates clockwise
    if degrees == 0.0 {
        return src.clone();
    } else if degrees == 90.0 {
        return imageops::rotate270(src);
    } else if degrees == 180.0 {
        return imageops::rotate180(src);
    } else if degrees == 270.0 {
        return imageops::rotate90(src);
    }
    resample(src, degrees, 1.0, sample_nearest)
}

/// Rotate and scale in one filtered pass
pub fn rotozoom(src: &RgbaImage, degrees: f32, scale: f32) -> Result<RgbaImage> {
    check_scale(scale)?;
    Ok(resample(src, degrees.rem_euclid(360.0), scale, sample_bilinear))
}

/// Size of the axis aligned box around a `size` box rotated by `angle` radians
pub fn rotated_size(size: Vec2, angle: f32) -> UVec2 {
    let (s, c) = angle.sin_cos();
    let w = size.x * c.abs() + size.y * s.abs();
    let h = size.x * s.abs() + size.y * c.abs();
    // tolerate rounding noise so a near-exact fit does not grow by a pixel
    UVec2::new(
        (w - 1e-3).ceil().max(1.0) as u32,
        (h - 1e-3).ceil().max(1.0) as u32,
    )
}

fn resample(
    src: &RgbaImage,
    degrees: f32,
    scale: f32,
    sample: fn(&RgbaImage, Vec2) -> Rgba<u8>,
) -> RgbaImage {
    let angle = degrees.to_radians();
    let src_size = Vec2::new(src.width() as f32, src.height() as f32);
    let dst_size = rotated_size(src_size * scale, angle);
    let mut dst = RgbaImage::new(dst_size.x, dst_size.y);
    if src.width() == 0 || src.height() == 0 {
        return dst;
    }

    let src_center = src_size * 0.5;
    let dst_center = dst_size.as_vec2() * 0.5;
    // on screen (y down) the inverse of a counterclockwise rotation is a
    // mathematically positive rotation
    let rot = Vec2::from_angle(angle);
    let inv_scale = 1.0 / scale;
    for (x, y, px) in dst.enumerate_pixels_mut() {
        let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - dst_center;
        let p = rot.rotate(d) * inv_scale + src_center;
        *px = sample(src, p);
    }
    dst
}

fn sample_nearest(src: &RgbaImage, p: Vec2) -> Rgba<u8> {
    let (x, y) = (p.x.floor(), p.y.floor());
    if x < 0.0 || y < 0.0 || x >= src.width() as f32 || y >= src.height() as f32 {
        return TRANSPARENT;
    }
    *src.get_pixel(x as u32, y as u32)
}

fn sample_bilinear(src: &RgbaImage, p: Vec2) -> Rgba<u8> {
    // move from pixel-centre to pixel-corner coordinates
    let p = p - Vec2::splat(0.5);
    let (x0, y0) = (p.x.floor(), p.y.floor());
    let (fx, fy) = (p.x - x0, p.y - y0);
    let texel = |x: f32, y: f32| -> [f32; 4] {
        if x < 0.0 || y < 0.0 || x >= src.width() as f32 || y >= src.height() as f32 {
            return [0.0; 4];
        }
        src.get_pixel(x as u32, y as u32).0.map(f32::from)
    };
    let t00 = texel(x0, y0);
    let t10 = texel(x0 + 1.0, y0);
    let t01 = texel(x0, y0 + 1.0);
    let t11 = texel(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = t00[i] + (t10[i] - t00[i]) * fx;
        let bottom = t01[i] + (t11[i] - t01[i]) * fx;
        out[i] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Multiply every pixel's alpha by `alpha / 255`
pub fn multiply_alpha(src: &RgbaImage, alpha: u8) -> RgbaImage {
    let mut dst = src.clone();
    for px in dst.pixels_mut() {
        px.0[3] = ((px.0[3] as u16 * alpha as u16 + 127) / 255) as u8;
    }
    dst
}

/// Make every pixel whose colour matches `key` fully transparent
pub fn color_key(src: &RgbaImage, key: Color) -> RgbaImage {
    let mut dst = src.clone();
    for px in dst.pixels_mut() {
        if key.same_rgb(px) {
            *px = TRANSPARENT;
        }
    }
    dst
}

/// Place `src` on a transparent `size` canvas at `anchor`
pub fn pad(src: &RgbaImage, size: UVec2, anchor: Anchor) -> RgbaImage {
    let mut dst = RgbaImage::new(size.x, size.y);
    let offset = anchor.offset(size, UVec2::new(src.width(), src.height()));
    imageops::replace(&mut dst, src, offset.x as i64, offset.y as i64);
    dst
}
