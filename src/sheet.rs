//! Sprite sheet slicing.

use glam::UVec2;
use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, Result},
    image::Image,
    types::Rect,
};

/// How a sheet is cut into frames, as written in config files.
///
/// Exactly one of `width`/`height`, `rows`/`cols` or `rects` must be set,
/// `layout` checks this.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub rects: Option<Vec<Rect>>,
}

impl SheetSpec {
    pub fn frame_size(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn grid(rows: u32, cols: u32) -> Self {
        Self {
            rows: Some(rows),
            cols: Some(cols),
            ..Default::default()
        }
    }

    pub fn rects(rects: Vec<Rect>) -> Self {
        Self {
            rects: Some(rects),
            ..Default::default()
        }
    }

    /// Validate into a layout
    pub fn layout(&self) -> Result<SheetLayout> {
        let by_size = self.width.is_some() || self.height.is_some();
        let by_grid = self.rows.is_some() || self.cols.is_some();
        let by_rects = self.rects.is_some();
        let modes = [by_size, by_grid, by_rects].iter().filter(|m| **m).count();
        if modes != 1 {
            return Err(Error::SheetLayout(format!(
                "expected exactly one of width & height, rows & cols or rects, got {modes}"
            )));
        }

        if by_size {
            let (Some(width), Some(height)) = (self.width, self.height) else {
                return Err(Error::SheetLayout(
                    "both width and height must be specified".to_string(),
                ));
            };
            if width == 0 || height == 0 {
                return Err(Error::InvalidFrameSize { width, height });
            }
            Ok(SheetLayout::FrameSize(UVec2::new(width, height)))
        } else if by_grid {
            let (Some(rows), Some(cols)) = (self.rows, self.cols) else {
                return Err(Error::SheetLayout(
                    "both rows and cols must be specified".to_string(),
                ));
            };
            if rows == 0 || cols == 0 {
                return Err(Error::InvalidGrid { rows, cols });
            }
            Ok(SheetLayout::Grid { rows, cols })
        } else {
            let rects = self.rects.clone().unwrap_or_default();
            if rects.is_empty() {
                return Err(Error::NoFrames);
            }
            if let Some((index, rect)) = rects.iter().enumerate().find(|(_, r)| !r.has_area()) {
                return Err(Error::InvalidRect { index, rect: *rect });
            }
            Ok(SheetLayout::Rects(rects))
        }
    }
}

/// A validated sheet layout
#[derive(Debug, Clone, PartialEq)]
pub enum SheetLayout {
    /// Every frame has this size
    FrameSize(UVec2),
    /// The sheet is split evenly into `rows` x `cols` cells
    Grid { rows: u32, cols: u32 },
    /// Explicit regions, used as is
    Rects(Vec<Rect>),
}

/// Frame regions of a `sheet` sized image, row-major.
///
/// Partial cells at the right and bottom edges are dropped.
pub fn frame_rects(sheet: UVec2, layout: &SheetLayout) -> Result<Vec<Rect>> {
    let (frame, cols, rows) = match layout {
        SheetLayout::Rects(rects) => {
            for (index, rect) in rects.iter().enumerate() {
                if !rect.has_area() {
                    return Err(Error::InvalidRect { index, rect: *rect });
                }
                if !rect.fits_in(sheet) {
                    return Err(Error::RectOutOfBounds {
                        index,
                        rect: *rect,
                        sheet,
                    });
                }
            }
            return Ok(rects.clone());
        }
        SheetLayout::Grid { rows, cols } => {
            if *rows == 0 || *cols == 0 {
                return Err(Error::InvalidGrid {
                    rows: *rows,
                    cols: *cols,
                });
            }
            let frame = UVec2::new(sheet.x / cols, sheet.y / rows);
            (frame, *cols, *rows)
        }
        SheetLayout::FrameSize(frame) => {
            if frame.x == 0 || frame.y == 0 {
                return Err(Error::InvalidFrameSize {
                    width: frame.x,
                    height: frame.y,
                });
            }
            (*frame, sheet.x / frame.x, sheet.y / frame.y)
        }
    };
    if frame.x == 0 || frame.y == 0 {
        return Err(Error::InvalidFrameSize {
            width: frame.x,
            height: frame.y,
        });
    }

    let remainder = sheet - frame * UVec2::new(cols, rows);
    if remainder != UVec2::ZERO {
        log::warn!("Sheet {sheet} leaves {remainder} pixels outside {cols}x{rows} frames of {frame}");
    }

    let rects = (0..rows)
        .flat_map(|row| {
            (0..cols).map(move |col| {
                Rect::new(
                    (col * frame.x) as i32,
                    (row * frame.y) as i32,
                    frame.x as i32,
                    frame.y as i32,
                )
            })
        })
        .collect();
    Ok(rects)
}

/// Cut `sheet` into frame images
pub fn extract_frames(sheet: &RgbaImage, layout: &SheetLayout) -> Result<Vec<Image>> {
    let size = UVec2::new(sheet.width(), sheet.height());
    let rects = frame_rects(size, layout)?;
    let frames: Vec<Image> = rects
        .iter()
        .map(|rect| {
            let sub = imageops::crop_imm(
                sheet,
                rect.pos.x as u32,
                rect.pos.y as u32,
                rect.size.x as u32,
                rect.size.y as u32,
            );
            Image::new(sub.to_image())
        })
        .collect();
    log::debug!("Extracted {} frames from {size} sheet", frames.len());
    Ok(frames)
}
