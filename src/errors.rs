use glam::UVec2;
use thiserror::Error;

use crate::types::Rect;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("animation must contain at least one frame")]
    NoFrames,
    #[error("frame {index} duration must be greater than zero, got {duration}")]
    InvalidDuration { index: usize, duration: f64 },
    #[error("rate must be greater than zero, got {0}")]
    InvalidRate(f64),
    #[error("invalid sheet layout: {0}")]
    SheetLayout(String),
    #[error("rows and cols must be non-zero, got rows {rows} cols {cols}")]
    InvalidGrid { rows: u32, cols: u32 },
    #[error("frame size must be non-zero, got {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },
    #[error("rect at index {index} has non-positive size {rect:?}")]
    InvalidRect { index: usize, rect: Rect },
    #[error("rect at index {index} {rect:?} is outside the sheet {sheet}")]
    RectOutOfBounds {
        index: usize,
        rect: Rect,
        sheet: UVec2,
    },
    #[error("scale must be greater than zero, got {0}")]
    InvalidScale(f32),
    #[error("target size must be non-zero, got {width}x{height}")]
    InvalidTargetSize { width: u32, height: u32 },
    #[error("frame {index} out of range, animation has {len} frames")]
    FrameOutOfRange { index: usize, len: usize },
}
