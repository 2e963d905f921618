use glam::{IVec2, UVec2};
use serde::{Deserialize, Serialize};

/// Pixel rectangle, `pos` is the top-left corner
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: IVec2,
    pub size: IVec2,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            pos: IVec2::new(x, y),
            size: IVec2::new(width, height),
        }
    }

    pub fn min(&self) -> IVec2 {
        self.pos
    }

    pub fn max(&self) -> IVec2 {
        self.pos + self.size
    }

    pub fn has_area(&self) -> bool {
        self.size.x > 0 && self.size.y > 0
    }

    /// Whether the rect lies entirely inside an image of `size`
    pub fn fits_in(&self, size: UVec2) -> bool {
        let max = self.max_i64();
        self.pos.x >= 0 && self.pos.y >= 0 && max.0 <= size.x as i64 && max.1 <= size.y as i64
    }

    pub fn contains_pos(&self, pos: IVec2) -> bool {
        let max = self.max_i64();
        pos.x >= self.pos.x
            && pos.y >= self.pos.y
            && (pos.x as i64) < max.0
            && (pos.y as i64) < max.1
    }

    // far corner without i32 overflow
    fn max_i64(&self) -> (i64, i64) {
        (
            self.pos.x as i64 + self.size.x as i64,
            self.pos.y as i64 + self.size.y as i64,
        )
    }
}

/// Anchor point used to align frames of different sizes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Anchor {
    /// Offset of an `inner` sized box placed inside an `outer` sized box
    pub fn offset(self, outer: UVec2, inner: UVec2) -> IVec2 {
        let outer = outer.as_ivec2();
        let inner = inner.as_ivec2();
        // halves are truncated separately so odd sizes round the same way on both boxes
        let center = outer / 2 - inner / 2;
        let far = outer - inner;
        match self {
            Self::NorthWest => IVec2::ZERO,
            Self::North => IVec2::new(center.x, 0),
            Self::NorthEast => IVec2::new(far.x, 0),
            Self::West => IVec2::new(0, center.y),
            Self::Center => center,
            Self::East => IVec2::new(far.x, center.y),
            Self::SouthWest => IVec2::new(0, far.y),
            Self::South => IVec2::new(center.x, far.y),
            Self::SouthEast => far,
        }
    }
}
