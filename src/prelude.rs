pub use crate::animation::{Animation, PlaybackState, BOUNDARY_EPSILON};
pub use crate::asset::{AnimationDef, AnimationSet, AssetTable};
pub use crate::color::*;
pub use crate::conductor::{shared, Command, Conductor, SharedAnimation};
pub use crate::errors::{Error, Result};
pub use crate::image::Image;
pub use crate::render::RenderTarget;
pub use crate::sheet::{SheetLayout, SheetSpec};
pub use crate::timeline::{Frame, Timeline};
pub use crate::transform::Flip;
pub use crate::types::{Anchor, Rect};
pub use anyhow;
pub use glam;
