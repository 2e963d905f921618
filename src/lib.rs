//! Frame-based sprite animation playback.
//!
//! An [`Animation`](animation::Animation) maps wall-clock timestamps to
//! frames, a [`Conductor`](conductor::Conductor) drives several of them in
//! lockstep. Nothing advances between calls, every time-dependent method
//! takes the timestamp it should answer for.

pub mod animation;
pub mod asset;
pub mod clock;
pub mod color;
pub mod conductor;
pub mod errors;
pub mod image;
pub mod prelude;
pub mod render;
pub mod sheet;
pub mod timeline;
pub mod transform;
pub mod types;
