use core::fmt;
use std::fmt::Debug;

use glam::{IVec2, UVec2};
use image::RgbaImage;

use crate::{
    clock,
    color::Color,
    errors::{Error, Result},
    image::Image,
    render::RenderTarget,
    timeline::{Frame, Timeline},
    transform::{self, Flip},
    types::{Anchor, Rect},
};

/// Added to every elapsed time so a timestamp that lands exactly on a frame
/// boundary shows the later frame
pub const BOUNDARY_EPSILON: f64 = 1e-5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Sprite animation
///
/// Plays a fixed sequence of frames. Playback is derived from the timestamps
/// passed to each call, nothing advances between calls. Every `now` argument
/// is in seconds, `None` reads [`clock::now`].
pub struct Animation {
    timeline: Timeline,
    // Shadows the originals frame by frame while present
    transformed: Option<Vec<Image>>,
    state: PlaybackState,
    rate: f64,
    looping: bool,
    visible: bool,
    // When playback started, shifted so `now - playing_since` is the raw elapsed time
    playing_since: f64,
    // When playback was paused
    paused_at: f64,
}

impl Animation {
    /// Build animation from frames, the animation starts stopped
    pub fn new<I, F>(frames: I, looping: bool) -> Result<Self>
    where
        I: IntoIterator<Item = F>,
        F: Into<Frame>,
    {
        let timeline = Timeline::new(frames.into_iter().map(Into::into).collect())?;
        log::debug!(
            "New animation with {} frames, {:.3}s, looping {looping}",
            timeline.len(),
            timeline.total_length()
        );
        Ok(Self::from_timeline(timeline, looping))
    }

    /// Build animation where every frame lasts `duration` seconds
    pub fn from_images(images: Vec<Image>, duration: f64, looping: bool) -> Result<Self> {
        Self::new(images.into_iter().map(|im| Frame::new(im, duration)), looping)
    }

    pub fn from_timeline(timeline: Timeline, looping: bool) -> Self {
        Self {
            timeline,
            transformed: None,
            state: PlaybackState::Stopped,
            rate: 1.0,
            looping,
            visible: true,
            playing_since: 0.0,
            paused_at: 0.0,
        }
    }

    /// Copy sharing the frame pixels.
    /// The copy keeps loop, rate and visibility but starts stopped.
    pub fn get_copy(&self) -> Self {
        Self {
            timeline: self.timeline.clone(),
            transformed: self.transformed.clone(),
            state: PlaybackState::Stopped,
            rate: self.rate,
            looping: self.looping,
            visible: self.visible,
            playing_since: 0.0,
            paused_at: 0.0,
        }
    }

    pub fn get_copies(&self, n: usize) -> Vec<Self> {
        (0..n).map(|_| self.get_copy()).collect()
    }
}

impl Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("frames", &self.timeline.len())
            .field("state", &self.state)
            .field("rate", &self.rate)
            .field("looping", &self.looping)
            .field("transformed", &self.transformed.is_some())
            .finish()
    }
}

// Frames and images
impl Animation {
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Length of one play-through in seconds, ignoring rate
    pub fn total_length(&self) -> f64 {
        self.timeline.total_length()
    }

    pub fn durations(&self) -> impl Iterator<Item = f64> + '_ {
        self.timeline.durations()
    }

    fn image(&self, index: usize) -> &Image {
        match &self.transformed {
            Some(images) => &images[index],
            None => &self.timeline.frames()[index].image,
        }
    }

    /// Image shown for frame `index`, the transformed one if any
    pub fn frame_image(&self, index: usize) -> Option<&Image> {
        (index < self.len()).then(|| self.image(index))
    }

    /// Untransformed image of frame `index`
    pub fn original_image(&self, index: usize) -> Option<&Image> {
        self.timeline.frames().get(index).map(|f| &f.image)
    }

    pub fn has_transforms(&self) -> bool {
        self.transformed.is_some()
    }

    fn images(&self) -> impl Iterator<Item = &Image> {
        (0..self.len()).map(|i| self.image(i))
    }

    pub fn are_frames_same_size(&self) -> bool {
        let size = self.image(0).size();
        self.images().all(|im| im.size() == size)
    }

    /// Largest width and largest height over all frames, possibly from different frames
    pub fn max_size(&self) -> UVec2 {
        self.images().fold(UVec2::ZERO, |acc, im| acc.max(im.size()))
    }

    /// Bounding rect at the origin
    pub fn rect(&self) -> Rect {
        let size = self.max_size().as_ivec2();
        Rect::new(0, 0, size.x, size.y)
    }
}

// Playback
impl Animation {
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hide or show the animation, playback keeps going while hidden
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn raw_elapsed_at(&self, now: f64) -> f64 {
        match self.state {
            PlaybackState::Stopped => 0.0,
            PlaybackState::Playing => (now - self.playing_since) * self.rate,
            PlaybackState::Paused => (self.paused_at - self.playing_since) * self.rate,
        }
    }

    fn normalize(&self, elapsed: f64) -> f64 {
        let total = self.total_length();
        if self.looping {
            elapsed.rem_euclid(total)
        } else {
            elapsed.clamp(0.0, total)
        }
    }

    // Position in the timeline without the boundary epsilon
    fn position_at(&self, now: f64) -> f64 {
        self.normalize(self.raw_elapsed_at(now))
    }

    fn elapsed_at(&self, now: f64) -> f64 {
        match self.state {
            PlaybackState::Stopped => 0.0,
            _ => self.position_at(now) + BOUNDARY_EPSILON,
        }
    }

    fn is_finished_at(&self, now: f64) -> bool {
        !self.looping && self.elapsed_at(now) >= self.total_length()
    }

    /// Seconds into the timeline, scaled by rate
    pub fn elapsed(&self, now: Option<f64>) -> f64 {
        self.elapsed_at(clock::resolve(now))
    }

    /// A non-looping animation that played through all its frames
    pub fn is_finished(&self, now: Option<f64>) -> bool {
        self.is_finished_at(clock::resolve(now))
    }

    /// Index of the frame on screen at `now`
    pub fn current_frame_index(&self, now: Option<f64>) -> usize {
        self.timeline.frame_at(self.elapsed(now))
    }

    /// Image of the frame on screen at `now`
    pub fn current_frame_image(&self, now: Option<f64>) -> &Image {
        self.image(self.current_frame_index(now))
    }

    /// Playback state, a finished animation settles to `Stopped`
    pub fn current_state(&mut self, now: Option<f64>) -> PlaybackState {
        if self.is_finished(now) {
            self.state = PlaybackState::Stopped;
        }
        self.state
    }

    pub fn set_state(&mut self, state: PlaybackState, now: Option<f64>) {
        match state {
            PlaybackState::Playing => self.play(now),
            PlaybackState::Paused => self.pause(now),
            PlaybackState::Stopped => self.stop(),
        }
    }

    /// Start or resume playing.
    /// A finished non-looping animation restarts from the beginning.
    pub fn play(&mut self, now: Option<f64>) {
        let now = clock::resolve(now);
        match self.state {
            PlaybackState::Stopped => self.playing_since = now,
            PlaybackState::Playing => {
                if self.is_finished_at(now) {
                    self.playing_since = now;
                }
            }
            PlaybackState::Paused => {
                self.playing_since = now - (self.paused_at - self.playing_since);
            }
        }
        log::trace!("Play from {:?} at {now}", self.state);
        self.state = PlaybackState::Playing;
    }

    /// Freeze on the current frame
    pub fn pause(&mut self, now: Option<f64>) {
        let now = clock::resolve(now);
        match self.state {
            PlaybackState::Paused => return,
            PlaybackState::Playing => self.paused_at = now,
            PlaybackState::Stopped => {
                self.playing_since = now;
                self.paused_at = now;
            }
        }
        log::trace!("Pause from {:?} at {now}", self.state);
        self.state = PlaybackState::Paused;
    }

    /// Back to the first frame, not playing
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
    }

    pub fn toggle_pause(&mut self, now: Option<f64>) {
        let now = clock::resolve(now);
        match self.state {
            PlaybackState::Playing if !self.is_finished_at(now) => self.pause(Some(now)),
            _ => self.play(Some(now)),
        }
    }

    /// Change the speed multiplier without moving the current position
    pub fn set_rate(&mut self, rate: f64, now: Option<f64>) -> Result<()> {
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(Error::InvalidRate(rate));
        }
        let now = clock::resolve(now);
        let anchor = match self.state {
            PlaybackState::Playing => now,
            PlaybackState::Paused => self.paused_at,
            PlaybackState::Stopped => {
                self.rate = rate;
                return Ok(());
            }
        };
        let raw = self.raw_elapsed_at(now);
        self.playing_since = anchor - raw / rate;
        self.rate = rate;
        Ok(())
    }

    /// Turn looping on or off, keeping the frame on screen.
    ///
    /// Turning looping off mid-play lets the current play-through finish
    /// instead of jumping to wherever the unwrapped time would be.
    pub fn set_loop(&mut self, looping: bool, now: Option<f64>) {
        if looping == self.looping {
            return;
        }
        let now = clock::resolve(now);
        let anchor = match self.state {
            PlaybackState::Playing => Some(now),
            PlaybackState::Paused => Some(self.paused_at),
            PlaybackState::Stopped => None,
        };
        if let Some(anchor) = anchor {
            let position = self.position_at(now);
            self.playing_since = anchor - position / self.rate;
        }
        self.looping = looping;
    }
}

// Seeking
impl Animation {
    /// Jump to `elapsed` seconds into the timeline.
    /// A stopped animation becomes paused there.
    /// Non-finite targets are ignored.
    pub fn set_elapsed(&mut self, elapsed: f64, now: Option<f64>) {
        let now = clock::resolve(now);
        if !elapsed.is_finite() || !now.is_finite() {
            log::warn!("Ignored seek to {elapsed} at {now}");
            return;
        }
        let position = self.normalize(elapsed);
        self.playing_since = now - position / self.rate;
        if self.state != PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            self.paused_at = now;
        }
    }

    /// Move back by `seconds`, or to the start
    pub fn rewind(&mut self, seconds: Option<f64>, now: Option<f64>) {
        let now = clock::resolve(now);
        let target = match seconds {
            Some(seconds) => self.position_at(now) - seconds,
            None => 0.0,
        };
        self.set_elapsed(target, Some(now));
    }

    /// Move forward by `seconds`, or to the last frame
    pub fn fast_forward(&mut self, seconds: Option<f64>, now: Option<f64>) {
        let now = clock::resolve(now);
        let target = match seconds {
            Some(seconds) => self.position_at(now) + seconds,
            // just short of the end so a non-looping animation is not finished
            None => self.total_length() - 2.0 * BOUNDARY_EPSILON,
        };
        self.set_elapsed(target, Some(now));
    }

    /// Jump to the start of frame `index`, wrapped when looping and clamped otherwise
    pub fn set_current_frame(&mut self, index: isize, now: Option<f64>) {
        let len = self.len() as isize;
        let index = if self.looping {
            index.rem_euclid(len)
        } else {
            index.clamp(0, len - 1)
        };
        let start = self.timeline.start_times()[index as usize];
        self.set_elapsed(start, now);
    }

    /// Step `jump` frames forward, negative steps go back
    pub fn next_frame(&mut self, jump: isize, now: Option<f64>) {
        let now = clock::resolve(now);
        let current = self.current_frame_index(Some(now)) as isize;
        self.set_current_frame(current.saturating_add(jump), Some(now));
    }

    /// Step `jump` frames back
    pub fn prev_frame(&mut self, jump: isize, now: Option<f64>) {
        self.next_frame(jump.saturating_neg(), now);
    }

    /// Reverse the frame order, staying on the frame currently shown
    pub fn reverse(&mut self, now: Option<f64>) {
        let now = clock::resolve(now);
        // mirror a point strictly inside the current frame so the boundary
        // epsilon cannot push it onto a neighbour
        let mirrored = self.total_length() - self.elapsed_at(now) - BOUNDARY_EPSILON;
        self.timeline = self.timeline.reversed();
        if let Some(images) = self.transformed.as_mut() {
            images.reverse();
        }
        if self.state != PlaybackState::Stopped {
            self.set_elapsed(mirrored, Some(now));
        }
    }
}

// Transforms
impl Animation {
    fn map_frames(&mut self, name: &str, f: impl Fn(&RgbaImage) -> RgbaImage) {
        let images = self.images().map(|im| Image::new(f(im.pixels()))).collect();
        self.transformed = Some(images);
        log::debug!("Applied {name} to {} frames", self.len());
    }

    fn try_map_frames(
        &mut self,
        name: &str,
        f: impl Fn(&RgbaImage) -> Result<RgbaImage>,
    ) -> Result<()> {
        let images = self
            .images()
            .map(|im| f(im.pixels()).map(Image::new))
            .collect::<Result<Vec<_>>>()?;
        self.transformed = Some(images);
        log::debug!("Applied {name} to {} frames", self.len());
        Ok(())
    }

    pub fn flip(&mut self, flip: Flip) {
        self.map_frames("flip", |im| transform::flip(im, flip));
    }

    /// Resize every frame to `size`
    pub fn scale(&mut self, size: UVec2) -> Result<()> {
        self.try_map_frames("scale", |im| transform::scale(im, size))
    }

    /// Rotate every frame counterclockwise by `degrees`
    pub fn rotate(&mut self, degrees: f32) {
        self.map_frames("rotate", |im| transform::rotate(im, degrees));
    }

    pub fn rotozoom(&mut self, degrees: f32, scale: f32) -> Result<()> {
        self.try_map_frames("rotozoom", |im| transform::rotozoom(im, degrees, scale))
    }

    pub fn scale2x(&mut self) {
        self.map_frames("scale2x", transform::scale2x);
    }

    pub fn smoothscale(&mut self, size: UVec2) -> Result<()> {
        self.try_map_frames("smoothscale", |im| transform::smoothscale(im, size))
    }

    /// Fade every frame by `alpha` (255 leaves it opaque)
    pub fn set_alpha(&mut self, alpha: u8) {
        self.map_frames("set_alpha", |im| transform::multiply_alpha(im, alpha));
    }

    /// Treat `key` as transparent
    pub fn set_color_key(&mut self, key: Color) {
        self.map_frames("set_color_key", |im| transform::color_key(im, key));
    }

    /// Drop all transforms and show the original frames again
    pub fn clear_transforms(&mut self) {
        self.transformed = None;
    }

    /// Bake the transformed frames into the originals.
    /// Later transforms start from the baked images and `clear_transforms`
    /// no longer undoes them.
    pub fn make_transforms_permanent(&mut self) {
        if let Some(images) = self.transformed.take() {
            self.timeline = self.timeline.with_images(images);
        }
    }

    /// Pad frames of different sizes to a common size, aligned at `anchor`.
    /// Rewrites the originals and clears transforms, does nothing when all
    /// original frames already share a size.
    pub fn anchor(&mut self, anchor: Anchor) {
        let originals: Vec<&Image> = self.timeline.frames().iter().map(|f| &f.image).collect();
        let size = originals[0].size();
        if originals.iter().all(|im| im.size() == size) {
            return;
        }
        let max = originals
            .iter()
            .fold(UVec2::ZERO, |acc, im| acc.max(im.size()));
        let padded = originals
            .iter()
            .map(|im| Image::new(transform::pad(im.pixels(), max, anchor)))
            .collect();
        self.transformed = None;
        self.timeline = self.timeline.with_images(padded);
        log::debug!("Anchored {} frames to {anchor:?} in {max}", self.len());
    }
}

// Drawing
impl Animation {
    fn is_drawable(&mut self, now: f64) -> bool {
        self.current_state(Some(now)) != PlaybackState::Stopped && self.visible
    }

    /// Draw the current frame at `pos`.
    /// Nothing is drawn while hidden or stopped, returns whether a frame was drawn.
    pub fn draw<T>(&mut self, target: &mut T, pos: IVec2, now: Option<f64>) -> bool
    where
        T: RenderTarget + ?Sized,
    {
        let now = clock::resolve(now);
        if !self.is_drawable(now) {
            return false;
        }
        let index = self.current_frame_index(Some(now));
        target.draw(self.image(index), pos);
        true
    }

    /// Draw frame `index` regardless of the playback position
    pub fn draw_frame<T>(
        &mut self,
        index: usize,
        target: &mut T,
        pos: IVec2,
        now: Option<f64>,
    ) -> Result<bool>
    where
        T: RenderTarget + ?Sized,
    {
        if index >= self.len() {
            return Err(Error::FrameOutOfRange {
                index,
                len: self.len(),
            });
        }
        if !self.is_drawable(clock::resolve(now)) {
            return Ok(false);
        }
        target.draw(self.image(index), pos);
        Ok(true)
    }

    /// Draw the frame shown `elapsed` seconds into the timeline
    pub fn draw_at_time<T>(
        &mut self,
        elapsed: f64,
        target: &mut T,
        pos: IVec2,
        now: Option<f64>,
    ) -> bool
    where
        T: RenderTarget + ?Sized,
    {
        if !self.is_drawable(clock::resolve(now)) {
            return false;
        }
        let index = self
            .timeline
            .frame_at(self.normalize(elapsed) + BOUNDARY_EPSILON);
        target.draw(self.image(index), pos);
        true
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn solid(v: u8) -> Image {
        Image::new(RgbaImage::from_pixel(1, 1, Rgba([v, v, v, 255])))
    }

    // frames A, B, C, D of 0.2s each
    fn abcd(looping: bool) -> (Animation, Vec<Image>) {
        let images: Vec<Image> = (1..=4).map(|v| solid(v * 10)).collect();
        let anim = Animation::from_images(images.clone(), 0.2, looping).unwrap();
        (anim, images)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            Animation::new(Vec::<Frame>::new(), true).unwrap_err(),
            Error::NoFrames
        );
        let err = Animation::new([(solid(1), 0.1), (solid(2), -0.1)], true).unwrap_err();
        assert!(matches!(err, Error::InvalidDuration { index: 1, .. }));
    }

    #[test]
    fn test_starts_stopped_on_first_frame() {
        let (mut anim, images) = abcd(true);
        assert_eq!(anim.current_state(Some(3.0)), PlaybackState::Stopped);
        assert_eq!(anim.elapsed(Some(3.0)), 0.0);
        assert_eq!(anim.current_frame_image(Some(3.0)), &images[0]);
        assert!(!anim.is_finished(Some(3.0)));
    }

    #[test]
    fn test_looping_playback() {
        let (mut anim, images) = abcd(true);
        anim.play(Some(0.0));
        assert_eq!(anim.current_frame_image(Some(0.05)), &images[0]);
        assert_eq!(anim.current_frame_image(Some(0.25)), &images[1]);
        assert_eq!(anim.current_frame_image(Some(0.95)), &images[0]);
        assert!(!anim.is_finished(Some(100.0)));
        assert_eq!(anim.current_state(Some(100.0)), PlaybackState::Playing);
    }

    #[test]
    fn test_non_looping_finishes_on_last_frame() {
        let (mut anim, images) = abcd(false);
        anim.play(Some(0.0));
        assert!(!anim.is_finished(Some(0.5)));
        assert!(anim.is_finished(Some(1.0)));
        assert_eq!(anim.current_frame_image(Some(1.0)), &images[3]);
        assert_eq!(anim.current_state(Some(1.0)), PlaybackState::Stopped);
    }

    #[test]
    fn test_boundary_shows_later_frame() {
        let (mut anim, _) = abcd(true);
        anim.play(Some(0.0));
        assert_eq!(anim.current_frame_index(Some(0.2)), 1);
        assert_eq!(anim.current_frame_index(Some(0.0)), 0);
    }

    #[test]
    fn test_play_restarts_finished() {
        let (mut anim, _) = abcd(false);
        anim.play(Some(0.0));
        anim.play(Some(0.5));
        // still running, play is a no-op
        assert!(approx(anim.elapsed(Some(0.6)), 0.6 + BOUNDARY_EPSILON));
        anim.play(Some(2.0));
        assert!(approx(anim.elapsed(Some(2.1)), 0.1 + BOUNDARY_EPSILON));
    }

    #[test]
    fn test_pause_resume_continuity() {
        let (mut anim, _) = abcd(true);
        anim.play(Some(10.0));
        let before = anim.elapsed(Some(10.3));
        anim.pause(Some(10.3));
        assert!(approx(anim.elapsed(Some(50.0)), before));
        anim.pause(Some(20.0));
        assert!(approx(anim.elapsed(Some(50.0)), before));
        anim.play(Some(42.0));
        assert!(approx(anim.elapsed(Some(42.0)), before));
        assert!(approx(anim.elapsed(Some(42.1)), before + 0.1));
    }

    #[test]
    fn test_pause_from_stopped_freezes_first_frame() {
        let (mut anim, _) = abcd(true);
        anim.pause(Some(5.0));
        assert_eq!(anim.current_state(Some(9.0)), PlaybackState::Paused);
        assert_eq!(anim.current_frame_index(Some(9.0)), 0);
        anim.play(Some(9.0));
        assert_eq!(anim.current_frame_index(Some(9.25)), 1);
    }

    #[test]
    fn test_stop_and_toggle() {
        let (mut anim, _) = abcd(false);
        anim.toggle_pause(Some(0.0));
        assert_eq!(anim.current_state(Some(0.1)), PlaybackState::Playing);
        anim.toggle_pause(Some(0.1));
        assert_eq!(anim.current_state(Some(0.5)), PlaybackState::Paused);
        anim.toggle_pause(Some(0.5));
        assert!(approx(anim.elapsed(Some(0.6)), 0.2 + BOUNDARY_EPSILON));
        // finished and non-looping, toggling replays
        anim.toggle_pause(Some(3.0));
        assert_eq!(anim.current_state(Some(3.0)), PlaybackState::Playing);
        assert_eq!(anim.current_frame_index(Some(3.0)), 0);
        anim.stop();
        assert_eq!(anim.current_state(Some(3.1)), PlaybackState::Stopped);
        assert_eq!(anim.elapsed(Some(3.1)), 0.0);
    }

    #[test]
    fn test_rate() {
        let (mut anim, _) = abcd(true);
        assert_eq!(anim.set_rate(0.0, Some(0.0)), Err(Error::InvalidRate(0.0)));
        assert!(anim.set_rate(-1.0, Some(0.0)).is_err());
        assert!(anim.set_rate(f64::NAN, Some(0.0)).is_err());

        anim.play(Some(0.0));
        let at_change = anim.elapsed(Some(0.1));
        anim.set_rate(2.0, Some(0.1)).unwrap();
        assert!(approx(anim.elapsed(Some(0.1)), at_change));
        assert!(approx(anim.elapsed(Some(0.2)), at_change + 0.2));

        anim.pause(Some(0.2));
        let paused = anim.elapsed(Some(0.2));
        anim.set_rate(0.5, Some(5.0)).unwrap();
        assert!(approx(anim.elapsed(Some(6.0)), paused));
        anim.play(Some(6.0));
        assert!(approx(anim.elapsed(Some(6.2)), paused + 0.1));
    }

    #[test]
    fn test_turning_loop_off_finishes_current_pass() {
        let (mut anim, images) = abcd(true);
        anim.play(Some(0.0));
        // third pass, 0.3s in
        anim.set_loop(false, Some(1.9));
        assert!(!anim.is_finished(Some(1.9)));
        assert_eq!(anim.current_frame_image(Some(1.9)), &images[1]);
        assert!(!anim.is_finished(Some(2.3)));
        assert!(anim.is_finished(Some(2.45)));
    }

    #[test]
    fn test_seeking() {
        let (mut anim, _) = abcd(false);
        anim.set_elapsed(0.45, Some(1.0));
        assert_eq!(anim.current_state(Some(1.0)), PlaybackState::Paused);
        assert_eq!(anim.current_frame_index(Some(7.0)), 2);

        anim.rewind(Some(0.2), Some(2.0));
        assert!(approx(anim.elapsed(Some(2.0)), 0.25 + BOUNDARY_EPSILON));
        anim.rewind(None, Some(2.0));
        assert_eq!(anim.current_frame_index(Some(2.0)), 0);

        anim.fast_forward(None, Some(3.0));
        assert_eq!(anim.current_frame_index(Some(3.0)), 3);
        assert!(!anim.is_finished(Some(3.0)));
        anim.fast_forward(Some(10.0), Some(3.0));
        assert!(anim.is_finished(Some(3.0)));

        anim.play(Some(4.0));
        anim.set_elapsed(0.1, Some(4.0));
        assert_eq!(anim.current_state(Some(4.15)), PlaybackState::Playing);
        assert_eq!(anim.current_frame_index(Some(4.15)), 1);
    }

    #[test]
    fn test_seeking_wraps_when_looping() {
        let (mut anim, _) = abcd(true);
        anim.set_elapsed(0.85, Some(0.0));
        assert_eq!(anim.current_frame_index(Some(0.0)), 0);
        anim.rewind(Some(0.1), Some(0.0));
        assert_eq!(anim.current_frame_index(Some(0.0)), 3);
    }

    #[test]
    fn test_frame_stepping() {
        let (mut anim, _) = abcd(true);
        anim.next_frame(1, Some(0.0));
        assert_eq!(anim.current_frame_index(Some(0.0)), 1);
        anim.next_frame(2, Some(0.0));
        assert_eq!(anim.current_frame_index(Some(0.0)), 3);
        anim.next_frame(1, Some(0.0));
        assert_eq!(anim.current_frame_index(Some(0.0)), 0);
        anim.prev_frame(1, Some(0.0));
        assert_eq!(anim.current_frame_index(Some(0.0)), 3);

        let (mut once, _) = abcd(false);
        once.next_frame(10, Some(0.0));
        assert_eq!(once.current_frame_index(Some(0.0)), 3);
        assert!(!once.is_finished(Some(0.0)));
        once.prev_frame(10, Some(0.0));
        assert_eq!(once.current_frame_index(Some(0.0)), 0);
    }

    #[test]
    fn test_non_finite_seeks_are_ignored() {
        let (mut anim, _) = abcd(true);
        anim.play(Some(0.0));
        anim.set_elapsed(f64::NAN, Some(1.0));
        anim.fast_forward(Some(f64::INFINITY), Some(1.0));
        anim.rewind(Some(f64::NAN), Some(1.0));
        assert_eq!(anim.current_state(Some(1.0)), PlaybackState::Playing);
        assert!(approx(anim.elapsed(Some(1.0)), 0.2 + BOUNDARY_EPSILON));
        assert_eq!(anim.current_frame_index(Some(1.0)), 1);

        anim.pause(Some(1.0));
        anim.set_elapsed(f64::INFINITY, Some(1.5));
        anim.play(Some(2.0));
        assert!(approx(anim.elapsed(Some(2.0)), 0.2 + BOUNDARY_EPSILON));
    }

    #[test]
    fn test_frame_stepping_saturates() {
        let (mut anim, _) = abcd(true);
        anim.next_frame(1, Some(0.0));
        anim.next_frame(isize::MAX, Some(0.0));
        assert_eq!(anim.current_frame_index(Some(0.0)), 3);

        let (mut once, _) = abcd(false);
        once.prev_frame(isize::MIN, Some(0.0));
        assert_eq!(once.current_frame_index(Some(0.0)), 3);
        once.next_frame(isize::MIN, Some(0.0));
        assert_eq!(once.current_frame_index(Some(0.0)), 0);
    }

    #[test]
    fn test_draw_at_time_matches_boundary_rule() {
        let (mut anim, _) = abcd(true);
        anim.play(Some(0.0));
        let mut surface = RgbaImage::new(1, 1);
        assert!(anim.draw_at_time(0.2, &mut surface, IVec2::ZERO, Some(0.0)));
        assert_eq!(anim.current_frame_index(Some(0.2)), 1);
        assert_eq!(surface.get_pixel(0, 0).0[0], 20);
        assert!(anim.draw_at_time(0.8, &mut surface, IVec2::ZERO, Some(0.0)));
        assert_eq!(surface.get_pixel(0, 0).0[0], 10);
    }

    #[test]
    fn test_reverse_keeps_current_frame() {
        let frames = vec![(solid(1), 0.1), (solid(2), 0.2), (solid(3), 0.3)];
        let mut anim = Animation::new(frames, true).unwrap();
        anim.play(Some(0.0));
        let shown = anim.current_frame_image(Some(0.15)).clone();
        anim.reverse(Some(0.15));
        assert_eq!(anim.current_frame_image(Some(0.15)), &shown);
        assert_eq!(
            anim.durations().collect::<Vec<_>>(),
            vec![0.3, 0.2, 0.1]
        );
        // the next frame shown is the one that used to come before
        assert_eq!(anim.current_frame_image(Some(0.25)), &solid(1));
    }

    #[test]
    fn test_transforms_shadow_originals() {
        let images = vec![
            Image::new(RgbaImage::from_fn(2, 1, |x, _| Rgba([x as u8, 0, 0, 255]))),
            Image::new(RgbaImage::from_fn(2, 1, |x, _| Rgba([0, x as u8, 0, 255]))),
        ];
        let mut anim = Animation::from_images(images.clone(), 0.1, true).unwrap();
        anim.flip(Flip::X);
        assert!(anim.has_transforms());
        assert_eq!(anim.frame_image(0).unwrap().pixels().get_pixel(0, 0).0[0], 1);
        assert_eq!(anim.original_image(0), Some(&images[0]));
        // composes with the previous transform
        anim.scale(UVec2::new(4, 2)).unwrap();
        assert_eq!(anim.frame_image(1).unwrap().size(), UVec2::new(4, 2));
        assert_eq!(anim.frame_image(1).unwrap().pixels().get_pixel(0, 0).0[1], 1);
        assert!(anim.smoothscale(UVec2::ZERO).is_err());
        // failed transform leaves the previous set
        assert_eq!(anim.frame_image(1).unwrap().size(), UVec2::new(4, 2));

        anim.clear_transforms();
        for (i, image) in images.iter().enumerate() {
            assert!(anim.frame_image(i).unwrap().ptr_eq(image));
        }
    }

    #[test]
    fn test_make_transforms_permanent() {
        let (mut anim, images) = abcd(true);
        anim.scale2x();
        anim.make_transforms_permanent();
        assert!(!anim.has_transforms());
        anim.clear_transforms();
        assert_eq!(anim.frame_image(0).unwrap().size(), UVec2::new(2, 2));
        assert_eq!(images[0].size(), UVec2::new(1, 1));
    }

    #[test]
    fn test_copies_share_pixels() {
        let (mut anim, images) = abcd(false);
        anim.play(Some(0.0));
        let mut copy = anim.get_copy();
        assert!(copy.original_image(2).unwrap().ptr_eq(&images[2]));
        assert_eq!(copy.current_state(Some(0.5)), PlaybackState::Stopped);
        assert!(!copy.is_looping());

        copy.flip(Flip::Y);
        assert!(!anim.has_transforms());
        assert_eq!(anim.get_copies(3).len(), 3);
    }

    #[test]
    fn test_anchor() {
        let frames = vec![
            (Image::new(RgbaImage::from_pixel(4, 2, Rgba([9, 9, 9, 255]))), 0.1),
            (Image::new(RgbaImage::from_pixel(2, 4, Rgba([7, 7, 7, 255]))), 0.1),
        ];
        let mut anim = Animation::new(frames, true).unwrap();
        assert!(!anim.are_frames_same_size());
        assert_eq!(anim.max_size(), UVec2::new(4, 4));
        assert_eq!(anim.rect(), Rect::new(0, 0, 4, 4));

        anim.rotate(90.0);
        anim.anchor(Anchor::SouthEast);
        assert!(!anim.has_transforms());
        assert!(anim.are_frames_same_size());
        let first = anim.frame_image(0).unwrap().pixels();
        assert_eq!(first.dimensions(), (4, 4));
        assert_eq!(first.get_pixel(0, 0).0[3], 0);
        assert_eq!(first.get_pixel(0, 3).0[0], 9);
    }

    #[test]
    fn test_draw() {
        let (mut anim, _) = abcd(false);
        let mut surface = RgbaImage::new(4, 4);
        assert!(!anim.draw(&mut surface, IVec2::new(1, 1), Some(0.0)));

        anim.play(Some(0.0));
        assert!(anim.draw(&mut surface, IVec2::new(1, 1), Some(0.3)));
        assert_eq!(surface.get_pixel(1, 1).0[0], 20);

        assert!(anim.draw_at_time(0.65, &mut surface, IVec2::ZERO, Some(0.3)));
        assert_eq!(surface.get_pixel(0, 0).0[0], 40);
        assert!(anim.draw_frame(2, &mut surface, IVec2::ZERO, Some(0.3)).unwrap());
        assert_eq!(surface.get_pixel(0, 0).0[0], 30);
        assert!(anim.draw_frame(4, &mut surface, IVec2::ZERO, Some(0.3)).is_err());

        anim.set_visible(false);
        assert!(!anim.draw(&mut surface, IVec2::ZERO, Some(0.3)));
        anim.set_visible(true);
        // finished animations settle to stopped and stop drawing
        assert!(!anim.draw(&mut surface, IVec2::ZERO, Some(5.0)));
        assert_eq!(anim.current_state(Some(5.0)), PlaybackState::Stopped);
    }
}
