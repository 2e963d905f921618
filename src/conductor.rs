//! Drive a group of animations as one.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use glam::UVec2;

use crate::{
    animation::Animation,
    clock,
    color::Color,
    errors::Result,
    transform::{self, Flip},
};

/// Animation handle a conductor can follow
pub type SharedAnimation = Rc<RefCell<Animation>>;

pub fn shared(animation: Animation) -> SharedAnimation {
    Rc::new(RefCell::new(animation))
}

/// A control call that can be sent to every animation of a conductor
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    Reverse,
    TogglePause,
    NextFrame(isize),
    PrevFrame(isize),
    Rewind(Option<f64>),
    FastForward(Option<f64>),
    SetElapsed(f64),
    Flip(Flip),
    Scale(UVec2),
    Rotate(f32),
    Rotozoom { degrees: f32, scale: f32 },
    Scale2x,
    Smoothscale(UVec2),
    SetAlpha(u8),
    SetColorKey(Color),
    ClearTransforms,
    MakeTransformsPermanent,
}

impl Command {
    fn validate(&self) -> Result<()> {
        match self {
            Command::Scale(size) | Command::Smoothscale(size) => transform::check_size(*size),
            Command::Rotozoom { scale, .. } => transform::check_scale(*scale),
            _ => Ok(()),
        }
    }

    fn apply_to(&self, anim: &mut Animation, now: f64) -> Result<()> {
        let now = Some(now);
        match *self {
            Command::Play => anim.play(now),
            Command::Pause => anim.pause(now),
            Command::Stop => anim.stop(),
            Command::Reverse => anim.reverse(now),
            Command::TogglePause => anim.toggle_pause(now),
            Command::NextFrame(jump) => anim.next_frame(jump, now),
            Command::PrevFrame(jump) => anim.prev_frame(jump, now),
            Command::Rewind(seconds) => anim.rewind(seconds, now),
            Command::FastForward(seconds) => anim.fast_forward(seconds, now),
            Command::SetElapsed(elapsed) => anim.set_elapsed(elapsed, now),
            Command::Flip(flip) => anim.flip(flip),
            Command::Scale(size) => anim.scale(size)?,
            Command::Rotate(degrees) => anim.rotate(degrees),
            Command::Rotozoom { degrees, scale } => anim.rotozoom(degrees, scale)?,
            Command::Scale2x => anim.scale2x(),
            Command::Smoothscale(size) => anim.smoothscale(size)?,
            Command::SetAlpha(alpha) => anim.set_alpha(alpha),
            Command::SetColorKey(key) => anim.set_color_key(key),
            Command::ClearTransforms => anim.clear_transforms(),
            Command::MakeTransformsPermanent => anim.make_transforms_permanent(),
        }
        Ok(())
    }
}

/// Conductor
///
/// Sends the same call, with one shared timestamp, to every animation it
/// follows so they stay in phase. Animations are held weakly: dropping the
/// conductor leaves them alone and dropped animations are skipped.
#[derive(Debug, Default)]
pub struct Conductor {
    animations: Vec<Weak<RefCell<Animation>>>,
}

impl Conductor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_animations<'a, I>(animations: I) -> Self
    where
        I: IntoIterator<Item = &'a SharedAnimation>,
    {
        let mut conductor = Self::new();
        conductor.add_all(animations);
        conductor
    }

    pub fn add(&mut self, animation: &SharedAnimation) {
        self.animations.push(Rc::downgrade(animation));
    }

    pub fn add_all<'a, I>(&mut self, animations: I)
    where
        I: IntoIterator<Item = &'a SharedAnimation>,
    {
        for animation in animations {
            self.add(animation);
        }
    }

    /// Animations still alive
    pub fn animations(&self) -> Vec<SharedAnimation> {
        self.animations.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn len(&self) -> usize {
        self.animations
            .iter()
            .filter(|a| a.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget dropped animations, returns how many were removed
    pub fn prune(&mut self) -> usize {
        let before = self.animations.len();
        self.animations.retain(|a| a.strong_count() > 0);
        before - self.animations.len()
    }

    // Live animations for one batch, warns about dropped ones
    fn live(&self) -> Vec<SharedAnimation> {
        let live = self.animations();
        let dropped = self.animations.len() - live.len();
        if dropped > 0 {
            log::warn!("Conductor skipped {dropped} dropped animations");
        }
        live
    }

    fn try_for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Animation) -> Result<()>,
    {
        for animation in self.live() {
            f(&mut animation.borrow_mut())?;
        }
        Ok(())
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&mut Animation),
    {
        for animation in self.live() {
            f(&mut animation.borrow_mut());
        }
    }

    /// Send `command` to every animation.
    /// Invalid arguments are rejected before any animation is touched.
    pub fn apply(&self, command: Command, now: Option<f64>) -> Result<()> {
        command.validate()?;
        let now = clock::resolve(now);
        log::trace!("Conductor {command:?} at {now}");
        self.try_for_each(|anim| command.apply_to(anim, now))
    }

    fn run(&self, now: Option<f64>, f: impl Fn(&mut Animation, Option<f64>)) {
        let now = Some(clock::resolve(now));
        self.for_each(|anim| f(anim, now));
    }

    pub fn play(&self, now: Option<f64>) {
        self.run(now, Animation::play);
    }

    pub fn pause(&self, now: Option<f64>) {
        self.run(now, Animation::pause);
    }

    pub fn stop(&self) {
        self.for_each(Animation::stop);
    }

    pub fn reverse(&self, now: Option<f64>) {
        self.run(now, Animation::reverse);
    }

    pub fn toggle_pause(&self, now: Option<f64>) {
        self.run(now, Animation::toggle_pause);
    }

    pub fn next_frame(&self, jump: isize, now: Option<f64>) {
        self.run(now, |anim, now| anim.next_frame(jump, now));
    }

    pub fn prev_frame(&self, jump: isize, now: Option<f64>) {
        self.run(now, |anim, now| anim.prev_frame(jump, now));
    }

    pub fn rewind(&self, seconds: Option<f64>, now: Option<f64>) {
        self.run(now, |anim, now| anim.rewind(seconds, now));
    }

    pub fn fast_forward(&self, seconds: Option<f64>, now: Option<f64>) {
        self.run(now, |anim, now| anim.fast_forward(seconds, now));
    }

    pub fn set_elapsed(&self, elapsed: f64, now: Option<f64>) {
        self.run(now, |anim, now| anim.set_elapsed(elapsed, now));
    }

    pub fn flip(&self, flip: Flip) {
        self.for_each(|anim| anim.flip(flip));
    }

    pub fn scale(&self, size: UVec2) -> Result<()> {
        self.apply(Command::Scale(size), None)
    }

    pub fn rotate(&self, degrees: f32) {
        self.for_each(|anim| anim.rotate(degrees));
    }

    pub fn rotozoom(&self, degrees: f32, scale: f32) -> Result<()> {
        self.apply(Command::Rotozoom { degrees, scale }, None)
    }

    pub fn scale2x(&self) {
        self.for_each(Animation::scale2x);
    }

    pub fn smoothscale(&self, size: UVec2) -> Result<()> {
        self.apply(Command::Smoothscale(size), None)
    }

    pub fn set_alpha(&self, alpha: u8) {
        self.for_each(|anim| anim.set_alpha(alpha));
    }

    pub fn set_color_key(&self, key: Color) {
        self.for_each(|anim| anim.set_color_key(key));
    }

    pub fn clear_transforms(&self) {
        self.for_each(Animation::clear_transforms);
    }

    pub fn make_transforms_permanent(&self) {
        self.for_each(Animation::make_transforms_permanent);
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::{animation::PlaybackState, errors::Error, image::Image};

    fn walk(looping: bool) -> Animation {
        let images = (0..4)
            .map(|i| Image::new(RgbaImage::from_pixel(2, 1, Rgba([i * 10, 0, 0, 255]))))
            .collect();
        Animation::from_images(images, 0.2, looping).unwrap()
    }

    #[test]
    fn test_play_keeps_group_in_phase() {
        let a = shared(walk(true));
        let b = shared(walk(false));
        b.borrow_mut().set_rate(1.0, Some(0.0)).unwrap();
        let conductor = Conductor::with_animations([&a, &b]);
        conductor.play(Some(5.0));
        for t in [5.1, 5.35, 5.7] {
            assert_eq!(a.borrow().elapsed(Some(t)), b.borrow().elapsed(Some(t)));
        }
        conductor.pause(Some(5.3));
        assert_eq!(
            a.borrow_mut().current_state(Some(9.0)),
            PlaybackState::Paused
        );
        assert_eq!(a.borrow().elapsed(Some(9.0)), b.borrow().elapsed(Some(9.0)));
        conductor.stop();
        assert_eq!(
            b.borrow_mut().current_state(Some(9.0)),
            PlaybackState::Stopped
        );
    }

    #[test]
    fn test_empty_conductor_is_noop() {
        let conductor = Conductor::new();
        assert!(conductor.is_empty());
        conductor.play(None);
        conductor.next_frame(2, None);
        conductor.flip(Flip::X);
        assert!(conductor.apply(Command::Scale2x, None).is_ok());
    }

    #[test]
    fn test_weak_association() {
        let a = shared(walk(true));
        let mut conductor = Conductor::new();
        {
            let b = shared(walk(true));
            conductor.add_all([&a, &b]);
            assert_eq!(conductor.len(), 2);
        }
        assert_eq!(conductor.len(), 1);
        conductor.next_frame(1, Some(0.0));
        assert_eq!(a.borrow().current_frame_index(Some(0.0)), 1);
        assert_eq!(conductor.prune(), 1);

        drop(conductor);
        assert_eq!(Rc::strong_count(&a), 1);
        assert_eq!(a.borrow().current_frame_index(Some(0.0)), 1);
    }

    #[test]
    fn test_transforms_fan_out() {
        let a = shared(walk(true));
        let b = shared(walk(true));
        let conductor = Conductor::with_animations([&a, &b]);
        conductor.scale2x();
        conductor.rotate(90.0);
        for anim in conductor.animations() {
            assert_eq!(anim.borrow().frame_image(3).unwrap().size(), UVec2::new(2, 4));
        }
        conductor.clear_transforms();
        assert!(!a.borrow().has_transforms() && !b.borrow().has_transforms());
    }

    #[test]
    fn test_invalid_command_touches_nothing() {
        let a = shared(walk(true));
        let conductor = Conductor::with_animations([&a]);
        assert_eq!(
            conductor.scale(UVec2::new(0, 3)),
            Err(Error::InvalidTargetSize {
                width: 0,
                height: 3
            })
        );
        assert!(conductor.rotozoom(10.0, -1.0).is_err());
        assert!(!a.borrow().has_transforms());
        conductor.smoothscale(UVec2::new(4, 4)).unwrap();
        assert!(a.borrow().has_transforms());
    }

    #[test]
    fn test_apply_commands() {
        let a = shared(walk(false));
        let conductor = Conductor::with_animations([&a]);
        conductor.apply(Command::SetElapsed(0.45), Some(1.0)).unwrap();
        assert_eq!(a.borrow().current_frame_index(Some(2.0)), 2);
        conductor.apply(Command::PrevFrame(1), Some(2.0)).unwrap();
        assert_eq!(a.borrow().current_frame_index(Some(2.0)), 1);
        conductor.apply(Command::FastForward(None), Some(2.0)).unwrap();
        assert_eq!(a.borrow().current_frame_index(Some(2.0)), 3);
        conductor.apply(Command::Reverse, Some(2.0)).unwrap();
        assert_eq!(a.borrow().current_frame_image(Some(2.0)).pixels().get_pixel(0, 0).0[0], 30);
        conductor.apply(Command::Play, Some(2.0)).unwrap();
        assert_eq!(
            a.borrow_mut().current_state(Some(2.1)),
            PlaybackState::Playing
        );
    }
}
