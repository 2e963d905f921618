use crate::{
    errors::{Error, Result},
    image::Image,
};

/// A still image and how long it stays on screen, in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image: Image,
    pub duration: f64,
}

impl Frame {
    pub fn new(image: Image, duration: f64) -> Self {
        Self { image, duration }
    }
}

impl From<(Image, f64)> for Frame {
    fn from((image, duration): (Image, f64)) -> Self {
        Self::new(image, duration)
    }
}

/// Ordered frames with their cumulative start times.
///
/// `start_times` has one entry more than `frames`: `start_times[i]` is when
/// frame `i` begins and the last entry is the length of the whole timeline.
#[derive(Debug, Clone)]
pub struct Timeline {
    frames: Vec<Frame>,
    start_times: Vec<f64>,
}

impl Timeline {
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::NoFrames);
        }
        for (index, frame) in frames.iter().enumerate() {
            // rejects NaN as well
            if !(frame.duration > 0.0 && frame.duration.is_finite()) {
                return Err(Error::InvalidDuration {
                    index,
                    duration: frame.duration,
                });
            }
        }
        let start_times = calc_start_times(&frames);
        Ok(Self {
            frames,
            start_times,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false, a timeline holds at least one frame
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn start_times(&self) -> &[f64] {
        &self.start_times
    }

    pub fn durations(&self) -> impl Iterator<Item = f64> + '_ {
        self.frames.iter().map(|f| f.duration)
    }

    pub fn total_length(&self) -> f64 {
        self.start_times[self.frames.len()]
    }

    /// Start time of frame `index`
    pub fn start_time(&self, index: usize) -> Option<f64> {
        self.start_times.get(index).copied()
    }

    /// Index of the frame shown at `elapsed` seconds.
    ///
    /// Returns the `i` with `start_times[i] <= elapsed < start_times[i + 1]`,
    /// the first frame for negative input and the last frame at or past the end.
    pub fn frame_at(&self, elapsed: f64) -> usize {
        let last = self.frames.len() - 1;
        if !(elapsed < self.total_length()) {
            return last;
        }
        if elapsed <= 0.0 {
            return 0;
        }
        // binary search, start_times[0] == 0 <= elapsed so the count is at least 1
        self.start_times.partition_point(|&t| t <= elapsed) - 1
    }

    /// Same durations with new images, used when baking pixels into the originals
    pub(crate) fn with_images(&self, images: Vec<Image>) -> Self {
        debug_assert_eq!(images.len(), self.frames.len());
        let frames = self
            .frames
            .iter()
            .zip(images)
            .map(|(frame, image)| Frame::new(image, frame.duration))
            .collect();
        Self {
            frames,
            start_times: self.start_times.clone(),
        }
    }

    /// Frames in reverse order
    pub(crate) fn reversed(&self) -> Self {
        let frames: Vec<Frame> = self.frames.iter().rev().cloned().collect();
        let start_times = calc_start_times(&frames);
        Self {
            frames,
            start_times,
        }
    }
}

fn calc_start_times(frames: &[Frame]) -> Vec<f64> {
    let mut start_times = Vec::with_capacity(frames.len() + 1);
    let mut acc = 0.0;
    start_times.push(acc);
    for frame in frames {
        acc += frame.duration;
        start_times.push(acc);
    }
    start_times
}
