//! Control surface of the host's media element
//!
//! Decoding and rendering stay with the host. The controllers only issue
//! these commands; the host reports `timeupdate`, `ended` and `error` back as
//! [`WatchMessage`](super::messages::WatchMessage)s.

use std::fmt::Debug;

pub trait MediaElement: Send + Debug {
    fn play(&mut self);
    fn pause(&mut self);

    /// Current position in seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, secs: f64);

    /// Total length in seconds, `None` until metadata is known
    fn duration(&self) -> Option<f64>;

    /// Gain in `0.0..=1.0`
    fn set_volume(&mut self, gain: f64);
    fn set_muted(&mut self, muted: bool);
    fn set_playback_rate(&mut self, rate: f64);

    fn is_looping(&self) -> bool;
}

/// Pointer position on the seek bar, in the bar's own coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekPointer {
    pub x: f64,
    pub width: f64,
}

impl SeekPointer {
    pub fn new(x: f64, width: f64) -> Self {
        Self { x, width }
    }

    /// Video time under the pointer, clamped to `[0, duration]`
    pub fn time_for(&self, duration: f64) -> f64 {
        if self.width <= 0.0 || !duration.is_finite() || duration <= 0.0 {
            return 0.0;
        }
        (self.x / self.width * duration).clamp(0.0, duration)
    }
}
