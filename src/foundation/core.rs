use crate::foundation::error::{StriplineError, StriplineResult};

pub use kurbo::{Point, Rect};

/// Timeline frame number. Frames are signed: strips may start before frame 0.
pub type Frame = i64;

/// Channel (track row) number. Channel 1 is the lowest usable channel.
pub type Channel = u32;

/// Half-open frame interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSpan {
    pub start: Frame,
    pub end: Frame, // exclusive
}

impl FrameSpan {
    pub fn new(start: Frame, end: Frame) -> StriplineResult<Self> {
        if start > end {
            return Err(StriplineError::validation("FrameSpan start must be <= end"));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> Frame {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, f: Frame) -> bool {
        self.start <= f && f < self.end
    }

    pub fn overlaps(self, other: FrameSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn union(self, other: FrameSpan) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn shift(self, delta: Frame) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> StriplineResult<Self> {
        if den == 0 {
            return Err(StriplineError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(StriplineError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Wall-clock position of `frame`, in milliseconds rounded to the nearest one.
    pub fn frame_to_millis(self, frame: Frame) -> i64 {
        (frame as f64 * 1000.0 / self.as_f64()).round() as i64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 25, den: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
