use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Measured container the tiles are arranged in, in layout units (usually CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f64,
    pub height: f64,
}

impl Container {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Reject unmeasured or degenerate geometry. NaN fails the comparison and is rejected too.
    pub fn validate(&self) -> Result<()> {
        let usable = |value: f64| value > 0.0 && value.is_finite();
        if usable(self.width) && usable(self.height) {
            Ok(())
        } else {
            Err(LayoutError::InvalidContainer {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Width-over-height ratio shared by every tile. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AspectRatio(f64);

impl AspectRatio {
    /// 16:9, the ratio of a widescreen video feed.
    pub const WIDESCREEN: AspectRatio = AspectRatio(16.0 / 9.0);
    pub const STANDARD: AspectRatio = AspectRatio(4.0 / 3.0);
    pub const SQUARE: AspectRatio = AspectRatio(1.0);

    pub fn new(ratio: f64) -> Result<Self> {
        if ratio > 0.0 && ratio.is_finite() {
            Ok(Self(ratio))
        } else {
            Err(LayoutError::InvalidAspectRatio(ratio))
        }
    }

    pub fn from_dimensions(width: f64, height: f64) -> Result<Self> {
        Self::new(width / height)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for AspectRatio {
    type Error = LayoutError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AspectRatio> for f64 {
    fn from(ratio: AspectRatio) -> Self {
        ratio.0
    }
}

impl FromStr for AspectRatio {
    type Err = LayoutError;

    /// Accepts `16:9`, `16/9` or a plain decimal such as `1.7778`.
    fn from_str(s: &str) -> Result<Self> {
        let parse_err = || LayoutError::ParseAspectRatio(s.to_string());
        let number = |part: &str| part.trim().parse::<f64>().map_err(|_| parse_err());

        match s.split_once([':', '/']) {
            Some((width, height)) => Self::from_dimensions(number(width)?, number(height)?),
            None => Self::new(number(s)?),
        }
    }
}

/// Axis-aligned rectangle in container coordinates, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the interiors intersect; shared edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}
