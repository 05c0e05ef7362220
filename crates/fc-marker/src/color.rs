//! Outline colors by DC band.

use std::fmt;

/// The outline color for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetColor {
    /// DC 5 or lower.
    Yellow,
    /// DC 6 to 10.
    Orange,
    /// DC 11 or higher.
    Red,
}

impl TargetColor {
    /// The band a DC falls into.
    pub fn from_dc(dc: u32) -> Self {
        match dc {
            0..=5 => Self::Yellow,
            6..=10 => Self::Orange,
            _ => Self::Red,
        }
    }

    /// Packed `0xRRGGBB` value.
    pub fn rgb(self) -> u32 {
        match self {
            Self::Yellow => 0xF9D71C,
            Self::Orange => 0xF28C28,
            Self::Red => 0xE0303A,
        }
    }
}

impl fmt::Display for TargetColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.rgb())
    }
}
