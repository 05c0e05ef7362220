//! Hero points: the spendable pool behind the hero reroll.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A character's hero point pool. The balance never leaves `[0, max]`.
///
/// Stored pools are clamped on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredHeroPoints")]
pub struct HeroPoints {
    /// Points available.
    pub value: i32,
    /// Pool size.
    pub max: i32,
}

impl HeroPoints {
    /// Standard pool size.
    pub const MAX: i32 = 3;

    /// A pool holding `value` points, clamped to `[0, max]`.
    pub fn new(value: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            value: value.clamp(0, max),
            max,
        }
    }

    /// Whether a point is available.
    pub fn can_spend(&self) -> bool {
        self.value > 0
    }

    /// Spend one point. Spending from an empty pool does nothing and
    /// returns false.
    pub fn spend(&mut self) -> bool {
        if !self.can_spend() {
            return false;
        }
        self.value = (self.value - 1).clamp(0, self.max);
        true
    }
}

#[derive(Deserialize)]
struct StoredHeroPoints {
    value: i32,
    max: i32,
}

impl From<StoredHeroPoints> for HeroPoints {
    fn from(stored: StoredHeroPoints) -> Self {
        Self::new(stored.value, stored.max)
    }
}

impl Default for HeroPoints {
    fn default() -> Self {
        Self::new(1, Self::MAX)
    }
}

impl fmt::Display for HeroPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hero Points: {}/{}", self.value, self.max)
    }
}
