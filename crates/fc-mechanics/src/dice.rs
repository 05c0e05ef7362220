//! The d20 primitive flat checks are rolled with.
//!
//! [`FlatRoller`] is the seam to whatever actually rolls dice. Two rollers
//! ship with the crate: [`SeededRoller`] for real play and
//! [`ScriptedRoller`] for replaying known results.

use std::collections::VecDeque;

use fc_core::ActorId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};
use crate::resolution::FlatOutcome;

/// Number of sides on the flat check die.
pub const FLAT_DIE_SIDES: u32 = 20;

/// How a flat check roll is presented and attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RollOptions {
    /// Hide the roll from everyone except the roller and the GM.
    pub hidden: bool,
    /// Suppress the standalone roll message (the result is shown inline).
    pub invisible: bool,
    /// The actor the roll is attributed to.
    pub origin: Option<ActorId>,
}

impl RollOptions {
    /// Options used for checks rolled from a message control: visible to the
    /// roller, no standalone message, attributed to the acting actor.
    pub fn inline(origin: Option<ActorId>) -> Self {
        Self {
            hidden: false,
            invisible: true,
            origin,
        }
    }
}

/// The result of one flat check roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRoll {
    /// The d20 total.
    pub total: u32,
    /// The DC the roll was made against.
    pub dc: u32,
    /// The options the roll was made with.
    pub options: RollOptions,
}

impl FlatRoll {
    /// Whether the roll met the DC.
    pub fn outcome(&self) -> FlatOutcome {
        FlatOutcome::resolve(self.total, self.dc)
    }
}

impl std::fmt::Display for FlatRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs DC {} ({})", self.total, self.dc, self.outcome())
    }
}

/// Something that can roll a DC-gated flat check.
pub trait FlatRoller {
    /// Roll once against `dc`.
    fn roll(&mut self, dc: u32, options: RollOptions) -> MechResult<FlatRoll>;
}

/// Rolls a d20 from a seeded RNG.
#[derive(Debug, Clone)]
pub struct SeededRoller {
    rng: StdRng,
}

impl SeededRoller {
    /// Create a roller with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl FlatRoller for SeededRoller {
    fn roll(&mut self, dc: u32, options: RollOptions) -> MechResult<FlatRoll> {
        let total = self.rng.random_range(1..=FLAT_DIE_SIDES);
        Ok(FlatRoll { total, dc, options })
    }
}

/// Replays a fixed sequence of totals, failing once they run out.
///
/// Every call is recorded so callers can inspect what was requested.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    totals: VecDeque<u32>,
    /// Every roll request received, in order.
    pub history: Vec<(u32, RollOptions)>,
}

impl ScriptedRoller {
    /// Create a roller that returns `totals` in order.
    pub fn new(totals: impl IntoIterator<Item = u32>) -> Self {
        Self {
            totals: totals.into_iter().collect(),
            history: Vec::new(),
        }
    }

    /// Number of prepared totals not yet consumed.
    pub fn remaining(&self) -> usize {
        self.totals.len()
    }
}

impl FlatRoller for ScriptedRoller {
    fn roll(&mut self, dc: u32, options: RollOptions) -> MechResult<FlatRoll> {
        self.history.push((dc, options));
        let total = self.totals.pop_front().ok_or(MechError::RollsExhausted)?;
        Ok(FlatRoll { total, dc, options })
    }
}
