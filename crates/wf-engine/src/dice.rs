//! Random rolls. Every probabilistic rule draws through [`Dice`] so tests
//! can force outcomes.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed integer rolls.
pub trait Dice: std::fmt::Debug {
    /// Roll an integer in `low..=high`.
    fn roll(&mut self, low: i32, high: i32) -> i32;
}

/// Seeded RNG-backed dice.
#[derive(Debug, Clone)]
pub struct RngDice {
    rng: StdRng,
}

impl RngDice {
    /// Dice seeded for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for RngDice {
    fn roll(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }
}

/// Dice that return a fixed sequence of values, each clamped to the
/// requested range. Once the script runs out every roll returns `high`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<i32>,
}

impl ScriptedDice {
    /// Dice that return `rolls` in order.
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    /// Rolls not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, low: i32, high: i32) -> i32 {
        let high = high.max(low);
        match self.rolls.pop_front() {
            Some(v) => v.clamp(low, high),
            None => high,
        }
    }
}
