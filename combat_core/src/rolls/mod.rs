//! Dice and the propose/commit roll state shared by saves and recharges

pub mod recharge;
pub mod saves;

use rand::rngs::ThreadRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Injectable source of die rolls
pub trait DiceRoller {
    /// Uniform integer in `min..=max`
    fn roll(&mut self, min: i32, max: i32) -> i32;

    /// Roll a single die with the given number of sides
    fn die(&mut self, sides: i32) -> i32 {
        self.roll(1, sides.max(1))
    }
}

impl<T: DiceRoller + ?Sized> DiceRoller for &mut T {
    fn roll(&mut self, min: i32, max: i32) -> i32 {
        (**self).roll(min, max)
    }
}

/// Dice backed by any `rand` RNG
#[derive(Debug, Clone)]
pub struct RngDice<R: Rng> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        RngDice { rng }
    }
}

impl<R: Rng> DiceRoller for RngDice<R> {
    fn roll(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Dice using the thread-local RNG
pub fn thread_dice() -> RngDice<ThreadRng> {
    RngDice::new(rand::thread_rng())
}

/// Reproducible dice for a given seed
pub fn seeded_dice(seed: u64) -> RngDice<ChaCha8Rng> {
    RngDice::new(ChaCha8Rng::seed_from_u64(seed))
}

/// Dice that return a fixed script of values
///
/// Each value is clamped into the requested range; once the script runs out
/// every roll returns the range minimum.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<i32>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        ScriptedDice {
            rolls: rolls.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&mut self, min: i32, max: i32) -> i32 {
        match self.rolls.pop_front() {
            Some(v) => v.clamp(min, max.max(min)),
            None => min,
        }
    }
}

/// State of a single proposed roll before it is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RollState {
    /// Not rolled yet
    #[default]
    Pending,
    /// Rolled but not committed
    Rolled(i32),
    /// Operator override: counts as a success whatever the numbers
    ForcedSuccess,
    /// Operator override: counts as a failure whatever the numbers
    ForcedFailure,
}

impl RollState {
    /// Roll a fresh die, replacing any previous state
    pub fn roll(&mut self, dice: &mut impl DiceRoller, sides: i32) -> i32 {
        let value = dice.die(sides);
        *self = RollState::Rolled(value);
        value
    }

    /// Nudge a rolled value without re-rolling, clamped to `0..=sides`
    ///
    /// Has no effect on pending or forced states.
    pub fn adjust(&mut self, delta: i32, sides: i32) {
        if let RollState::Rolled(value) = self {
            *value = value.saturating_add(delta).clamp(0, sides.max(0));
        }
    }

    /// The natural value, if one has been rolled
    pub fn value(&self) -> Option<i32> {
        match self {
            RollState::Rolled(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RollState::Pending)
    }

    /// Whether this roll succeeds against `threshold` after adding `bonus`
    ///
    /// `None` while the roll is still pending.
    pub fn succeeds(&self, bonus: i32, threshold: i32) -> Option<bool> {
        match self {
            RollState::Pending => None,
            RollState::Rolled(v) => Some(v.saturating_add(bonus) >= threshold),
            RollState::ForcedSuccess => Some(true),
            RollState::ForcedFailure => Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_dice_clamps_and_runs_out() {
        let mut dice = ScriptedDice::new([25, 0, 4]);
        assert_eq!(dice.die(20), 20);
        assert_eq!(dice.die(20), 1);
        assert_eq!(dice.roll(1, 6), 4);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(dice.die(6), 1);
    }

    #[test]
    fn test_seeded_dice_are_reproducible() {
        let mut a = seeded_dice(42);
        let mut b = seeded_dice(42);
        let rolls_a: Vec<i32> = (0..20).map(|_| a.die(20)).collect();
        let rolls_b: Vec<i32> = (0..20).map(|_| b.die(20)).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|r| (1..=20).contains(r)));
    }

    #[test]
    fn test_thread_dice_in_range() {
        let mut dice = thread_dice();
        for _ in 0..100 {
            let r = dice.die(6);
            assert!((1..=6).contains(&r));
        }
        assert_eq!(dice.roll(3, 3), 3);
    }

    #[test]
    fn test_roll_state_adjust_clamps() {
        let mut state = RollState::Rolled(2);
        state.adjust(-5, 20);
        assert_eq!(state, RollState::Rolled(0));
        state.adjust(30, 20);
        assert_eq!(state, RollState::Rolled(20));

        let mut pending = RollState::Pending;
        pending.adjust(3, 20);
        assert_eq!(pending, RollState::Pending);
    }

    #[test]
    fn test_roll_state_success() {
        assert_eq!(RollState::Pending.succeeds(0, 10), None);
        assert_eq!(RollState::Rolled(8).succeeds(2, 10), Some(true));
        assert_eq!(RollState::Rolled(7).succeeds(2, 10), Some(false));
        assert_eq!(RollState::ForcedSuccess.succeeds(-100, 10), Some(true));
        assert_eq!(RollState::ForcedFailure.succeeds(100, 10), Some(false));
        assert_eq!(RollState::Rolled(20).succeeds(i32::MAX, 10), Some(true));
    }
}
