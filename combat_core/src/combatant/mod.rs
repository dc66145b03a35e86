//! CombatantState - the mutable per-combatant record of an encounter

mod condition;

pub use condition::{ConditionDuration, ConditionId, ConditionKind, OngoingCondition};

use crate::config::constants;
use roster_core::{CreatureProfile, PowerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a combatant within an encounter
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(pub String);

impl From<&str> for CombatantId {
    fn from(s: &str) -> Self {
        CombatantId(s.to_string())
    }
}

impl From<String> for CombatantId {
    fn from(s: String) -> Self {
        CombatantId(s)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Grid position of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Coarse health band shown next to a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Bloodied,
    Dead,
}

/// Per-combatant encounter state
///
/// Only the running totals are stored; current hit points are derived from
/// the backing profile's maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantState {
    pub id: CombatantId,
    pub name: String,
    /// `None` until initiative has been rolled or entered
    pub initiative: Option<i32>,
    pub damage_taken: u32,
    pub temp_hp: u32,
    pub position: Option<Position>,
    pub conditions: Vec<OngoingCondition>,
    /// Powers spent and awaiting recharge, in order of use
    used_powers: Vec<PowerId>,
    next_condition_id: u32,
}

impl CombatantState {
    pub fn new(id: impl Into<CombatantId>, name: impl Into<String>) -> Self {
        CombatantState {
            id: id.into(),
            name: name.into(),
            initiative: None,
            damage_taken: 0,
            temp_hp: 0,
            position: None,
            conditions: Vec::new(),
            used_powers: Vec::new(),
            next_condition_id: 0,
        }
    }

    /// Current hit points; negative when below zero
    pub fn current_hp(&self, max_hp: u32) -> i64 {
        max_hp as i64 - self.damage_taken as i64
    }

    /// Health band against a backing profile
    ///
    /// Minions die as soon as any damage gets through.
    pub fn health_status(&self, profile: &CreatureProfile) -> HealthStatus {
        if profile.role.is_minion() && self.damage_taken > 0 {
            return HealthStatus::Dead;
        }
        let hp = self.current_hp(profile.max_hp);
        if hp <= 0 {
            HealthStatus::Dead
        } else if hp <= (profile.max_hp / constants().health.bloodied_divisor) as i64 {
            HealthStatus::Bloodied
        } else {
            HealthStatus::Healthy
        }
    }

    /// Regain hit points; returns the amount actually healed
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.damage_taken);
        self.damage_taken -= healed;
        healed
    }

    /// Grant temporary hit points; they do not stack, the larger value is kept
    pub fn grant_temp_hp(&mut self, amount: u32) -> bool {
        if amount > self.temp_hp {
            self.temp_hp = amount;
            true
        } else {
            false
        }
    }

    /// Record a power as used; returns false if it already was
    pub fn mark_power_used(&mut self, power: impl Into<PowerId>) -> bool {
        let power = power.into();
        if self.used_powers.contains(&power) {
            return false;
        }
        self.used_powers.push(power);
        true
    }

    /// Make a used power available again; returns false if it was not used
    pub fn refresh_power(&mut self, power: &PowerId) -> bool {
        let before = self.used_powers.len();
        self.used_powers.retain(|p| p != power);
        self.used_powers.len() != before
    }

    pub fn is_power_used(&self, power: &PowerId) -> bool {
        self.used_powers.contains(power)
    }

    pub fn used_powers(&self) -> &[PowerId] {
        &self.used_powers
    }

    /// Get a condition by id
    pub fn condition(&self, id: ConditionId) -> Option<&OngoingCondition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    /// Allocate the next condition id
    pub(crate) fn allocate_condition_id(&mut self) -> ConditionId {
        self.next_condition_id += 1;
        ConditionId(self.next_condition_id)
    }
}
