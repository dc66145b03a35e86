//! Damage system - type modifiers, halving and temp-HP-first application

mod resolution;

pub use resolution::{absorb_damage, apply_damage, effective_damage, modifier_total};

use serde::{Deserialize, Serialize};

/// Combined effect of every matching damage modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierTotal {
    /// At least one matching entry grants immunity
    Immune,
    /// Signed sum of matching entries (negative = net resistance)
    Sum(i32),
}

impl ModifierTotal {
    pub fn is_immune(&self) -> bool {
        matches!(self, ModifierTotal::Immune)
    }
}

/// Outcome of applying one instance of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    pub raw_amount: u32,
    pub modifier: ModifierTotal,
    pub halved: bool,
    /// Amount after modifiers and halving
    pub effective_amount: u32,
    pub absorbed_by_temp_hp: u32,
    pub added_to_damage_taken: u32,
}

impl DamageResult {
    pub fn was_immune(&self) -> bool {
        self.modifier.is_immune()
    }
}
