//! Creature profiles - the rules-relevant part of a creature or hero

use crate::power::{PowerDefinition, PowerId};
use crate::types::{DamageModifier, Defences, RoleKind};
use serde::{Deserialize, Serialize};

/// Backing profile for a combatant
///
/// Heroes use the same shape with `RoleKind::Normal` and no modifier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub role: RoleKind,
    pub max_hp: u32,
    #[serde(default)]
    pub initiative_bonus: i32,
    pub defences: Defences,
    /// Resistances, vulnerabilities and immunities
    #[serde(default)]
    pub damage_modifiers: Vec<DamageModifier>,
    /// Insubstantial creatures take half damage
    #[serde(default)]
    pub insubstantial: bool,
    #[serde(default)]
    pub powers: Vec<PowerDefinition>,
}

impl CreatureProfile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        max_hp: u32,
        defences: Defences,
    ) -> Self {
        CreatureProfile {
            id: id.into(),
            name: name.into(),
            level: 1,
            role: RoleKind::Normal,
            max_hp,
            initiative_bonus: 0,
            defences,
            damage_modifiers: Vec::new(),
            insubstantial: false,
            powers: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: RoleKind) -> Self {
        self.role = role;
        self
    }

    pub fn with_modifier(mut self, modifier: DamageModifier) -> Self {
        self.damage_modifiers.push(modifier);
        self
    }

    pub fn with_power(mut self, power: PowerDefinition) -> Self {
        self.powers.push(power);
        self
    }

    pub fn insubstantial(mut self) -> Self {
        self.insubstantial = true;
        self
    }

    /// Look up a power by id
    pub fn power(&self, id: &PowerId) -> Option<&PowerDefinition> {
        self.powers.iter().find(|p| &p.id == id)
    }
}
