use serde::{Deserialize, Serialize};
use std::fmt;

/// Damage types a power or ongoing effect can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Acid,
    Cold,
    Fire,
    Force,
    Lightning,
    Necrotic,
    Poison,
    Psychic,
    Radiant,
    Thunder,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DamageType::Acid => write!(f, "acid"),
            DamageType::Cold => write!(f, "cold"),
            DamageType::Fire => write!(f, "fire"),
            DamageType::Force => write!(f, "force"),
            DamageType::Lightning => write!(f, "lightning"),
            DamageType::Necrotic => write!(f, "necrotic"),
            DamageType::Poison => write!(f, "poison"),
            DamageType::Psychic => write!(f, "psychic"),
            DamageType::Radiant => write!(f, "radiant"),
            DamageType::Thunder => write!(f, "thunder"),
        }
    }
}

/// The four target values an attack roll can be compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenceType {
    #[serde(alias = "ac")]
    ArmourClass,
    Fortitude,
    Reflex,
    Will,
}

impl fmt::Display for DefenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefenceType::ArmourClass => write!(f, "AC"),
            DefenceType::Fortitude => write!(f, "Fortitude"),
            DefenceType::Reflex => write!(f, "Reflex"),
            DefenceType::Will => write!(f, "Will"),
        }
    }
}

/// Threat role of a creature
///
/// Drives the global saving throw bonus and the minion 1-HP rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    #[default]
    Normal,
    Elite,
    Solo,
    Minion,
}

impl RoleKind {
    /// Minions are destroyed by any damage that gets through
    pub fn is_minion(&self) -> bool {
        matches!(self, RoleKind::Minion)
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKind::Normal => write!(f, "Normal"),
            RoleKind::Elite => write!(f, "Elite"),
            RoleKind::Solo => write!(f, "Solo"),
            RoleKind::Minion => write!(f, "Minion"),
        }
    }
}

/// Value of a damage modifier: a signed amount or full immunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierValue {
    /// Negative = resistance, positive = vulnerability
    Amount(i32),
    Immune,
}

/// One entry of a creature's damage modifier table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageModifier {
    pub damage_type: DamageType,
    pub value: ModifierValue,
}

impl DamageModifier {
    pub fn resist(damage_type: DamageType, amount: u32) -> Self {
        DamageModifier {
            damage_type,
            value: ModifierValue::Amount(-(amount as i32)),
        }
    }

    pub fn vulnerable(damage_type: DamageType, amount: u32) -> Self {
        DamageModifier {
            damage_type,
            value: ModifierValue::Amount(amount as i32),
        }
    }

    pub fn immune(damage_type: DamageType) -> Self {
        DamageModifier {
            damage_type,
            value: ModifierValue::Immune,
        }
    }
}

impl fmt::Display for DamageModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            ModifierValue::Immune => write!(f, "Immune {}", self.damage_type),
            ModifierValue::Amount(v) if v < 0 => write!(f, "Resist {} {}", -v, self.damage_type),
            ModifierValue::Amount(v) => write!(f, "Vulnerable {} {}", v, self.damage_type),
        }
    }
}

/// The four defence scores of a creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Defences {
    #[serde(alias = "ac")]
    pub armour_class: i32,
    pub fortitude: i32,
    pub reflex: i32,
    pub will: i32,
}

impl Defences {
    pub fn new(armour_class: i32, fortitude: i32, reflex: i32, will: i32) -> Self {
        Defences {
            armour_class,
            fortitude,
            reflex,
            will,
        }
    }

    /// Get the score for a defence type
    pub fn get(&self, defence: DefenceType) -> i32 {
        match defence {
            DefenceType::ArmourClass => self.armour_class,
            DefenceType::Fortitude => self.fortitude,
            DefenceType::Reflex => self.reflex,
            DefenceType::Will => self.will,
        }
    }
}
