use crate::creature::CreatureProfile;
use crate::power::PowerDefinition;
use crate::types::{DamageModifier, DamageType, Defences, ModifierValue, RoleKind};
use serde::Deserialize;

/// A roster definition file (TOML or JSON)
#[derive(Debug, Deserialize)]
pub struct RosterFileConfig {
    #[serde(default)]
    pub creatures: Vec<CreatureConfig>,
}

/// Configuration for a single creature
#[derive(Debug, Deserialize)]
pub struct CreatureConfig {
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
    #[serde(default)]
    pub damage_modifiers: Vec<ModifierConfig>,
    #[serde(default)]
    pub insubstantial: bool,
    #[serde(default)]
    pub powers: Vec<PowerDefinition>,
}

/// A damage modifier entry
///
/// `{ type = "fire", value = -5 }` or `{ type = "poison", value = "immune" }`
#[derive(Debug, Deserialize)]
pub struct ModifierConfig {
    #[serde(rename = "type")]
    pub damage_type: DamageType,
    pub value: ModifierValueConfig,
}

/// Modifier value can be a signed amount or the keyword "immune"
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModifierValueConfig {
    Amount(i32),
    Keyword(String),
}

impl ModifierConfig {
    fn into_modifier(self) -> Result<DamageModifier, String> {
        let value = match self.value {
            ModifierValueConfig::Amount(v) => ModifierValue::Amount(v),
            ModifierValueConfig::Keyword(k) if k.eq_ignore_ascii_case("immune") => {
                ModifierValue::Immune
            }
            ModifierValueConfig::Keyword(k) => {
                return Err(format!(
                    "Unknown modifier value '{}' for {} (expected a number or \"immune\")",
                    k, self.damage_type
                ))
            }
        };
        Ok(DamageModifier {
            damage_type: self.damage_type,
            value,
        })
    }
}

impl CreatureConfig {
    /// Validate and convert into a profile
    pub fn into_profile(self) -> Result<CreatureProfile, String> {
        if self.id.trim().is_empty() {
            return Err("Creature id must not be empty".to_string());
        }
        if self.max_hp == 0 {
            return Err(format!("Creature '{}' must have max_hp > 0", self.id));
        }

        let damage_modifiers = self
            .damage_modifiers
            .into_iter()
            .map(ModifierConfig::into_modifier)
            .collect::<Result<Vec<_>, _>>()?;

        {
            let mut seen = std::collections::HashSet::new();
            for power in &self.powers {
                if !seen.insert(&power.id) {
                    return Err(format!(
                        "Creature '{}' defines power '{}' more than once",
                        self.id, power.id
                    ));
                }
            }
        }

        Ok(CreatureProfile {
            id: self.id,
            name: self.name,
            level: self.level,
            role: self.role,
            max_hp: self.max_hp,
            initiative_bonus: self.initiative_bonus,
            defences: self.defences,
            damage_modifiers,
            insubstantial: self.insubstantial,
            powers: self.powers,
        })
    }
}
