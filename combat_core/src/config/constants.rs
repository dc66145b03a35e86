//! Tunable rules constants

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use super::ConfigError;

/// Global rules constants instance
static RULES_CONSTANTS: OnceLock<RulesConstants> = OnceLock::new();

/// Initialize the global rules constants from a TOML file
///
/// Call once at startup, before the first resolver call.
/// Returns error if already initialized or if loading fails.
pub fn init_constants(path: &Path) -> Result<(), ConfigError> {
    let constants = RulesConstants::load_from_path(path)?;
    RULES_CONSTANTS
        .set(constants)
        .map_err(|_| ConfigError::ValidationError("RulesConstants already initialized".to_string()))
}

/// Initialize the global rules constants with default values
pub fn init_constants_default() -> Result<(), ConfigError> {
    RULES_CONSTANTS
        .set(RulesConstants::default())
        .map_err(|_| ConfigError::ValidationError("RulesConstants already initialized".to_string()))
}

/// Get a reference to the global rules constants
///
/// Falls back to the defaults if nothing was installed, which also locks
/// them in: a later `init_constants()` will then fail.
pub fn constants() -> &'static RulesConstants {
    RULES_CONSTANTS.get_or_init(RulesConstants::default)
}

/// Check if constants have been initialized
pub fn constants_initialized() -> bool {
    RULES_CONSTANTS.get().is_some()
}

/// Ensure constants are initialized with defaults (idempotent, useful for tests)
pub fn ensure_constants_initialized() {
    RULES_CONSTANTS.get_or_init(RulesConstants::default);
}

/// Tunable rules constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConstants {
    #[serde(default)]
    pub saves: SaveConstants,
    #[serde(default)]
    pub recharge: RechargeConstants,
    #[serde(default)]
    pub attacks: AttackConstants,
    #[serde(default)]
    pub health: HealthConstants,
}

impl RulesConstants {
    /// Load constants from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let constants: RulesConstants = super::load_toml(path)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Parse constants from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let constants: RulesConstants = super::parse_toml(content)?;
        constants.validate()?;
        Ok(constants)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.saves.die_sides < 1 || self.recharge.die_sides < 1 || self.attacks.die_sides < 1 {
            return Err(ConfigError::ValidationError(
                "Die sizes must be at least 1".to_string(),
            ));
        }
        if self.health.bloodied_divisor == 0 {
            return Err(ConfigError::ValidationError(
                "bloodied_divisor must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveConstants {
    /// Total needed to end a save-ends condition
    #[serde(default = "default_save_threshold")]
    pub success_threshold: i32,
    /// Bonus to all saving throws for elite creatures
    #[serde(default = "default_elite_bonus")]
    pub elite_bonus: i32,
    /// Bonus to all saving throws for solo creatures
    #[serde(default = "default_solo_bonus")]
    pub solo_bonus: i32,
    #[serde(default = "default_d20")]
    pub die_sides: i32,
}

impl Default for SaveConstants {
    fn default() -> Self {
        SaveConstants {
            success_threshold: 10,
            elite_bonus: 2,
            solo_bonus: 5,
            die_sides: 20,
        }
    }
}

fn default_save_threshold() -> i32 {
    10
}
fn default_elite_bonus() -> i32 {
    2
}
fn default_solo_bonus() -> i32 {
    5
}
fn default_d20() -> i32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RechargeConstants {
    #[serde(default = "default_d6")]
    pub die_sides: i32,
}

impl Default for RechargeConstants {
    fn default() -> Self {
        RechargeConstants { die_sides: 6 }
    }
}

fn default_d6() -> i32 {
    6
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackConstants {
    #[serde(default = "default_d20")]
    pub die_sides: i32,
    /// Natural roll that always hits and scores a critical
    #[serde(default = "default_critical_roll")]
    pub critical_roll: i32,
    /// Natural roll that always misses
    #[serde(default = "default_automatic_miss_roll")]
    pub automatic_miss_roll: i32,
}

impl Default for AttackConstants {
    fn default() -> Self {
        AttackConstants {
            die_sides: 20,
            critical_roll: 20,
            automatic_miss_roll: 1,
        }
    }
}

fn default_critical_roll() -> i32 {
    20
}
fn default_automatic_miss_roll() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConstants {
    /// Bloodied at or below max_hp / bloodied_divisor
    #[serde(default = "default_bloodied_divisor")]
    pub bloodied_divisor: u32,
}

impl Default for HealthConstants {
    fn default() -> Self {
        HealthConstants { bloodied_divisor: 2 }
    }
}

fn default_bloodied_divisor() -> u32 {
    2
}
