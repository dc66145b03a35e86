//! roster_core - Creature, power and damage vocabulary for encounters
//!
//! Supplies the backing data the combat rules read: creature profiles
//! (max HP, defences, damage modifier table, role), power definitions
//! (attack bonus, damage expression, recharge text) and a [`Roster`]
//! registry loaded from TOML or JSON files.

mod config;
pub mod creature;
pub mod power;
mod roster;
pub mod types;

pub use creature::CreatureProfile;
pub use power::{
    DamageExpression, DiceTerm, PowerDefinition, PowerId, PowerUsage, MAX_DICE_COUNT, MAX_DIE_SIDES,
};
pub use roster::Roster;
pub use types::{DamageModifier, DamageType, DefenceType, Defences, ModifierValue, RoleKind};

use std::path::PathBuf;
use thiserror::Error;

/// Error loading roster definitions
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("JSON parse error in '{path}': {error}")]
    Json {
        error: serde_json::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{path}': {message}")]
    Validation { message: String, path: PathBuf },
}

/// Error parsing a damage expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("Empty damage expression")]
    Empty,
    #[error("Invalid term in damage expression: {0}")]
    InvalidTerm(String),
    #[error("Subtracted dice are not supported: {0}")]
    NegativeDice(String),
    #[error("Dice term too large: {0}")]
    TooLarge(String),
}
