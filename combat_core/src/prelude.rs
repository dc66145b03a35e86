//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Core types
pub use crate::combatant::{
    CombatantId, CombatantState, ConditionDuration, ConditionId, ConditionKind, HealthStatus,
    OngoingCondition,
};
pub use crate::session::{AttackOutcome, EncounterSession, TurnEnd, TurnStart};

// Resolvers
pub use crate::attack::{resolve_attack, roll_damage, AttackResult};
pub use crate::damage::{apply_damage, DamageResult};
pub use crate::initiative::{GroupKey, InitiativeTracker};

// Rolls
pub use crate::rolls::recharge::{RechargeBatch, RechargeOutcome};
pub use crate::rolls::saves::{SaveOutcome, SavingThrowBatch};
pub use crate::rolls::{seeded_dice, thread_dice, DiceRoller, ScriptedDice};

// Config
pub use crate::config::{init_constants, init_constants_default};

// Re-exports from roster_core
pub use roster_core::{CreatureProfile, DamageType, DefenceType, PowerDefinition, PowerId};
