//! combat_core - Combat resolution rules for turn-based encounters
//!
//! This library provides:
//! - CombatantState: Per-encounter hit points, temp HP, conditions and used powers
//! - Damage resolution: Resistances, vulnerabilities, immunity and halving
//! - Ongoing effects: Save-ends and turn-bounded conditions
//! - Saving throws and recharge rolls: Propose, override, then commit
//! - Initiative: Grouped scores and turn order
//! - Attacks: d20 rolls against a defence, critical damage
//! - EncounterSession: Everything above, wired against creature profiles
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use combat_core::prelude::*;
//! use roster_core::Roster;
//!
//! init_constants_default()?;
//! let roster = Roster::load(Path::new("creatures/"))?;
//! let mut dice = thread_dice();
//!
//! let mut session = EncounterSession::new();
//! let goblin = roster.get("goblin_cutter").unwrap().clone();
//! let cutter = CombatantState::new("goblin-1", "Goblin Cutter");
//! session.add_participant(cutter, goblin, "Goblin Cutter");
//!
//! session.roll_unrolled(&mut dice);
//! let first = session.begin();
//! let result = session.apply_damage(&"goblin-1".into(), 7, &[DamageType::Fire]);
//! ```

pub mod attack;
pub mod combatant;
pub mod config;
pub mod damage;
pub mod initiative;
pub mod ongoing;
pub mod prelude;
pub mod rolls;
pub mod session;

// Core API - what most users need
pub use combatant::{CombatantId, CombatantState, HealthStatus};
pub use session::EncounterSession;
pub use damage::DamageResult;
pub use attack::AttackResult;

// Rolls
pub use rolls::recharge::RechargeBatch;
pub use rolls::saves::SavingThrowBatch;
pub use rolls::{seeded_dice, thread_dice, DiceRoller};

// Configuration
pub use config::{init_constants, init_constants_default, RulesConstants};
