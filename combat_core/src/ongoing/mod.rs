//! Ongoing effect ledger - a combatant's conditions and what they do each round

use crate::combatant::{
    CombatantId, CombatantState, ConditionDuration, ConditionId, ConditionKind, OngoingCondition,
};
use crate::damage::{absorb_damage, effective_damage};
use roster_core::{DamageModifier, DamageType, DefenceType};
use serde::{Deserialize, Serialize};

/// Outcome of applying a round's ongoing damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OngoingDamageResult {
    /// Sum of the unmodified condition amounts
    pub raw_total: u32,
    /// Sum after each condition's modifiers
    pub effective_total: u32,
    pub absorbed_by_temp_hp: u32,
    pub added_to_damage_taken: u32,
}

/// Attach a condition, assigning it a fresh id
pub fn add(combatant: &mut CombatantState, mut condition: OngoingCondition) -> ConditionId {
    let id = combatant.allocate_condition_id();
    condition.id = id;
    combatant.conditions.push(condition);
    id
}

/// Detach a condition; absent ids are a no-op
pub fn remove(combatant: &mut CombatantState, id: ConditionId) -> Option<OngoingCondition> {
    let index = combatant.conditions.iter().position(|c| c.id == id)?;
    Some(combatant.conditions.remove(index))
}

/// Aggregate ongoing damage for one round
///
/// Each `Damage` condition is modified independently (no halving), then summed.
pub fn total_ongoing_damage(combatant: &CombatantState, table: &[DamageModifier]) -> u32 {
    combatant
        .conditions
        .iter()
        .filter_map(|c| match &c.kind {
            ConditionKind::Damage {
                damage_type,
                amount,
            } => {
                let types: &[DamageType] = match damage_type {
                    Some(t) => std::slice::from_ref(t),
                    None => &[],
                };
                Some(effective_damage(*amount, types, table, false))
            }
            _ => None,
        })
        .fold(0u32, |acc, v| acc.saturating_add(v))
}

/// Apply a round's ongoing damage once, temp HP first (immutable API)
pub fn apply_ongoing_damage(
    combatant: &CombatantState,
    table: &[DamageModifier],
) -> (CombatantState, OngoingDamageResult) {
    let mut new_combatant = combatant.clone();

    let raw_total = combatant
        .conditions
        .iter()
        .filter_map(|c| match &c.kind {
            ConditionKind::Damage { amount, .. } => Some(*amount),
            _ => None,
        })
        .fold(0u32, |acc, v| acc.saturating_add(v));
    let effective_total = total_ongoing_damage(combatant, table);
    let (absorbed, taken) = absorb_damage(&mut new_combatant, effective_total);

    if effective_total > 0 {
        tracing::debug!(
            combatant = %combatant.id,
            raw_total,
            effective_total,
            absorbed,
            taken,
            "Ongoing damage applied"
        );
    }

    (
        new_combatant,
        OngoingDamageResult {
            raw_total,
            effective_total,
            absorbed_by_temp_hp: absorbed,
            added_to_damage_taken: taken,
        },
    )
}

/// Regeneration for this turn; instances do not stack, the highest applies
pub fn total_regeneration(combatant: &CombatantState) -> u32 {
    combatant
        .conditions
        .iter()
        .filter_map(|c| match c.kind {
            ConditionKind::Regeneration { amount } => Some(amount),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

/// Net change to `defence` from active defence modifier conditions
pub fn defence_modifier_total(conditions: &[OngoingCondition], defence: DefenceType) -> i32 {
    conditions
        .iter()
        .map(|c| c.defence_delta(defence))
        .fold(0i32, |acc, v| acc.saturating_add(v))
}

/// Base modifier table plus any temporary damage modifier conditions
pub fn effective_modifier_table(
    combatant: &CombatantState,
    base: &[DamageModifier],
) -> Vec<DamageModifier> {
    let mut table = base.to_vec();
    table.extend(combatant.conditions.iter().filter_map(|c| match c.kind {
        ConditionKind::DamageModifier(modifier) => Some(modifier),
        _ => None,
    }));
    table
}

/// Human-readable remaining duration of a condition
pub fn describe_duration(condition: &OngoingCondition, current_round: u32) -> String {
    let whose = match &condition.owner {
        Some(owner) => format!("{}'s", owner),
        None => "its".to_string(),
    };
    // "current" only once a later round has reached the boundary
    let when = if current_round > condition.round && current_round >= condition.boundary_round {
        "current"
    } else {
        "next"
    };

    match condition.duration() {
        ConditionDuration::SaveEnds { modifier: 0 } => "save ends".to_string(),
        ConditionDuration::SaveEnds { modifier } => {
            format!("save ends, {:+} to the save", modifier)
        }
        ConditionDuration::UntilStartOfNextTurn => {
            format!("until the start of {} {} turn", whose, when)
        }
        ConditionDuration::UntilEndOfNextTurn => {
            format!("until the end of {} {} turn", whose, when)
        }
        ConditionDuration::UntilEndOfEncounter => "until the end of the encounter".to_string(),
    }
}

/// Condition text with its duration, e.g. "5 ongoing fire damage (save ends)"
pub fn describe_condition(condition: &OngoingCondition, current_round: u32) -> String {
    format!(
        "{} ({})",
        condition.kind,
        describe_duration(condition, current_round)
    )
}

/// Remove "until the start of next turn" conditions ending as `turn_owner` starts a turn
pub fn expire_at_turn_start(
    combatant: &mut CombatantState,
    turn_owner: &CombatantId,
    current_round: u32,
) -> Vec<OngoingCondition> {
    expire_matching(
        combatant,
        turn_owner,
        current_round,
        ConditionDuration::UntilStartOfNextTurn,
    )
}

/// Remove "until the end of next turn" conditions ending as `turn_owner` ends a turn
pub fn expire_at_turn_end(
    combatant: &mut CombatantState,
    turn_owner: &CombatantId,
    current_round: u32,
) -> Vec<OngoingCondition> {
    expire_matching(
        combatant,
        turn_owner,
        current_round,
        ConditionDuration::UntilEndOfNextTurn,
    )
}

fn expire_matching(
    combatant: &mut CombatantState,
    turn_owner: &CombatantId,
    current_round: u32,
    duration: ConditionDuration,
) -> Vec<OngoingCondition> {
    let own_id = combatant.id.clone();
    let (expired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut combatant.conditions)
        .into_iter()
        .partition(|c| {
            c.duration() == duration
                && c.owner.as_ref().unwrap_or(&own_id) == turn_owner
                && c.boundary_round <= current_round
        });
    combatant.conditions = kept;

    for condition in &expired {
        tracing::trace!(combatant = %own_id, condition = %condition.kind, "Condition expired");
    }
    expired
}

/// Strip every condition at the end of the encounter; returns how many were removed
pub fn end_encounter(combatant: &mut CombatantState) -> usize {
    let count = combatant.conditions.len();
    combatant.conditions.clear();
    count
}
