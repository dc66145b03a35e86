//! Attack rolls against a target's defences

use crate::combatant::{CombatantState, OngoingCondition};
use crate::config::constants;
use crate::ongoing::defence_modifier_total;
use crate::rolls::DiceRoller;
use roster_core::{
    CreatureProfile, DamageExpression, DefenceType, PowerDefinition, MAX_DICE_COUNT, MAX_DIE_SIDES,
};
use serde::{Deserialize, Serialize};

/// Outcome of one attack roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackResult {
    pub defence: DefenceType,
    /// Natural d20 value
    pub roll: i32,
    pub total: i32,
    pub effective_defence: i32,
    pub hit: bool,
    /// Natural 20: always hits, damage is maximised
    pub critical: bool,
    /// Natural 1: always misses
    pub fumble: bool,
}

/// Resolve a single attack roll
///
/// Effective defence is the base score plus every active defence modifier
/// covering `defence`.
pub fn resolve_attack(
    attack_bonus: i32,
    base_defence: i32,
    active_conditions: &[OngoingCondition],
    defence: DefenceType,
    dice: &mut impl DiceRoller,
) -> AttackResult {
    let attacks = &constants().attacks;
    let roll = dice.die(attacks.die_sides);
    let total = roll.saturating_add(attack_bonus);
    let effective_defence =
        base_defence.saturating_add(defence_modifier_total(active_conditions, defence));

    let critical = roll >= attacks.critical_roll;
    let fumble = !critical && roll <= attacks.automatic_miss_roll;
    let hit = critical || (!fumble && total >= effective_defence);

    tracing::debug!(
        roll,
        total,
        defence = %defence,
        effective_defence,
        hit,
        critical,
        "Attack resolved"
    );

    AttackResult {
        defence,
        roll,
        total,
        effective_defence,
        hit,
        critical,
        fumble,
    }
}

/// Roll a power's attack against a target
///
/// `None` when the power has no attack roll.
pub fn attack_with_power(
    power: &PowerDefinition,
    target_profile: &CreatureProfile,
    target: &CombatantState,
    dice: &mut impl DiceRoller,
) -> Option<AttackResult> {
    let bonus = power.attack_bonus?;
    let defence = power.defence.unwrap_or(DefenceType::ArmourClass);
    Some(resolve_attack(
        bonus,
        target_profile.defences.get(defence),
        &target.conditions,
        defence,
        dice,
    ))
}

/// Damage for a hit; criticals use the expression's maximum instead of rolling
///
/// Terms built by hand are held to the same bounds the parser enforces.
pub fn roll_damage(
    expression: &DamageExpression,
    critical: bool,
    dice: &mut impl DiceRoller,
) -> u32 {
    if critical {
        return expression.maximum();
    }
    let mut total = expression.modifier as i64;
    for term in &expression.dice {
        let sides = term.sides.min(MAX_DIE_SIDES) as i32;
        for _ in 0..term.count.min(MAX_DICE_COUNT) {
            total += dice.die(sides) as i64;
        }
    }
    total.clamp(0, u32::MAX as i64) as u32
}
