//! Damage resolution - apply an amount of typed damage to a CombatantState

use super::{DamageResult, ModifierTotal};
use crate::combatant::CombatantState;
use roster_core::{DamageModifier, DamageType, ModifierValue};

/// Combine every table entry whose damage type is among `damage_types`
///
/// An empty `damage_types` slice is untyped damage and matches nothing.
pub fn modifier_total(damage_types: &[DamageType], table: &[DamageModifier]) -> ModifierTotal {
    let mut sum: i32 = 0;
    for entry in table.iter().filter(|m| damage_types.contains(&m.damage_type)) {
        match entry.value {
            ModifierValue::Immune => return ModifierTotal::Immune,
            ModifierValue::Amount(v) => sum = sum.saturating_add(v),
        }
    }
    ModifierTotal::Sum(sum)
}

/// Effective damage after modifiers and optional halving
///
/// 1. Immunity to any listed type suppresses the whole instance
/// 2. The signed modifier sum is added, floored at zero
/// 3. Halving (integer division) happens after modifiers
pub fn effective_damage(
    raw_amount: u32,
    damage_types: &[DamageType],
    table: &[DamageModifier],
    halve: bool,
) -> u32 {
    effective_with_total(raw_amount, modifier_total(damage_types, table), halve)
}

fn effective_with_total(raw_amount: u32, modifier: ModifierTotal, halve: bool) -> u32 {
    let amount = match modifier {
        ModifierTotal::Immune => return 0,
        ModifierTotal::Sum(sum) => (raw_amount as i64 + sum as i64).max(0),
    };
    let amount = if halve { amount / 2 } else { amount };
    amount.min(u32::MAX as i64) as u32
}

/// Apply already-effective damage: temp HP absorbs first, the rest is taken
///
/// Returns `(absorbed_by_temp_hp, added_to_damage_taken)`.
pub fn absorb_damage(combatant: &mut CombatantState, amount: u32) -> (u32, u32) {
    let absorbed = amount.min(combatant.temp_hp);
    combatant.temp_hp -= absorbed;
    let remainder = amount - absorbed;
    combatant.damage_taken = combatant.damage_taken.saturating_add(remainder);
    (absorbed, remainder)
}

/// Resolve an instance of damage against a combatant (immutable API)
///
/// Returns the new combatant state and the damage result.
pub fn apply_damage(
    combatant: &CombatantState,
    raw_amount: u32,
    damage_types: &[DamageType],
    table: &[DamageModifier],
    halve: bool,
) -> (CombatantState, DamageResult) {
    let mut new_combatant = combatant.clone();

    let modifier = modifier_total(damage_types, table);
    let effective_amount = effective_with_total(raw_amount, modifier, halve);
    let (absorbed, taken) = absorb_damage(&mut new_combatant, effective_amount);

    if modifier.is_immune() {
        tracing::debug!(combatant = %combatant.id, raw_amount, "Damage suppressed by immunity");
    }
    tracing::debug!(
        combatant = %combatant.id,
        raw_amount,
        effective_amount,
        absorbed,
        taken,
        "Damage applied"
    );

    let result = DamageResult {
        raw_amount,
        modifier,
        halved: halve,
        effective_amount,
        absorbed_by_temp_hp: absorbed,
        added_to_damage_taken: taken,
    };

    (new_combatant, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn target() -> CombatantState {
        CombatantState::new("ogre-1", "Ogre Bludgeoneer")
    }

    #[test]
    fn test_untyped_damage_ignores_table() {
        let table = [DamageModifier::resist(DamageType::Fire, 5)];
        assert_eq!(effective_damage(12, &[], &table, false), 12);
    }

    #[test]
    fn test_resistance_and_vulnerability() {
        let table = [
            DamageModifier::resist(DamageType::Fire, 5),
            DamageModifier::vulnerable(DamageType::Radiant, 5),
        ];
        assert_eq!(effective_damage(12, &[DamageType::Fire], &table, false), 7);
        assert_eq!(effective_damage(12, &[DamageType::Radiant], &table, false), 17);
        // Both types listed: modifiers sum
        assert_eq!(
            effective_damage(12, &[DamageType::Fire, DamageType::Radiant], &table, false),
            12
        );
        assert_eq!(effective_damage(12, &[DamageType::Cold], &table, false), 12);
    }

    #[test]
    fn test_resistance_floor() {
        let table = [DamageModifier {
            damage_type: DamageType::Fire,
            value: ModifierValue::Amount(-15),
        }];
        assert_eq!(effective_damage(10, &[DamageType::Fire], &table, false), 0);
    }

    #[test]
    fn test_immunity_to_one_type_suppresses_instance() {
        let table = [
            DamageModifier::vulnerable(DamageType::Fire, 10),
            DamageModifier::immune(DamageType::Poison),
        ];
        let types = [DamageType::Fire, DamageType::Poison];
        assert_eq!(modifier_total(&types, &table), ModifierTotal::Immune);
        assert_eq!(effective_damage(20, &types, &table, false), 0);
    }

    #[test]
    fn test_halving_after_modifiers() {
        assert_eq!(effective_damage(7, &[], &[], true), 3);

        // 15 - 5 = 10, halved = 5 (halving first would give 7 - 5 = 2)
        let table = [DamageModifier::resist(DamageType::Necrotic, 5)];
        assert_eq!(effective_damage(15, &[DamageType::Necrotic], &table, true), 5);
    }

    #[test]
    fn test_temp_hp_absorbs_first() {
        let mut state = target();
        state.temp_hp = 5;

        let (new_state, result) = apply_damage(&state, 8, &[], &[], false);
        assert_eq!(new_state.temp_hp, 0);
        assert_eq!(new_state.damage_taken, 3);
        assert_eq!(result.absorbed_by_temp_hp, 5);
        assert_eq!(result.added_to_damage_taken, 3);

        // Input state untouched
        assert_eq!(state.temp_hp, 5);
        assert_eq!(state.damage_taken, 0);
    }

    #[test]
    fn test_temp_hp_covers_everything() {
        let mut state = target();
        state.temp_hp = 10;
        state.damage_taken = 4;

        let (new_state, result) = apply_damage(&state, 6, &[], &[], false);
        assert_eq!(new_state.temp_hp, 4);
        assert_eq!(new_state.damage_taken, 4);
        assert_eq!(result.added_to_damage_taken, 0);
    }

    #[test]
    fn test_immune_result_is_flagged() {
        let table = [DamageModifier::immune(DamageType::Psychic)];
        let (new_state, result) =
            apply_damage(&target(), 30, &[DamageType::Psychic], &table, false);
        assert!(result.was_immune());
        assert_eq!(result.effective_amount, 0);
        assert_eq!(new_state.damage_taken, 0);
    }

    proptest! {
        #[test]
        fn prop_empty_table_is_identity(raw in 0u32..10_000) {
            let (state, result) = apply_damage(&target(), raw, &[DamageType::Fire], &[], false);
            prop_assert_eq!(result.effective_amount, raw);
            prop_assert_eq!(state.damage_taken, raw);
        }

        #[test]
        fn prop_immunity_dominates(
            raw in 0u32..10_000,
            others in proptest::collection::vec(-50i32..50, 0..4),
        ) {
            let mut table: Vec<DamageModifier> = others
                .into_iter()
                .map(|v| DamageModifier {
                    damage_type: DamageType::Cold,
                    value: ModifierValue::Amount(v),
                })
                .collect();
            table.push(DamageModifier::immune(DamageType::Cold));
            prop_assert_eq!(effective_damage(raw, &[DamageType::Cold], &table, false), 0);
        }

        #[test]
        fn prop_never_exceeds_raw_plus_vulnerability(
            raw in 0u32..1_000,
            vuln in 0u32..20,
            temp in 0u32..50,
        ) {
            let table = [DamageModifier::vulnerable(DamageType::Acid, vuln)];
            let mut state = target();
            state.temp_hp = temp;
            let (new_state, result) = apply_damage(&state, raw, &[DamageType::Acid], &table, false);
            prop_assert_eq!(result.effective_amount, raw + vuln);
            prop_assert_eq!(
                result.absorbed_by_temp_hp + result.added_to_damage_taken,
                result.effective_amount
            );
            prop_assert_eq!(new_state.temp_hp, temp.saturating_sub(raw + vuln));
        }
    }
}
