//! Encounter session - the single owner of every combatant in a fight
//!
//! Wires the resolvers together against each combatant's backing profile.
//! Lookups by an unknown id leave the session untouched and return `None`.

use crate::attack::{attack_with_power, roll_damage, AttackResult};
use crate::combatant::{CombatantId, CombatantState, ConditionId, HealthStatus, OngoingCondition};
use crate::damage::{self, DamageResult};
use crate::initiative::{GroupKey, InitiativeTracker};
use crate::ongoing::{self, OngoingDamageResult};
use crate::rolls::recharge::{RechargeBatch, RechargeReport};
use crate::rolls::saves::{SaveReport, SavingThrowBatch};
use crate::rolls::DiceRoller;
use roster_core::{CreatureProfile, DamageType, PowerId, PowerUsage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What happened when a combatant's turn started
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnStart {
    /// Conditions that ended, with the combatant that carried them
    pub expired: Vec<(CombatantId, OngoingCondition)>,
    pub ongoing_damage: OngoingDamageResult,
    pub regenerated: u32,
}

/// What happened when a combatant's turn ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEnd {
    pub expired: Vec<(CombatantId, OngoingCondition)>,
    /// Saving throws owed, not yet rolled
    pub saves: SavingThrowBatch,
}

/// Attack roll plus the damage it dealt on a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub attack: AttackResult,
    pub damage: Option<DamageResult>,
}

#[derive(Debug, Clone, Default)]
pub struct EncounterSession {
    states: Vec<CombatantState>,
    profiles: HashMap<CombatantId, CreatureProfile>,
    initiative: InitiativeTracker,
}

impl EncounterSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a combatant backed by `profile`; returns false if the id is taken
    pub fn add_participant(
        &mut self,
        state: CombatantState,
        profile: CreatureProfile,
        group: impl Into<GroupKey>,
    ) -> bool {
        if self.profiles.contains_key(&state.id) {
            tracing::warn!(combatant = %state.id, "Combatant already in encounter");
            return false;
        }
        self.initiative.join(state.id.clone(), group);
        self.profiles.insert(state.id.clone(), profile);
        self.states.push(state);
        true
    }

    pub fn remove_participant(&mut self, id: &CombatantId) -> Option<CombatantState> {
        let index = self.states.iter().position(|s| &s.id == id)?;
        self.profiles.remove(id);
        self.initiative.leave(id);
        Some(self.states.remove(index))
    }

    pub fn state(&self, id: &CombatantId) -> Option<&CombatantState> {
        self.states.iter().find(|s| &s.id == id)
    }

    pub fn profile(&self, id: &CombatantId) -> Option<&CreatureProfile> {
        self.profiles.get(id)
    }

    /// Every combatant, in the order they joined
    pub fn states(&self) -> &[CombatantState] {
        &self.states
    }

    pub fn initiative(&self) -> &InitiativeTracker {
        &self.initiative
    }

    pub fn health_status(&self, id: &CombatantId) -> Option<HealthStatus> {
        let state = self.state(id)?;
        let profile = self.profiles.get(id)?;
        Some(state.health_status(profile))
    }

    fn entry_mut(&mut self, id: &CombatantId) -> Option<(&mut CombatantState, &CreatureProfile)> {
        let profile = self.profiles.get(id);
        let state = self.states.iter_mut().find(|s| &s.id == id);
        match (state, profile) {
            (Some(state), Some(profile)) => Some((state, profile)),
            _ => {
                tracing::warn!(combatant = %id, "Unknown combatant");
                None
            }
        }
    }

    // Initiative

    /// Set a score for the combatant's whole group; `None` clears it
    pub fn set_initiative(&mut self, id: &CombatantId, score: Option<i32>) -> Option<usize> {
        if !self.profiles.contains_key(id) {
            tracing::warn!(combatant = %id, "Unknown combatant");
            return None;
        }
        Some(self.initiative.set_score(&mut self.states, id, score))
    }

    pub fn set_group_initiative(&mut self, group: &GroupKey, score: Option<i32>) -> usize {
        self.initiative.set_group_score(&mut self.states, group, score)
    }

    /// Roll for the combatant's group using its profile's initiative bonus
    pub fn roll_initiative(&mut self, id: &CombatantId, dice: &mut impl DiceRoller) -> Option<i32> {
        let bonus = self.profiles.get(id)?.initiative_bonus;
        let group = self.initiative.group_of(id)?.clone();
        Some(self.initiative.roll_group(&mut self.states, &group, bonus, dice))
    }

    /// Roll once for every group that still has an Unset member
    pub fn roll_unrolled(&mut self, dice: &mut impl DiceRoller) {
        for id in self.initiative.unrolled(&self.states) {
            let still_unset = self.state(&id).is_some_and(|s| s.initiative.is_none());
            if still_unset {
                self.roll_initiative(&id, dice);
            }
        }
    }

    pub fn turn_order(&self) -> Vec<CombatantId> {
        self.initiative.turn_order(&self.states)
    }

    pub fn round(&self) -> u32 {
        self.initiative.round()
    }

    pub fn current(&self) -> Option<&CombatantId> {
        self.initiative.current()
    }

    /// Start round 1; returns who acts first
    pub fn begin(&mut self) -> Option<CombatantId> {
        self.initiative.begin(&self.states)
    }

    pub fn advance_turn(&mut self) -> Option<CombatantId> {
        self.initiative.advance(&self.states)
    }

    // Hit points

    /// Apply damage using the profile's modifiers, active modifier conditions
    /// and halving for insubstantial creatures
    pub fn apply_damage(
        &mut self,
        id: &CombatantId,
        raw_amount: u32,
        damage_types: &[DamageType],
    ) -> Option<DamageResult> {
        let (state, profile) = self.entry_mut(id)?;
        let table = ongoing::effective_modifier_table(state, &profile.damage_modifiers);
        let (new_state, result) =
            damage::apply_damage(state, raw_amount, damage_types, &table, profile.insubstantial);
        *state = new_state;
        Some(result)
    }

    pub fn heal(&mut self, id: &CombatantId, amount: u32) -> Option<u32> {
        let (state, _) = self.entry_mut(id)?;
        Some(state.heal(amount))
    }

    pub fn grant_temp_hp(&mut self, id: &CombatantId, amount: u32) -> Option<bool> {
        let (state, _) = self.entry_mut(id)?;
        Some(state.grant_temp_hp(amount))
    }

    // Conditions

    /// Attach a condition stamped with the current round
    ///
    /// Turn-bounded conditions end at their owner's next turn: later this
    /// round if the owner has not acted yet, otherwise next round.
    pub fn add_condition(
        &mut self,
        id: &CombatantId,
        condition: OngoingCondition,
    ) -> Option<ConditionId> {
        if !self.profiles.contains_key(id) {
            tracing::warn!(combatant = %id, "Unknown combatant");
            return None;
        }
        let round = self.initiative.round();
        let owner = condition.owner.clone().unwrap_or_else(|| id.clone());
        let boundary_round = if round > 0 && self.has_acted(&owner) {
            round.saturating_add(1)
        } else {
            round.max(1)
        };

        let mut condition = condition.ending_in_round(boundary_round);
        condition.round = round;
        let (state, _) = self.entry_mut(id)?;
        Some(ongoing::add(state, condition))
    }

    /// Whether `id` has started its turn this round
    ///
    /// Combatants without a place in the turn order count as having acted.
    fn has_acted(&self, id: &CombatantId) -> bool {
        let order = self.turn_order();
        let position = order.iter().position(|c| c == id);
        let current = self.current().and_then(|c| order.iter().position(|o| o == c));
        match (position, current) {
            (Some(position), Some(current)) => position <= current,
            _ => true,
        }
    }

    pub fn remove_condition(
        &mut self,
        id: &CombatantId,
        condition: ConditionId,
    ) -> Option<OngoingCondition> {
        let (state, _) = self.entry_mut(id)?;
        ongoing::remove(state, condition)
    }

    /// Expire start-of-turn conditions, then ongoing damage, then regeneration
    ///
    /// Expiry covers every combatant, since a condition can be timed off
    /// another creature's turn. Regeneration does nothing once dead.
    pub fn start_turn(&mut self, id: &CombatantId) -> Option<TurnStart> {
        self.entry_mut(id)?;
        let round = self.initiative.round();

        let mut expired = Vec::new();
        for state in self.states.iter_mut() {
            for condition in ongoing::expire_at_turn_start(state, id, round) {
                expired.push((state.id.clone(), condition));
            }
        }

        let (state, profile) = self.entry_mut(id)?;
        let table = ongoing::effective_modifier_table(state, &profile.damage_modifiers);
        let (new_state, ongoing_damage) = ongoing::apply_ongoing_damage(state, &table);
        *state = new_state;

        let regeneration = ongoing::total_regeneration(state);
        let regenerated = if state.health_status(profile) == HealthStatus::Dead {
            0
        } else {
            state.heal(regeneration)
        };

        tracing::debug!(
            combatant = %id,
            round,
            expired = expired.len(),
            ongoing = ongoing_damage.effective_total,
            regenerated,
            "Turn started"
        );

        Some(TurnStart {
            expired,
            ongoing_damage,
            regenerated,
        })
    }

    /// Expire end-of-turn conditions and build the saving throw batch
    pub fn end_turn(&mut self, id: &CombatantId) -> Option<TurnEnd> {
        self.entry_mut(id)?;
        let round = self.initiative.round();

        let mut expired = Vec::new();
        for state in self.states.iter_mut() {
            for condition in ongoing::expire_at_turn_end(state, id, round) {
                expired.push((state.id.clone(), condition));
            }
        }

        let (state, profile) = self.entry_mut(id)?;
        let saves = SavingThrowBatch::new(state, profile.role);

        tracing::debug!(
            combatant = %id,
            round,
            expired = expired.len(),
            saves = saves.entries().len(),
            "Turn ended"
        );

        Some(TurnEnd { expired, saves })
    }

    pub fn commit_saves(&mut self, batch: &SavingThrowBatch) -> Option<SaveReport> {
        let (state, _) = self.entry_mut(&batch.combatant_id)?;
        let (new_state, report) = batch.commit(state);
        *state = new_state;
        Some(report)
    }

    // Powers

    pub fn recharge_batch(&self, id: &CombatantId) -> Option<RechargeBatch> {
        let state = self.state(id)?;
        let profile = self.profiles.get(id)?;
        Some(RechargeBatch::new(state, &profile.powers))
    }

    pub fn commit_recharge(&mut self, batch: &RechargeBatch) -> Option<RechargeReport> {
        let (state, _) = self.entry_mut(&batch.combatant_id)?;
        let (new_state, report) = batch.commit(state);
        *state = new_state;
        Some(report)
    }

    /// Spend a power; `Some(false)` if it is already used
    ///
    /// At-will powers are never recorded as used.
    pub fn use_power(&mut self, id: &CombatantId, power: &PowerId) -> Option<bool> {
        let (state, profile) = self.entry_mut(id)?;
        let Some(definition) = profile.power(power) else {
            tracing::warn!(combatant = %id, power = %power, "Unknown power");
            return None;
        };
        if definition.usage == PowerUsage::AtWill {
            return Some(true);
        }
        Some(state.mark_power_used(power.clone()))
    }

    /// Roll `power` from `attacker` against `target`, applying damage on a hit
    ///
    /// The power is not marked used; call [`EncounterSession::use_power`] for that.
    /// `None` when either combatant or the power is unknown, or the power has
    /// no attack roll.
    pub fn attack(
        &mut self,
        attacker: &CombatantId,
        power: &PowerId,
        target: &CombatantId,
        dice: &mut impl DiceRoller,
    ) -> Option<AttackOutcome> {
        let definition = self.profiles.get(attacker)?.power(power)?.clone();
        let target_state = self.state(target)?;
        let target_profile = self.profiles.get(target)?;

        let attack = attack_with_power(&definition, target_profile, target_state, dice)?;
        let damage = match (&definition.damage, attack.hit) {
            (Some(expression), true) => {
                let amount = roll_damage(expression, attack.critical, dice);
                self.apply_damage(target, amount, &definition.damage_types)
            }
            _ => None,
        };

        tracing::debug!(
            attacker = %attacker,
            target = %target,
            power = %power,
            hit = attack.hit,
            damage = damage.map(|d| d.effective_amount),
            "Attack made"
        );

        Some(AttackOutcome { attack, damage })
    }

    /// Strip every condition and reset the round counter; returns conditions removed
    pub fn end_encounter(&mut self) -> usize {
        let removed = self.states.iter_mut().map(ongoing::end_encounter).sum();
        self.initiative.reset();
        tracing::debug!(removed, "Encounter ended");
        removed
    }
}
