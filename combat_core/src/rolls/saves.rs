//! Saving throws against save-ends conditions
//!
//! Two phases: build a batch and roll (or override) each entry to show what
//! would happen, then commit the batch to remove the conditions that were saved.

use super::{DiceRoller, RollState};
use crate::combatant::{CombatantId, CombatantState, ConditionId, OngoingCondition};
use crate::config::constants;
use crate::ongoing;
use roster_core::RoleKind;
use serde::{Deserialize, Serialize};

/// Resolved outcome of a saving throw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveOutcome {
    /// Condition will be removed on commit
    Saved,
    /// Condition persists
    Failed,
}

/// Bonus to every saving throw from the creature's role
pub fn global_save_modifier(role: RoleKind) -> i32 {
    let saves = &constants().saves;
    match role {
        RoleKind::Elite => saves.elite_bonus,
        RoleKind::Solo => saves.solo_bonus,
        RoleKind::Normal | RoleKind::Minion => 0,
    }
}

/// One save-ends condition awaiting a saving throw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEntry {
    pub condition_id: ConditionId,
    pub description: String,
    pub condition_modifier: i32,
    pub state: RollState,
}

/// What a single entry would do if committed now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveProposal {
    pub condition_id: ConditionId,
    pub roll: Option<i32>,
    /// Roll plus condition and global modifiers; `None` unless rolled
    pub total: Option<i32>,
    /// `None` while pending
    pub outcome: Option<SaveOutcome>,
}

/// Summary of a committed batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveReport {
    pub saved: Vec<ConditionId>,
    pub failed: Vec<ConditionId>,
    pub pending: Vec<ConditionId>,
    /// Conditions actually removed by this commit
    pub removed: Vec<OngoingCondition>,
}

/// Saving throws for every save-ends condition on one combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingThrowBatch {
    pub combatant_id: CombatantId,
    pub global_modifier: i32,
    entries: Vec<SaveEntry>,
}

impl SavingThrowBatch {
    /// Collect the save-ends conditions of `combatant`
    pub fn new(combatant: &CombatantState, role: RoleKind) -> Self {
        let entries = combatant
            .conditions
            .iter()
            .filter_map(|c| {
                c.save_modifier().map(|modifier| SaveEntry {
                    condition_id: c.id,
                    description: c.kind.to_string(),
                    condition_modifier: modifier,
                    state: RollState::Pending,
                })
            })
            .collect();

        SavingThrowBatch {
            combatant_id: combatant.id.clone(),
            global_modifier: global_save_modifier(role),
            entries,
        }
    }

    pub fn entries(&self) -> &[SaveEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, id: ConditionId) -> Option<&mut SaveEntry> {
        self.entries.iter_mut().find(|e| e.condition_id == id)
    }

    /// Roll 1d20 for one entry
    pub fn roll(&mut self, id: ConditionId, dice: &mut impl DiceRoller) -> Option<i32> {
        let sides = constants().saves.die_sides;
        let entry = self.entry_mut(id)?;
        Some(entry.state.roll(dice, sides))
    }

    /// Roll every entry that has not been rolled or overridden yet
    pub fn roll_pending(&mut self, dice: &mut impl DiceRoller) {
        let sides = constants().saves.die_sides;
        for entry in self.entries.iter_mut().filter(|e| e.state.is_pending()) {
            entry.state.roll(dice, sides);
        }
    }

    /// Operator override: the condition is saved
    pub fn force_save(&mut self, id: ConditionId) -> bool {
        self.set_state(id, RollState::ForcedSuccess)
    }

    /// Operator override: the condition persists
    pub fn force_fail(&mut self, id: ConditionId) -> bool {
        self.set_state(id, RollState::ForcedFailure)
    }

    fn set_state(&mut self, id: ConditionId, state: RollState) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.state = state;
                true
            }
            None => false,
        }
    }

    /// Nudge a rolled value without re-rolling
    pub fn adjust(&mut self, id: ConditionId, delta: i32) -> bool {
        let sides = constants().saves.die_sides;
        match self.entry_mut(id) {
            Some(entry) => {
                entry.state.adjust(delta, sides);
                true
            }
            None => false,
        }
    }

    fn propose(&self, entry: &SaveEntry) -> SaveProposal {
        let bonus = entry.condition_modifier.saturating_add(self.global_modifier);
        let threshold = constants().saves.success_threshold;
        SaveProposal {
            condition_id: entry.condition_id,
            roll: entry.state.value(),
            total: entry.state.value().map(|v| v.saturating_add(bonus)),
            outcome: entry.state.succeeds(bonus, threshold).map(|saved| {
                if saved {
                    SaveOutcome::Saved
                } else {
                    SaveOutcome::Failed
                }
            }),
        }
    }

    /// Proposal for one entry
    pub fn proposal(&self, id: ConditionId) -> Option<SaveProposal> {
        self.entries
            .iter()
            .find(|e| e.condition_id == id)
            .map(|e| self.propose(e))
    }

    /// Proposals for every entry, in condition order
    pub fn proposals(&self) -> Vec<SaveProposal> {
        self.entries.iter().map(|e| self.propose(e)).collect()
    }

    /// Apply the batch: saved conditions are removed, the rest stay attached
    ///
    /// Removal is by condition id, so committing the same batch again is a no-op.
    pub fn commit(&self, combatant: &CombatantState) -> (CombatantState, SaveReport) {
        let mut new_combatant = combatant.clone();
        let mut report = SaveReport::default();

        for proposal in self.proposals() {
            match proposal.outcome {
                Some(SaveOutcome::Saved) => {
                    report.saved.push(proposal.condition_id);
                    let removed = ongoing::remove(&mut new_combatant, proposal.condition_id);
                    if let Some(removed) = removed {
                        report.removed.push(removed);
                    }
                }
                Some(SaveOutcome::Failed) => report.failed.push(proposal.condition_id),
                None => report.pending.push(proposal.condition_id),
            }
        }

        tracing::debug!(
            combatant = %combatant.id,
            saved = report.saved.len(),
            failed = report.failed.len(),
            pending = report.pending.len(),
            removed = report.removed.len(),
            "Saving throws committed"
        );

        (new_combatant, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::ConditionDuration;
    use crate::config::ensure_constants_initialized;
    use crate::rolls::ScriptedDice;
    use roster_core::DamageType;

    fn setup() -> (CombatantState, ConditionId, ConditionId) {
        ensure_constants_initialized();
        let mut state = CombatantState::new("dragon", "Young Black Dragon");
        let acid = ongoing::add(
            &mut state,
            OngoingCondition::ongoing_damage(
                Some(DamageType::Acid),
                5,
                ConditionDuration::SaveEnds { modifier: 2 },
                1,
            ),
        );
        ongoing::add(
            &mut state,
            OngoingCondition::status("Prone", ConditionDuration::UntilStartOfNextTurn, 1),
        );
        let blind = ongoing::add(
            &mut state,
            OngoingCondition::status("Blinded", ConditionDuration::SaveEnds { modifier: 0 }, 1),
        );
        (state, acid, blind)
    }

    #[test]
    fn test_batch_only_includes_save_ends() {
        let (state, acid, blind) = setup();
        let batch = SavingThrowBatch::new(&state, RoleKind::Normal);
        let ids: Vec<ConditionId> = batch.entries().iter().map(|e| e.condition_id).collect();
        assert_eq!(ids, vec![acid, blind]);
        assert!(batch.proposals().iter().all(|p| p.outcome.is_none()));
    }

    #[test]
    fn test_global_modifier_by_role() {
        ensure_constants_initialized();
        assert_eq!(global_save_modifier(RoleKind::Normal), 0);
        assert_eq!(global_save_modifier(RoleKind::Minion), 0);
        assert_eq!(global_save_modifier(RoleKind::Elite), 2);
        assert_eq!(global_save_modifier(RoleKind::Solo), 5);
    }

    #[test]
    fn test_save_boundary() {
        let (state, acid, blind) = setup();
        let mut batch = SavingThrowBatch::new(&state, RoleKind::Normal);
        // acid: 8 + 2 = 10 saves; blind: 9 + 0 fails
        let mut dice = ScriptedDice::new([8, 9]);
        batch.roll_pending(&mut dice);

        let acid_proposal = batch.proposal(acid).unwrap();
        assert_eq!(acid_proposal.total, Some(10));
        assert_eq!(acid_proposal.outcome, Some(SaveOutcome::Saved));

        let blind_proposal = batch.proposal(blind).unwrap();
        assert_eq!(blind_proposal.total, Some(9));
        assert_eq!(blind_proposal.outcome, Some(SaveOutcome::Failed));
    }

    #[test]
    fn test_solo_bonus_turns_failure_into_save() {
        let (state, _, blind) = setup();
        let mut batch = SavingThrowBatch::new(&state, RoleKind::Solo);
        batch.roll(blind, &mut ScriptedDice::new([5])).unwrap();
        assert_eq!(batch.proposal(blind).unwrap().total, Some(10));
        assert_eq!(batch.proposal(blind).unwrap().outcome, Some(SaveOutcome::Saved));
    }

    #[test]
    fn test_proposals_do_not_mutate_until_commit() {
        let (state, acid, blind) = setup();
        let mut batch = SavingThrowBatch::new(&state, RoleKind::Normal);
        batch.roll_pending(&mut ScriptedDice::new([15, 2]));
        assert_eq!(state.conditions.len(), 3);

        let (new_state, report) = batch.commit(&state);
        assert_eq!(report.saved, vec![acid]);
        assert_eq!(report.failed, vec![blind]);
        assert_eq!(new_state.conditions.len(), 2);
        assert!(new_state.condition(acid).is_none());
        assert!(new_state.condition(blind).is_some());
    }

    #[test]
    fn test_commit_is_idempotent() {
        let (state, acid, _) = setup();
        let mut batch = SavingThrowBatch::new(&state, RoleKind::Normal);
        batch.force_save(acid);

        let (once, first) = batch.commit(&state);
        let (twice, second) = batch.commit(&once);
        assert_eq!(first.removed.len(), 1);
        assert!(second.removed.is_empty());
        assert_eq!(once, twice);
        assert_eq!(twice.conditions.len(), 2);
    }

    #[test]
    fn test_overrides_and_adjustments() {
        let (state, acid, blind) = setup();
        let mut batch = SavingThrowBatch::new(&state, RoleKind::Normal);

        batch.force_fail(acid);
        assert_eq!(batch.proposal(acid).unwrap().outcome, Some(SaveOutcome::Failed));
        assert_eq!(batch.proposal(acid).unwrap().total, None);

        batch.roll(blind, &mut ScriptedDice::new([9])).unwrap();
        batch.adjust(blind, 1);
        assert_eq!(batch.proposal(blind).unwrap().outcome, Some(SaveOutcome::Saved));
        batch.adjust(blind, -30);
        assert_eq!(batch.proposal(blind).unwrap().roll, Some(0));

        assert!(!batch.force_save(ConditionId(999)));
        assert!(batch.roll(ConditionId(999), &mut ScriptedDice::new([10])).is_none());
    }

    #[test]
    fn test_huge_save_modifier_saturates() {
        ensure_constants_initialized();
        let mut state = CombatantState::new("tarrasque", "Tarrasque");
        let id = ongoing::add(
            &mut state,
            OngoingCondition::status(
                "Stunned",
                ConditionDuration::SaveEnds { modifier: i32::MAX },
                1,
            ),
        );
        let mut batch = SavingThrowBatch::new(&state, RoleKind::Solo);
        batch.roll(id, &mut ScriptedDice::new([3])).unwrap();

        let proposal = batch.proposal(id).unwrap();
        assert_eq!(proposal.total, Some(i32::MAX));
        assert_eq!(proposal.outcome, Some(SaveOutcome::Saved));
    }

    #[test]
    fn test_pending_entries_survive_commit() {
        let (state, acid, blind) = setup();
        let mut batch = SavingThrowBatch::new(&state, RoleKind::Normal);
        batch.force_save(blind);

        let (new_state, report) = batch.commit(&state);
        assert_eq!(report.pending, vec![acid]);
        assert!(new_state.condition(acid).is_some());
        assert!(new_state.condition(blind).is_none());
    }
}
