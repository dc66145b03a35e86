//! Recharge rolls for spent powers

use super::{DiceRoller, RollState};
use crate::combatant::{CombatantId, CombatantState};
use crate::config::constants;
use roster_core::{PowerDefinition, PowerId};
use serde::{Deserialize, Serialize};

/// Resolved outcome of a recharge roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RechargeOutcome {
    Recharged,
    StillUsed,
}

/// Minimum d6 roll that recharges a power, read from its recharge text
///
/// The text is checked for the digits 6, 5, 4, 3 and 2 in that order and
/// every digit present overrides the previous match, so "Recharge 5-6"
/// gives 5 and "Recharge 6" gives 6. This is a textual scan, not a parse
/// of the range: any stray digit in the text takes part. `None` means the
/// power is not rollable.
// NOTE: kept as a literal scan; "Recharge 2 or 6" yields 2, not a range check.
pub fn recharge_threshold(spec: &str) -> Option<i32> {
    let mut threshold = None;
    for (digit, value) in [('6', 6), ('5', 5), ('4', 4), ('3', 3), ('2', 2)] {
        if spec.contains(digit) {
            threshold = Some(value);
        }
    }
    threshold
}

/// One used power awaiting a recharge roll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeEntry {
    pub power_id: PowerId,
    pub name: String,
    pub spec: String,
    pub threshold: i32,
    pub state: RollState,
}

/// What a single entry would do if committed now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechargeProposal {
    pub power_id: PowerId,
    pub roll: Option<i32>,
    pub outcome: Option<RechargeOutcome>,
}

/// Summary of a committed batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechargeReport {
    pub recharged: Vec<PowerId>,
    pub still_used: Vec<PowerId>,
    pub pending: Vec<PowerId>,
}

/// Recharge rolls for every rollable used power of one combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeBatch {
    pub combatant_id: CombatantId,
    entries: Vec<RechargeEntry>,
    /// Used powers that cannot be recharged by rolling
    not_rollable: Vec<PowerId>,
}

impl RechargeBatch {
    /// Collect the used powers of `combatant` that recharge on a roll
    ///
    /// Used powers missing from `powers` are skipped.
    pub fn new(combatant: &CombatantState, powers: &[PowerDefinition]) -> Self {
        let mut entries = Vec::new();
        let mut not_rollable = Vec::new();

        for power_id in combatant.used_powers() {
            let Some(power) = powers.iter().find(|p| &p.id == power_id) else {
                tracing::trace!(
                    combatant = %combatant.id,
                    power = %power_id,
                    "Used power not in power list"
                );
                continue;
            };
            match power
                .recharge_spec()
                .and_then(|spec| recharge_threshold(spec).map(|t| (spec, t)))
            {
                Some((spec, threshold)) => entries.push(RechargeEntry {
                    power_id: power_id.clone(),
                    name: power.name.clone(),
                    spec: spec.to_string(),
                    threshold,
                    state: RollState::Pending,
                }),
                None => not_rollable.push(power_id.clone()),
            }
        }

        RechargeBatch {
            combatant_id: combatant.id.clone(),
            entries,
            not_rollable,
        }
    }

    pub fn entries(&self) -> &[RechargeEntry] {
        &self.entries
    }

    pub fn not_rollable(&self) -> &[PowerId] {
        &self.not_rollable
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, id: &PowerId) -> Option<&mut RechargeEntry> {
        self.entries.iter_mut().find(|e| &e.power_id == id)
    }

    /// Roll 1d6 for one power
    pub fn roll(&mut self, id: &PowerId, dice: &mut impl DiceRoller) -> Option<i32> {
        let sides = constants().recharge.die_sides;
        let entry = self.entry_mut(id)?;
        Some(entry.state.roll(dice, sides))
    }

    /// Roll every entry still pending
    pub fn roll_pending(&mut self, dice: &mut impl DiceRoller) {
        let sides = constants().recharge.die_sides;
        for entry in self.entries.iter_mut().filter(|e| e.state.is_pending()) {
            entry.state.roll(dice, sides);
        }
    }

    /// Operator override: the power recharges
    pub fn force_recharge(&mut self, id: &PowerId) -> bool {
        self.set_state(id, RollState::ForcedSuccess)
    }

    /// Operator override: the power stays used
    pub fn force_fail(&mut self, id: &PowerId) -> bool {
        self.set_state(id, RollState::ForcedFailure)
    }

    fn set_state(&mut self, id: &PowerId, state: RollState) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.state = state;
                true
            }
            None => false,
        }
    }

    /// Nudge a rolled value without re-rolling
    pub fn adjust(&mut self, id: &PowerId, delta: i32) -> bool {
        let sides = constants().recharge.die_sides;
        match self.entry_mut(id) {
            Some(entry) => {
                entry.state.adjust(delta, sides);
                true
            }
            None => false,
        }
    }

    /// Proposals for every entry, in order of use
    pub fn proposals(&self) -> Vec<RechargeProposal> {
        self.entries
            .iter()
            .map(|e| RechargeProposal {
                power_id: e.power_id.clone(),
                roll: e.state.value(),
                outcome: e.state.succeeds(0, e.threshold).map(|ok| {
                    if ok {
                        RechargeOutcome::Recharged
                    } else {
                        RechargeOutcome::StillUsed
                    }
                }),
            })
            .collect()
    }

    /// Apply the batch: recharged powers leave the used set
    pub fn commit(&self, combatant: &CombatantState) -> (CombatantState, RechargeReport) {
        let mut new_combatant = combatant.clone();
        let mut report = RechargeReport::default();

        for proposal in self.proposals() {
            match proposal.outcome {
                Some(RechargeOutcome::Recharged) => {
                    new_combatant.refresh_power(&proposal.power_id);
                    report.recharged.push(proposal.power_id);
                }
                Some(RechargeOutcome::StillUsed) => report.still_used.push(proposal.power_id),
                None => report.pending.push(proposal.power_id),
            }
        }

        tracing::debug!(
            combatant = %combatant.id,
            recharged = report.recharged.len(),
            still_used = report.still_used.len(),
            "Recharge rolls committed"
        );

        (new_combatant, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ensure_constants_initialized;
    use crate::rolls::ScriptedDice;
    use roster_core::PowerUsage;

    fn powers() -> Vec<PowerDefinition> {
        vec![
            PowerDefinition::new("breath", "Breath Weapon")
                .with_usage(PowerUsage::Recharge("Recharge 5-6".to_string())),
            PowerDefinition::new("tail", "Tail Slap")
                .with_usage(PowerUsage::Recharge("Recharge 6".to_string())),
            PowerDefinition::new("frenzy", "Bloodied Frenzy")
                .with_usage(PowerUsage::Recharge("Recharge when first bloodied".to_string())),
            PowerDefinition::new("fear", "Frightful Presence").with_usage(PowerUsage::Encounter),
        ]
    }

    fn dragon() -> CombatantState {
        ensure_constants_initialized();
        let mut state = CombatantState::new("dragon", "Young Red Dragon");
        state.mark_power_used("breath");
        state.mark_power_used("tail");
        state.mark_power_used("frenzy");
        state.mark_power_used("fear");
        state.mark_power_used("unknown");
        state
    }

    #[test]
    fn test_threshold_scan() {
        assert_eq!(recharge_threshold("Recharge 5-6"), Some(5));
        assert_eq!(recharge_threshold("Recharge 6"), Some(6));
        assert_eq!(recharge_threshold("Recharge 4-6"), Some(4));
        assert_eq!(recharge_threshold("Recharge when bloodied"), None);
        assert_eq!(recharge_threshold("Recharge 1"), None);
        assert_eq!(recharge_threshold(""), None);
    }

    #[test]
    fn test_scan_is_textual() {
        // Lowest listed digit wins, whatever the surrounding words
        assert_eq!(recharge_threshold("Recharge 2 or 6"), Some(2));
        assert_eq!(recharge_threshold("Recharge 6 (3 uses)"), Some(3));
    }

    #[test]
    fn test_batch_skips_unrollable_and_unknown() {
        let batch = RechargeBatch::new(&dragon(), &powers());
        let ids: Vec<&str> = batch.entries().iter().map(|e| e.power_id.0.as_str()).collect();
        assert_eq!(ids, vec!["breath", "tail"]);
        assert_eq!(
            batch.not_rollable(),
            &[PowerId::from("frenzy"), PowerId::from("fear")]
        );
    }

    #[test]
    fn test_recharge_boundary() {
        let state = dragon();
        let breath = PowerId::from("breath");

        let mut batch = RechargeBatch::new(&state, &powers());
        batch.roll(&breath, &mut ScriptedDice::new([5])).unwrap();
        assert_eq!(batch.proposals()[0].outcome, Some(RechargeOutcome::Recharged));

        batch.roll(&breath, &mut ScriptedDice::new([4])).unwrap();
        assert_eq!(batch.proposals()[0].outcome, Some(RechargeOutcome::StillUsed));
    }

    #[test]
    fn test_commit_refreshes_recharged_powers() {
        let state = dragon();
        let mut batch = RechargeBatch::new(&state, &powers());
        // breath 5 (>= 5), tail 5 (< 6)
        batch.roll_pending(&mut ScriptedDice::new([5, 5]));

        let (new_state, report) = batch.commit(&state);
        assert_eq!(report.recharged, vec![PowerId::from("breath")]);
        assert_eq!(report.still_used, vec![PowerId::from("tail")]);
        assert!(!new_state.is_power_used(&PowerId::from("breath")));
        assert!(new_state.is_power_used(&PowerId::from("tail")));
        assert!(new_state.is_power_used(&PowerId::from("frenzy")));
        assert!(state.is_power_used(&PowerId::from("breath")));
    }

    #[test]
    fn test_overrides() {
        let state = dragon();
        let tail = PowerId::from("tail");
        let mut batch = RechargeBatch::new(&state, &powers());

        assert!(batch.force_recharge(&tail));
        let (new_state, report) = batch.commit(&state);
        assert_eq!(report.recharged, vec![tail.clone()]);
        assert_eq!(report.pending, vec![PowerId::from("breath")]);
        assert!(!new_state.is_power_used(&tail));

        assert!(!batch.force_fail(&PowerId::from("fear")));
    }

    #[test]
    fn test_adjust_clamps_to_die() {
        let state = dragon();
        let tail = PowerId::from("tail");
        let mut batch = RechargeBatch::new(&state, &powers());
        batch.roll(&tail, &mut ScriptedDice::new([5])).unwrap();
        batch.adjust(&tail, 4);
        assert_eq!(batch.proposals()[1].roll, Some(6));
        assert_eq!(batch.proposals()[1].outcome, Some(RechargeOutcome::Recharged));
    }
}
