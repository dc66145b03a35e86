//! Initiative - grouped scores, turn order and the round counter

use crate::combatant::{CombatantId, CombatantState};
use crate::rolls::DiceRoller;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key shared by combatants that act on one initiative, e.g. all "Goblin Cutter"s
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(pub String);

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey(s.to_string())
    }
}

impl From<String> for GroupKey {
    fn from(s: String) -> Self {
        GroupKey(s)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tracks group membership and whose turn it is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitiativeTracker {
    members: Vec<(CombatantId, GroupKey)>,
    round: u32,
    current: Option<CombatantId>,
}

impl InitiativeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a combatant in a group, replacing any previous membership
    pub fn join(&mut self, id: impl Into<CombatantId>, group: impl Into<GroupKey>) {
        let id = id.into();
        let group = group.into();
        match self.members.iter_mut().find(|(m, _)| *m == id) {
            Some(entry) => entry.1 = group,
            None => self.members.push((id, group)),
        }
    }

    pub fn leave(&mut self, id: &CombatantId) {
        self.members.retain(|(m, _)| m != id);
        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
    }

    pub fn group_of(&self, id: &CombatantId) -> Option<&GroupKey> {
        self.members.iter().find(|(m, _)| m == id).map(|(_, g)| g)
    }

    /// Members of a group, in join order
    pub fn members(&self, group: &GroupKey) -> Vec<&CombatantId> {
        self.members
            .iter()
            .filter(|(_, g)| g == group)
            .map(|(m, _)| m)
            .collect()
    }

    /// Set one score for every member of `group`; returns how many were updated
    ///
    /// `None` resets the group to Unset.
    pub fn set_group_score(
        &self,
        combatants: &mut [CombatantState],
        group: &GroupKey,
        score: Option<i32>,
    ) -> usize {
        let mut updated = 0;
        for combatant in combatants.iter_mut() {
            if self.group_of(&combatant.id) == Some(group) {
                combatant.initiative = score;
                updated += 1;
            }
        }
        tracing::debug!(group = %group, ?score, updated, "Group initiative set");
        updated
    }

    /// Set a combatant's score, propagating to the rest of its group
    pub fn set_score(
        &self,
        combatants: &mut [CombatantState],
        id: &CombatantId,
        score: Option<i32>,
    ) -> usize {
        match self.group_of(id) {
            Some(group) => self.set_group_score(combatants, group, score),
            None => match combatants.iter_mut().find(|c| &c.id == id) {
                Some(combatant) => {
                    combatant.initiative = score;
                    1
                }
                None => 0,
            },
        }
    }

    /// Roll 1d20 + `bonus` once for the whole group
    pub fn roll_group(
        &self,
        combatants: &mut [CombatantState],
        group: &GroupKey,
        bonus: i32,
        dice: &mut impl DiceRoller,
    ) -> i32 {
        let score = dice.die(20).saturating_add(bonus);
        self.set_group_score(combatants, group, Some(score));
        score
    }

    /// Combatants that have not rolled yet
    pub fn unrolled(&self, combatants: &[CombatantState]) -> Vec<CombatantId> {
        combatants
            .iter()
            .filter(|c| c.initiative.is_none())
            .map(|c| c.id.clone())
            .collect()
    }

    /// Highest score first; Unset combatants are left out
    ///
    /// Ties keep the order of `combatants`.
    pub fn turn_order(&self, combatants: &[CombatantState]) -> Vec<CombatantId> {
        let mut scored: Vec<(i32, &CombatantId)> = combatants
            .iter()
            .filter_map(|c| c.initiative.map(|score| (score, &c.id)))
            .collect();
        // sort_by is stable
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, id)| id.clone()).collect()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn current(&self) -> Option<&CombatantId> {
        self.current.as_ref()
    }

    /// Start round 1 with the highest initiative
    pub fn begin(&mut self, combatants: &[CombatantState]) -> Option<CombatantId> {
        self.round = 1;
        self.current = self.turn_order(combatants).into_iter().next();
        self.current.clone()
    }

    /// Back to round 0 with nobody acting; scores and groups are kept
    pub fn reset(&mut self) {
        self.round = 0;
        self.current = None;
    }

    /// Move to the next combatant, starting a new round after the last one
    pub fn advance(&mut self, combatants: &[CombatantState]) -> Option<CombatantId> {
        let order = self.turn_order(combatants);
        if order.is_empty() {
            self.current = None;
            return None;
        }
        if self.round == 0 {
            self.round = 1;
        }

        let next_index = match self
            .current
            .as_ref()
            .and_then(|c| order.iter().position(|id| id == c))
        {
            Some(i) if i + 1 < order.len() => i + 1,
            Some(_) => {
                self.round += 1;
                0
            }
            None => 0,
        };

        self.current = Some(order[next_index].clone());
        tracing::debug!(round = self.round, current = %order[next_index], "Turn advanced");
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rolls::ScriptedDice;

    fn roster() -> (InitiativeTracker, Vec<CombatantState>) {
        let mut tracker = InitiativeTracker::new();
        let combatants = vec![
            CombatantState::new("goblin-1", "Goblin Cutter"),
            CombatantState::new("fighter", "Fighter"),
            CombatantState::new("goblin-2", "Goblin Cutter"),
            CombatantState::new("wizard", "Wizard"),
        ];
        tracker.join("goblin-1", "Goblin Cutter");
        tracker.join("goblin-2", "Goblin Cutter");
        tracker.join("fighter", "Fighter");
        tracker.join("wizard", "Wizard");
        (tracker, combatants)
    }

    #[test]
    fn test_group_score_propagates() {
        let (tracker, mut combatants) = roster();
        let goblins = GroupKey::from("Goblin Cutter");
        let updated = tracker.set_group_score(&mut combatants, &goblins, Some(14));
        assert_eq!(updated, 2);
        assert_eq!(combatants[0].initiative, Some(14));
        assert_eq!(combatants[2].initiative, Some(14));
        assert_eq!(combatants[1].initiative, None);
    }

    #[test]
    fn test_set_score_on_member_updates_group() {
        let (tracker, mut combatants) = roster();
        tracker.set_score(&mut combatants, &CombatantId::from("goblin-2"), Some(9));
        assert_eq!(combatants[0].initiative, Some(9));

        // Ungrouped combatants only update themselves
        let mut loner = vec![CombatantState::new("trap", "Pit Trap")];
        assert_eq!(tracker.set_score(&mut loner, &CombatantId::from("trap"), Some(0)), 1);
        assert_eq!(loner[0].initiative, Some(0));
    }

    #[test]
    fn test_unset_is_excluded_and_distinct_from_zero() {
        let (tracker, mut combatants) = roster();
        tracker.set_score(&mut combatants, &CombatantId::from("fighter"), Some(0));

        assert_eq!(tracker.turn_order(&combatants), vec![CombatantId::from("fighter")]);
        assert_eq!(
            tracker.unrolled(&combatants),
            vec![
                CombatantId::from("goblin-1"),
                CombatantId::from("goblin-2"),
                CombatantId::from("wizard")
            ]
        );
    }

    #[test]
    fn test_turn_order_descending_with_stable_ties() {
        let (tracker, mut combatants) = roster();
        tracker.set_group_score(&mut combatants, &GroupKey::from("Goblin Cutter"), Some(12));
        tracker.set_score(&mut combatants, &CombatantId::from("fighter"), Some(12));
        tracker.set_score(&mut combatants, &CombatantId::from("wizard"), Some(18));

        let order = tracker.turn_order(&combatants);
        let ids: Vec<&str> = order.iter().map(|id| id.0.as_str()).collect();
        assert_eq!(ids, vec!["wizard", "goblin-1", "fighter", "goblin-2"]);
    }

    #[test]
    fn test_roll_group() {
        let (tracker, mut combatants) = roster();
        let score = tracker.roll_group(
            &mut combatants,
            &GroupKey::from("Goblin Cutter"),
            3,
            &mut ScriptedDice::new([11]),
        );
        assert_eq!(score, 14);
        assert_eq!(combatants[2].initiative, Some(14));
    }

    #[test]
    fn test_advance_wraps_into_next_round() {
        let (mut tracker, mut combatants) = roster();
        tracker.set_score(&mut combatants, &CombatantId::from("fighter"), Some(20));
        tracker.set_score(&mut combatants, &CombatantId::from("wizard"), Some(10));

        assert_eq!(tracker.begin(&combatants), Some(CombatantId::from("fighter")));
        assert_eq!(tracker.round(), 1);
        assert_eq!(tracker.advance(&combatants), Some(CombatantId::from("wizard")));
        assert_eq!(tracker.advance(&combatants), Some(CombatantId::from("fighter")));
        assert_eq!(tracker.round(), 2);
    }

    #[test]
    fn test_rejoin_moves_group() {
        let (mut tracker, _) = roster();
        tracker.join("goblin-2", "Goblin Leader");
        assert_eq!(
            tracker.group_of(&CombatantId::from("goblin-2")),
            Some(&GroupKey::from("Goblin Leader"))
        );
        let members = tracker.members(&GroupKey::from("Goblin Cutter"));
        assert_eq!(members, vec![&CombatantId::from("goblin-1")]);

        tracker.leave(&CombatantId::from("goblin-1"));
        assert!(tracker.group_of(&CombatantId::from("goblin-1")).is_none());
    }
}
