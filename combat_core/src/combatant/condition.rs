//! Ongoing conditions attached to a combatant

use super::CombatantId;
use roster_core::{DamageModifier, DamageType, DefenceType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a condition, unique within one combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionId(pub u32);

/// What a condition does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionKind {
    /// Damage taken every round; `None` = untyped
    Damage {
        damage_type: Option<DamageType>,
        amount: u32,
    },
    /// Free-text status such as "dazed" or "slowed"
    Status { description: String },
    /// Signed change to one or more defences
    DefenceModifier {
        defences: Vec<DefenceType>,
        delta: i32,
    },
    /// Temporary resistance, vulnerability or immunity
    DamageModifier(DamageModifier),
    /// Hit points regained at the start of each turn
    Regeneration { amount: u32 },
}

/// When a condition ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionDuration {
    /// Ends on a successful saving throw; `modifier` applies to that save only
    SaveEnds { modifier: i32 },
    UntilEndOfNextTurn,
    UntilStartOfNextTurn,
    UntilEndOfEncounter,
}

/// A timed effect on a combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OngoingCondition {
    /// Assigned when the condition is added to a combatant
    pub id: ConditionId,
    pub kind: ConditionKind,
    duration: ConditionDuration,
    /// Round in which the condition was applied
    pub round: u32,
    /// Round of the owner's turn whose boundary ends a turn-bounded condition
    ///
    /// `round + 1` unless the owner had not acted yet when it was applied.
    pub boundary_round: u32,
    /// Whose turn boundary ends the condition; `None` = the affected combatant
    pub owner: Option<CombatantId>,
}

impl OngoingCondition {
    pub fn new(kind: ConditionKind, duration: ConditionDuration, round: u32) -> Self {
        OngoingCondition {
            id: ConditionId::default(),
            kind,
            duration,
            round,
            boundary_round: round.saturating_add(1),
            owner: None,
        }
    }

    pub fn ongoing_damage(
        damage_type: Option<DamageType>,
        amount: u32,
        duration: ConditionDuration,
        round: u32,
    ) -> Self {
        Self::new(ConditionKind::Damage { damage_type, amount }, duration, round)
    }

    pub fn status(description: impl Into<String>, duration: ConditionDuration, round: u32) -> Self {
        Self::new(
            ConditionKind::Status {
                description: description.into(),
            },
            duration,
            round,
        )
    }

    pub fn defence_modifier(
        defences: Vec<DefenceType>,
        delta: i32,
        duration: ConditionDuration,
        round: u32,
    ) -> Self {
        Self::new(ConditionKind::DefenceModifier { defences, delta }, duration, round)
    }

    pub fn with_owner(mut self, owner: impl Into<CombatantId>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// End at the owner's turn in `round` instead of the following round
    pub fn ending_in_round(mut self, round: u32) -> Self {
        self.boundary_round = round;
        self
    }

    /// Duration kind, fixed at creation
    pub fn duration(&self) -> ConditionDuration {
        self.duration
    }

    pub fn is_save_ends(&self) -> bool {
        matches!(self.duration, ConditionDuration::SaveEnds { .. })
    }

    /// Per-condition saving throw modifier
    pub fn save_modifier(&self) -> Option<i32> {
        match self.duration {
            ConditionDuration::SaveEnds { modifier } => Some(modifier),
            _ => None,
        }
    }

    /// Change in `defence` granted by this condition
    pub fn defence_delta(&self, defence: DefenceType) -> i32 {
        match &self.kind {
            ConditionKind::DefenceModifier { defences, delta } if defences.contains(&defence) => {
                *delta
            }
            _ => 0,
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionKind::Damage {
                damage_type: Some(t),
                amount,
            } => write!(f, "{} ongoing {} damage", amount, t),
            ConditionKind::Damage {
                damage_type: None,
                amount,
            } => write!(f, "{} ongoing damage", amount),
            ConditionKind::Status { description } => write!(f, "{}", description),
            ConditionKind::DefenceModifier { defences, delta } => {
                let names: Vec<String> = defences.iter().map(|d| d.to_string()).collect();
                write!(f, "{:+} to {}", delta, names.join(", "))
            }
            ConditionKind::DamageModifier(modifier) => write!(f, "{}", modifier),
            ConditionKind::Regeneration { amount } => write!(f, "Regeneration {}", amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        let fire = ConditionKind::Damage {
            damage_type: Some(DamageType::Fire),
            amount: 5,
        };
        assert_eq!(fire.to_string(), "5 ongoing fire damage");

        let untyped = ConditionKind::Damage {
            damage_type: None,
            amount: 3,
        };
        assert_eq!(untyped.to_string(), "3 ongoing damage");

        let penalty = ConditionKind::DefenceModifier {
            defences: vec![DefenceType::ArmourClass, DefenceType::Reflex],
            delta: -2,
        };
        assert_eq!(penalty.to_string(), "-2 to AC, Reflex");
    }

    #[test]
    fn test_save_modifier_only_for_save_ends() {
        let c = OngoingCondition::status("Dazed", ConditionDuration::SaveEnds { modifier: 2 }, 1);
        assert!(c.is_save_ends());
        assert_eq!(c.save_modifier(), Some(2));

        let c = OngoingCondition::status("Prone", ConditionDuration::UntilEndOfEncounter, 1);
        assert_eq!(c.save_modifier(), None);
    }

    #[test]
    fn test_defence_delta_matches_listed_defences() {
        let c = OngoingCondition::defence_modifier(
            vec![DefenceType::Will],
            2,
            ConditionDuration::UntilEndOfNextTurn,
            1,
        );
        assert_eq!(c.defence_delta(DefenceType::Will), 2);
        assert_eq!(c.defence_delta(DefenceType::ArmourClass), 0);
    }

    #[test]
    fn test_boundary_round_defaults_to_following_round() {
        let c = OngoingCondition::status("Slowed", ConditionDuration::UntilEndOfNextTurn, 3);
        assert_eq!(c.boundary_round, 4);

        let c = c.ending_in_round(3);
        assert_eq!(c.round, 3);
        assert_eq!(c.boundary_round, 3);
    }
}
