//! Power definitions and damage expressions

use crate::types::{DamageType, DefenceType};
use crate::ExpressionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier for a power, unique within a creature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerId(pub String);

impl From<&str> for PowerId {
    fn from(s: &str) -> Self {
        PowerId(s.to_string())
    }
}

impl From<String> for PowerId {
    fn from(s: String) -> Self {
        PowerId(s)
    }
}

impl fmt::Display for PowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How often a power can be used
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUsage {
    #[default]
    AtWill,
    Encounter,
    Daily,
    /// Free-text recharge condition, e.g. "Recharge 5-6"
    Recharge(String),
}

/// A power as authored on a creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerDefinition {
    pub id: PowerId,
    pub name: String,
    #[serde(default)]
    pub usage: PowerUsage,
    /// Attack bonus added to the d20; `None` for powers without an attack roll
    #[serde(default)]
    pub attack_bonus: Option<i32>,
    #[serde(default)]
    pub defence: Option<DefenceType>,
    #[serde(default)]
    pub damage: Option<DamageExpression>,
    #[serde(default)]
    pub damage_types: Vec<DamageType>,
}

impl PowerDefinition {
    pub fn new(id: impl Into<PowerId>, name: impl Into<String>) -> Self {
        PowerDefinition {
            id: id.into(),
            name: name.into(),
            usage: PowerUsage::AtWill,
            attack_bonus: None,
            defence: None,
            damage: None,
            damage_types: Vec::new(),
        }
    }

    pub fn with_usage(mut self, usage: PowerUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_attack(mut self, bonus: i32, defence: DefenceType) -> Self {
        self.attack_bonus = Some(bonus);
        self.defence = Some(defence);
        self
    }

    pub fn with_damage(mut self, damage: DamageExpression, types: Vec<DamageType>) -> Self {
        self.damage = Some(damage);
        self.damage_types = types;
        self
    }

    /// The recharge text, if this power recharges on a roll
    pub fn recharge_spec(&self) -> Option<&str> {
        match &self.usage {
            PowerUsage::Recharge(spec) => Some(spec.as_str()),
            _ => None,
        }
    }
}

/// Largest dice count accepted in one term
pub const MAX_DICE_COUNT: u32 = 100;
/// Largest die accepted in a term
pub const MAX_DIE_SIDES: u32 = 1000;

/// A group of identical dice, e.g. `2d6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceTerm {
    pub count: u32,
    pub sides: u32,
}

/// Parsed damage expression such as `2d6+4` or `1d8+1d6-1`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DamageExpression {
    pub dice: Vec<DiceTerm>,
    pub modifier: i32,
}

impl DamageExpression {
    /// Lowest possible total, floored at zero
    pub fn minimum(&self) -> u32 {
        let dice: i64 = self
            .dice
            .iter()
            .map(|d| d.count.min(MAX_DICE_COUNT) as i64)
            .sum();
        (dice + self.modifier as i64).clamp(0, u32::MAX as i64) as u32
    }

    /// Highest possible total, used for critical hits
    pub fn maximum(&self) -> u32 {
        let dice: i64 = self
            .dice
            .iter()
            .map(|d| d.count.min(MAX_DICE_COUNT) as i64 * d.sides.min(MAX_DIE_SIDES) as i64)
            .sum();
        (dice + self.modifier as i64).clamp(0, u32::MAX as i64) as u32
    }
}

impl FromStr for DamageExpression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if compact.is_empty() {
            return Err(ExpressionError::Empty);
        }

        // Split into signed terms
        let mut tokens: Vec<(i32, &str)> = Vec::new();
        let mut sign = 1;
        let mut start = 0;
        for (i, c) in compact.char_indices() {
            if c == '+' || c == '-' {
                if i > start {
                    tokens.push((sign, &compact[start..i]));
                } else if i != 0 {
                    return Err(ExpressionError::InvalidTerm(compact.clone()));
                }
                sign = if c == '-' { -1 } else { 1 };
                start = i + 1;
            }
        }
        if start >= compact.len() {
            return Err(ExpressionError::InvalidTerm(compact.clone()));
        }
        tokens.push((sign, &compact[start..]));

        let mut expression = DamageExpression::default();
        for (sign, token) in tokens {
            match token.split_once('d') {
                Some((count, sides)) => {
                    if sign < 0 {
                        return Err(ExpressionError::NegativeDice(token.to_string()));
                    }
                    let count = if count.is_empty() {
                        1
                    } else {
                        count
                            .parse::<u64>()
                            .map_err(|_| ExpressionError::InvalidTerm(token.to_string()))?
                    };
                    let sides = sides
                        .parse::<u64>()
                        .map_err(|_| ExpressionError::InvalidTerm(token.to_string()))?;
                    if count == 0 || sides == 0 {
                        return Err(ExpressionError::InvalidTerm(token.to_string()));
                    }
                    if count > u64::from(MAX_DICE_COUNT) || sides > u64::from(MAX_DIE_SIDES) {
                        return Err(ExpressionError::TooLarge(token.to_string()));
                    }
                    expression.dice.push(DiceTerm {
                        count: count as u32,
                        sides: sides as u32,
                    });
                }
                None => {
                    let value = token
                        .parse::<i32>()
                        .map_err(|_| ExpressionError::InvalidTerm(token.to_string()))?;
                    expression.modifier = expression.modifier.saturating_add(sign * value);
                }
            }
        }

        Ok(expression)
    }
}

impl TryFrom<String> for DamageExpression {
    type Error = ExpressionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DamageExpression> for String {
    fn from(value: DamageExpression) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DamageExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for term in &self.dice {
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{}d{}", term.count, term.sides)?;
            first = false;
        }
        if first {
            write!(f, "{}", self.modifier)
        } else if self.modifier > 0 {
            write!(f, "+{}", self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)
        } else {
            Ok(())
        }
    }
}
