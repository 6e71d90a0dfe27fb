use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChoreError;
use crate::models::MemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Daily,
    Repeating,
    WeeklyRotation,
    Single,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Repeating => "repeating",
            Self::WeeklyRotation => "weekly_rotation",
            Self::Single => "single",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "repeating" => Some(Self::Repeating),
            "weekly_rotation" => Some(Self::WeeklyRotation),
            "single" => Some(Self::Single),
            _ => None,
        }
    }

    /// Recurring rules are materialized by the generator, one row per date.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::Single)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationKind {
    Alternating,
    OddEvenWeek,
}

/// Empty `assigned_members` means every member on the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DailyRule {
    #[serde(default)]
    pub assigned_members: BTreeSet<MemberId>,
}

/// `days_of_week` uses 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepeatingRule {
    pub days_of_week: BTreeSet<u8>,
    #[serde(default)]
    pub assigned_members: BTreeSet<MemberId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotationRule {
    pub rotation_kind: RotationKind,
    pub assigned_members: Vec<MemberId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SingleRule {
    pub candidates: BTreeSet<MemberId>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Recurrence rule of a template. The variant is the rule type, so a
/// config can never disagree with its type once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleConfig {
    Daily(DailyRule),
    Repeating(RepeatingRule),
    WeeklyRotation(RotationRule),
    Single(SingleRule),
}

impl RuleConfig {
    /// Parse a config payload for the given rule type. Unknown or missing
    /// fields are a shape mismatch and fail validation.
    pub fn parse(rule_type: RuleType, payload: &str) -> Result<Self, ChoreError> {
        let payload = if payload.trim().is_empty() { "{}" } else { payload };
        let shape_error = |e: serde_json::Error| {
            ChoreError::validation(format!(
                "rule config does not match rule type '{}': {e}",
                rule_type.as_str()
            ))
        };
        let rule = match rule_type {
            RuleType::Daily => Self::Daily(serde_json::from_str(payload).map_err(shape_error)?),
            RuleType::Repeating => {
                Self::Repeating(serde_json::from_str(payload).map_err(shape_error)?)
            }
            RuleType::WeeklyRotation => {
                Self::WeeklyRotation(serde_json::from_str(payload).map_err(shape_error)?)
            }
            RuleType::Single => Self::Single(serde_json::from_str(payload).map_err(shape_error)?),
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn rule_type(&self) -> RuleType {
        match self {
            Self::Daily(_) => RuleType::Daily,
            Self::Repeating(_) => RuleType::Repeating,
            Self::WeeklyRotation(_) => RuleType::WeeklyRotation,
            Self::Single(_) => RuleType::Single,
        }
    }

    pub fn validate(&self) -> Result<(), ChoreError> {
        match self {
            Self::Daily(rule) => validate_member_ids(&rule.assigned_members),
            Self::Repeating(rule) => {
                if rule.days_of_week.is_empty() {
                    return Err(ChoreError::validation(
                        "repeating rule requires at least one day of week",
                    ));
                }
                if let Some(day) = rule.days_of_week.iter().find(|d| **d > 6) {
                    return Err(ChoreError::validation(format!(
                        "day of week {day} is out of range 0..6"
                    )));
                }
                validate_member_ids(&rule.assigned_members)
            }
            Self::WeeklyRotation(rule) => {
                if rule.assigned_members.len() < 2 {
                    return Err(ChoreError::validation(
                        "weekly_rotation rule requires at least two members",
                    ));
                }
                let mut seen = HashSet::new();
                for member in &rule.assigned_members {
                    if !seen.insert(member.as_str()) {
                        return Err(ChoreError::validation(format!(
                            "member {member} appears twice in the rotation"
                        )));
                    }
                }
                validate_member_ids(&rule.assigned_members)
            }
            Self::Single(rule) => {
                if rule.candidates.is_empty() {
                    return Err(ChoreError::validation(
                        "single rule requires at least one candidate",
                    ));
                }
                validate_member_ids(&rule.candidates)
            }
        }
    }

    /// The stored payload, without the type tag.
    pub fn payload(&self) -> Value {
        let value = match self {
            Self::Daily(rule) => serde_json::to_value(rule),
            Self::Repeating(rule) => serde_json::to_value(rule),
            Self::WeeklyRotation(rule) => serde_json::to_value(rule),
            Self::Single(rule) => serde_json::to_value(rule),
        };
        value.unwrap_or(Value::Null)
    }
}

fn validate_member_ids<'a>(
    members: impl IntoIterator<Item = &'a MemberId>,
) -> Result<(), ChoreError> {
    if members.into_iter().any(|m| m.trim().is_empty()) {
        return Err(ChoreError::validation("member ids must not be empty"));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct TaskTemplate {
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub point_value: i64,
    pub active: bool,
    pub rule: RuleConfig,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskTemplate {
    pub fn rule_type(&self) -> RuleType {
        self.rule.rule_type()
    }
}

pub fn validate_template_fields(name: &str, point_value: i64) -> Result<(), ChoreError> {
    if name.trim().is_empty() {
        return Err(ChoreError::validation("template name must not be empty"));
    }
    if point_value < 1 {
        return Err(ChoreError::validation("point value must be a positive integer"));
    }
    Ok(())
}
