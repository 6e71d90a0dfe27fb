//! Rule evaluation: decides, for one rule and one calendar date, whether an
//! instance exists and who it belongs to.
//!
//! Evaluation is a pure function of `(rule, date, roster)`. The roster is
//! passed in rather than looked up so that the generator decides which
//! membership snapshot applies.
//!
//! Rotation never reads or writes a "whose turn is it" pointer. The assignee
//! for a week is recomputed from the ISO-8601 week number and the member
//! list as it stands at evaluation time, so missed runs, repeated runs and
//! concurrent runs all agree. Editing the member list changes the outcome
//! for every week that has not been generated yet; rows already generated
//! were persisted and are not recomputed.

use chrono::{Datelike, NaiveDate};

use crate::models::{MemberId, RotationKind, RotationRule, RuleConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The rule produces nothing on this date (repeating rule, other weekday).
    NoInstance,
    Assigned(MemberId),
    /// Fan-out: every listed member gets an independent assignment.
    AssignedToAll(Vec<MemberId>),
    /// Single task: an offer to these candidates, resolved by negotiation.
    Offered(Vec<MemberId>),
}

impl Evaluation {
    /// Members who receive their own recurring assignment row.
    pub fn assignees(&self) -> Vec<MemberId> {
        match self {
            Self::NoInstance | Self::Offered(_) => Vec::new(),
            Self::Assigned(member) => vec![member.clone()],
            Self::AssignedToAll(members) => members.clone(),
        }
    }
}

pub fn evaluate(rule: &RuleConfig, date: NaiveDate, roster: &[MemberId]) -> Evaluation {
    match rule {
        RuleConfig::Daily(daily) => {
            Evaluation::AssignedToAll(resolve_members(&daily.assigned_members, roster))
        }
        RuleConfig::Repeating(repeating) => {
            if !repeating.days_of_week.contains(&day_of_week(date)) {
                return Evaluation::NoInstance;
            }
            Evaluation::AssignedToAll(resolve_members(&repeating.assigned_members, roster))
        }
        RuleConfig::WeeklyRotation(rotation) => rotate(rotation, rotation_week(date)),
        RuleConfig::Single(single) => {
            Evaluation::Offered(single.candidates.iter().cloned().collect())
        }
    }
}

/// 0 = Sunday through 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// ISO-8601 week number of `date`, 1 through 53.
pub fn rotation_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// An empty selection means the whole roster; otherwise the selection is
/// narrowed to members currently on the roster. Roster order is kept.
fn resolve_members<'a>(
    selected: &'a std::collections::BTreeSet<MemberId>,
    roster: &'a [MemberId],
) -> Vec<MemberId> {
    if selected.is_empty() {
        return roster.to_vec();
    }
    roster
        .iter()
        .filter(|member| selected.contains(*member))
        .cloned()
        .collect()
}

fn rotate(rule: &RotationRule, week: u32) -> Evaluation {
    let members = &rule.assigned_members;
    if members.is_empty() {
        return Evaluation::NoInstance;
    }
    match rule.rotation_kind {
        RotationKind::Alternating => {
            let index = week as usize % members.len();
            Evaluation::Assigned(members[index].clone())
        }
        RotationKind::OddEvenWeek => {
            // Odd weeks take the first half, even weeks the second. With an
            // odd member count the first half is the larger one.
            let split = members.len().div_ceil(2);
            let half = if week % 2 == 1 {
                &members[..split]
            } else {
                &members[split..]
            };
            match half {
                [only] => Evaluation::Assigned(only.clone()),
                group => Evaluation::AssignedToAll(group.to_vec()),
            }
        }
    }
}
