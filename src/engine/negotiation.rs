//! Single-task offers: publish, accept, decline, expire.
//!
//! ```text
//! offered ──accept──▶ accepted
//!    │ └──last decline──▶ declined_by_all
//!    └──deadline sweep──▶ expired
//! ```
//!
//! Every transition is one conditional `UPDATE ... WHERE status = 'offered'`
//! issued inside `BEGIN IMMEDIATE`. When the update touches no row the
//! current state is read back only to explain the rejection, so two members
//! accepting at once cannot both win.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::config::DeadlinePolicy;
use crate::db::{self, assignment_repo, event_repo, offer_repo, template_repo};
use crate::engine::evaluator::{self, Evaluation};
use crate::error::ChoreError;
use crate::models::{Assignment, AssignmentStatus, EventKind, RuleConfig};
use crate::time::{format_timestamp, parse_timestamp};

/// Open a new offer for a `single` template. The deadline comes from the
/// rule, falling back to the configured default policy.
pub fn publish_offer(
    conn: &Connection,
    template_id: &str,
    policy: DeadlinePolicy,
    now: DateTime<Utc>,
) -> Result<Assignment, ChoreError> {
    let template = template_repo::get_template(conn, template_id)?;
    let rule_deadline = match &template.rule {
        RuleConfig::Single(single) => single.deadline,
        _ => {
            return Err(ChoreError::validation(format!(
                "Template {} is a {} task; only single tasks are offered",
                template.id,
                template.rule_type().as_str()
            )))
        }
    };
    if !template.active {
        return Err(ChoreError::validation(format!(
            "Template {} is inactive",
            template.id
        )));
    }
    let candidates = match evaluator::evaluate(&template.rule, now.date_naive(), &[]) {
        Evaluation::Offered(candidates) => candidates,
        other => {
            return Err(ChoreError::database(format!(
                "single template {} evaluated to {other:?}",
                template.id
            )))
        }
    };
    let deadline = rule_deadline
        .or_else(|| policy.deadline_from(now))
        .map(format_timestamp);
    let created_at = format_timestamp(now);
    let id = ulid::Ulid::new().to_string();

    db::immediate(conn, |conn| {
        if assignment_repo::live_instance_for_template(conn, &template.id)?.is_some() {
            return Err(ChoreError::offer_active(&template.id));
        }
        assignment_repo::insert_offer(
            conn,
            &id,
            &template.id,
            &template.household_id,
            deadline.as_deref(),
            &created_at,
        )?;
        offer_repo::insert_candidates(conn, &id, &candidates)?;
        Ok(())
    })?;

    tracing::info!(assignment = %id, template = %template.id, candidates = candidates.len(), "Offer published");
    assignment_repo::get_assignment(conn, &id)
}

/// `offered → accepted` for `member_id`. Exactly one concurrent caller can
/// succeed; the others get `OFFER_TAKEN`.
pub fn accept_offer(
    conn: &Connection,
    assignment_id: &str,
    member_id: &str,
    now: DateTime<Utc>,
) -> Result<Assignment, ChoreError> {
    let at = format_timestamp(now);
    let assignment = db::immediate(conn, |conn| {
        if assignment_repo::accept_offer(conn, assignment_id, member_id, &at)? == 0 {
            return Err(explain_rejection(conn, assignment_id, member_id, now));
        }
        let assignment = assignment_repo::get_assignment(conn, assignment_id)?;
        let template = template_repo::get_template(conn, &assignment.template_id)?;
        event_repo::record_event(
            conn,
            &assignment,
            EventKind::Accepted,
            member_id,
            template.point_value,
            &at,
        )?;
        Ok(assignment)
    })?;
    tracing::info!(assignment = %assignment_id, member = %member_id, "Offer accepted");
    Ok(assignment)
}

/// Record `member_id`'s decline. The offer closes as `declined_by_all` on
/// the decline that exhausts the candidate set, and not before.
pub fn decline_offer(
    conn: &Connection,
    assignment_id: &str,
    member_id: &str,
    now: DateTime<Utc>,
) -> Result<Assignment, ChoreError> {
    let at = format_timestamp(now);
    let assignment = db::immediate(conn, |conn| {
        if offer_repo::record_decline(conn, assignment_id, member_id, &at)? == 0 {
            return Err(explain_rejection(conn, assignment_id, member_id, now));
        }
        assignment_repo::close_if_all_declined(conn, assignment_id, &at)?;
        assignment_repo::get_assignment(conn, assignment_id)
    })?;
    if assignment.status == AssignmentStatus::DeclinedByAll {
        tracing::info!(assignment = %assignment_id, "Offer declined by every candidate");
    } else {
        tracing::debug!(assignment = %assignment_id, member = %member_id, "Offer declined");
    }
    Ok(assignment)
}

/// `offered → expired` once the deadline has passed. Returns false for an
/// open offer whose deadline has not passed (or that has none); a terminal
/// or accepted row is a conflict.
pub fn expire(
    conn: &Connection,
    assignment_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, ChoreError> {
    let at = format_timestamp(now);
    if assignment_repo::expire_offer(conn, assignment_id, &at)? == 1 {
        tracing::info!(assignment = %assignment_id, "Offer expired");
        return Ok(true);
    }
    let assignment = assignment_repo::get_assignment(conn, assignment_id)?;
    match assignment.status {
        AssignmentStatus::Offered => Ok(false),
        other => Err(closed_error(other)),
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepReport {
    pub expired: Vec<String>,
    pub failed: usize,
}

/// Expire every open offer whose deadline is at or before `now`. Offers
/// resolved between the scan and the update are skipped.
pub fn sweep_expired(conn: &Connection, now: DateTime<Utc>) -> Result<SweepReport, ChoreError> {
    let ids = assignment_repo::expirable_offer_ids(conn, &format_timestamp(now))?;
    let mut report = SweepReport::default();
    for id in ids {
        match expire(conn, &id, now) {
            Ok(true) => report.expired.push(id),
            Ok(false) => {}
            Err(e) if e.is_conflict() => {
                tracing::debug!(assignment = %id, "Sweep: offer resolved before expiry");
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!(assignment = %id, error = %e, "Sweep: failed to expire offer");
            }
        }
    }
    tracing::info!(expired = report.expired.len(), failed = report.failed, "Expiry sweep finished");
    Ok(report)
}

fn closed_error(status: AssignmentStatus) -> ChoreError {
    match status {
        AssignmentStatus::Accepted => ChoreError::offer_taken(),
        AssignmentStatus::Expired => ChoreError::offer_expired(),
        other => ChoreError::offer_closed(other.as_str()),
    }
}

/// Why a guarded offer update touched no row.
fn explain_rejection(
    conn: &Connection,
    assignment_id: &str,
    member_id: &str,
    now: DateTime<Utc>,
) -> ChoreError {
    let assignment = match assignment_repo::get_assignment(conn, assignment_id) {
        Ok(assignment) => assignment,
        Err(e) => return e,
    };
    if !assignment.is_offer() {
        return ChoreError::validation(format!(
            "Assignment {assignment_id} is a recurring assignment, not an offer"
        ));
    }
    if assignment.status != AssignmentStatus::Offered {
        return closed_error(assignment.status);
    }
    match assignment.candidates.iter().find(|c| c.member_id == member_id) {
        None => return ChoreError::not_candidate(member_id),
        Some(candidate) if candidate.has_declined() => {
            return ChoreError::already_declined(member_id)
        }
        Some(_) => {}
    }
    let deadline_passed = assignment
        .deadline
        .as_deref()
        .and_then(|d| parse_timestamp(d).ok())
        .is_some_and(|deadline| deadline <= now);
    if deadline_passed {
        return ChoreError::offer_expired();
    }
    ChoreError::offer_taken()
}
