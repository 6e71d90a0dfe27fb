//! Completion and manual reassignment.
//!
//! Both go through guarded updates like the offer transitions, so a
//! completion cannot race an in-flight decline or a concurrent reassignment.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::{self, assignment_repo, event_repo, template_repo};
use crate::engine::roster::RosterSource;
use crate::error::ChoreError;
use crate::models::{Assignment, AssignmentStatus, EventKind};
use crate::time::{format_timestamp, parse_date};

/// Mark an assignment completed by its assignee: `pending → completed` for
/// recurring rows, `accepted → completed` for single rows. Emits a
/// `completed` event carrying the template's points.
pub fn complete(
    conn: &Connection,
    assignment_id: &str,
    member_id: &str,
    now: DateTime<Utc>,
) -> Result<Assignment, ChoreError> {
    let at = format_timestamp(now);
    let assignment = db::immediate(conn, |conn| {
        let current = assignment_repo::get_assignment(conn, assignment_id)?;
        if current.status.is_terminal() {
            return Err(ChoreError::offer_closed(current.status.as_str()));
        }
        let from = if current.is_offer() {
            AssignmentStatus::Accepted
        } else {
            AssignmentStatus::Pending
        };
        if assignment_repo::complete_assignment(conn, assignment_id, member_id, from, &at)? == 0 {
            return Err(completion_rejection(&current, member_id));
        }
        let completed = assignment_repo::get_assignment(conn, assignment_id)?;
        let template = template_repo::get_template(conn, &completed.template_id)?;
        event_repo::record_event(
            conn,
            &completed,
            EventKind::Completed,
            member_id,
            template.point_value,
            &at,
        )?;
        Ok(completed)
    })?;
    tracing::info!(assignment = %assignment_id, member = %member_id, "Assignment completed");
    Ok(assignment)
}

fn completion_rejection(current: &Assignment, member_id: &str) -> ChoreError {
    match current.status {
        AssignmentStatus::Offered => ChoreError::validation(format!(
            "Assignment {} is still an open offer; accept it before completing",
            current.id
        )),
        AssignmentStatus::Pending | AssignmentStatus::Accepted => {
            if current.assignee_id.as_deref() != Some(member_id) {
                ChoreError::validation(format!(
                    "{member_id} is not the assignee of {}",
                    current.id
                ))
            } else {
                // Status changed between the read and the guarded update.
                ChoreError::offer_closed(current.status.as_str())
            }
        }
        other => ChoreError::offer_closed(other.as_str()),
    }
}

/// Move a pending recurring assignment to `member_id`, who must be on the
/// household roster on the due date. Later generation runs leave the row
/// alone.
pub fn reassign(
    conn: &Connection,
    roster: &dyn RosterSource,
    assignment_id: &str,
    member_id: &str,
    now: DateTime<Utc>,
) -> Result<Assignment, ChoreError> {
    let current = assignment_repo::get_assignment(conn, assignment_id)?;
    let due_date = match current.due_date.as_deref() {
        Some(due) => parse_date(due)?,
        None => {
            return Err(ChoreError::validation(format!(
                "Assignment {assignment_id} is a single-task offer and cannot be reassigned"
            )))
        }
    };
    let members = roster.roster(&current.household_id, due_date)?;
    if !members.iter().any(|m| m == member_id) {
        return Err(ChoreError::validation(format!(
            "{member_id} is not on the roster of {} on {}",
            current.household_id,
            due_date
        )));
    }

    let at = format_timestamp(now);
    let assignment = db::immediate(conn, |conn| {
        if assignment_repo::reassign(conn, assignment_id, member_id, &at)? == 0 {
            let latest = assignment_repo::get_assignment(conn, assignment_id)?;
            return Err(ChoreError::offer_closed(latest.status.as_str()));
        }
        assignment_repo::get_assignment(conn, assignment_id)
    })?;
    tracing::info!(
        assignment = %assignment_id,
        from = current.assignee_id.as_deref().unwrap_or(""),
        to = %member_id,
        "Assignment reassigned"
    );
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeadlinePolicy;
    use crate::db::assignment_repo::AssignmentFilter;
    use crate::engine::roster::SqliteRoster;
    use crate::engine::{fixtures, generator, negotiation};
    use crate::error::ErrorCode;

    fn generated_rows(conn: &Connection, template_id: &str) -> Vec<Assignment> {
        let filter = AssignmentFilter {
            template_id: Some(template_id.to_string()),
            ..Default::default()
        };
        assignment_repo::list_assignments(conn, &filter).unwrap()
    }

    #[test]
    fn completing_a_recurring_row_emits_points() {
        let conn = fixtures::household(&["a"]);
        let template = fixtures::template(&conn, "daily", "");
        let roster = SqliteRoster::new(&conn);
        generator::generate(&conn, &roster, fixtures::date("2025-01-06"), 1, None, fixtures::now())
            .unwrap();
        let row = generated_rows(&conn, &template.id).remove(0);

        let done = complete(&conn, &row.id, "a", fixtures::now()).unwrap();
        assert_eq!(done.status, AssignmentStatus::Completed);
        assert!(done.completed_at.is_some());

        let events = event_repo::list_events(&conn, 0, 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Completed);
        assert_eq!(events[0].points, 5);

        let err = complete(&conn, &row.id, "a", fixtures::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::OfferClosed);
    }

    #[test]
    fn only_the_assignee_can_complete() {
        let conn = fixtures::household(&["a", "b"]);
        let template = fixtures::template(&conn, "daily", r#"{"assigned_members":["a"]}"#);
        let roster = SqliteRoster::new(&conn);
        generator::generate(&conn, &roster, fixtures::date("2025-01-06"), 1, None, fixtures::now())
            .unwrap();
        let row = generated_rows(&conn, &template.id).remove(0);

        let err = complete(&conn, &row.id, "b", fixtures::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(event_repo::list_events(&conn, 0, 10).unwrap().is_empty());
    }

    #[test]
    fn single_offers_complete_only_after_acceptance() {
        let conn = fixtures::household(&["a", "b"]);
        let template = fixtures::template(&conn, "single", r#"{"candidates":["a","b"]}"#);
        let offer =
            negotiation::publish_offer(&conn, &template.id, DeadlinePolicy::NoDeadline, fixtures::now())
                .unwrap();

        let err = complete(&conn, &offer.id, "a", fixtures::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        negotiation::accept_offer(&conn, &offer.id, "a", fixtures::now()).unwrap();
        let done = complete(&conn, &offer.id, "a", fixtures::now()).unwrap();
        assert_eq!(done.status, AssignmentStatus::Completed);

        let kinds: Vec<_> = event_repo::list_events(&conn, 0, 10)
            .unwrap()
            .into_iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::Accepted, EventKind::Completed]);
    }

    #[test]
    fn reassignment_survives_regeneration() {
        let conn = fixtures::household(&["a", "b"]);
        let template = fixtures::template(&conn, "daily", r#"{"assigned_members":["a"]}"#);
        let roster = SqliteRoster::new(&conn);
        let start = fixtures::date("2025-01-06");
        generator::generate(&conn, &roster, start, 1, None, fixtures::now()).unwrap();
        let row = generated_rows(&conn, &template.id).remove(0);

        let moved = reassign(&conn, &roster, &row.id, "b", fixtures::now()).unwrap();
        assert_eq!(moved.assignee_id.as_deref(), Some("b"));

        generator::generate(&conn, &roster, start, 1, None, fixtures::now()).unwrap();
        let rows = generated_rows(&conn, &template.id);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].assignee_id.as_deref(), Some("b"));
    }

    #[test]
    fn reassignment_requires_a_pending_row_and_a_roster_member() {
        let conn = fixtures::household(&["a"]);
        let template = fixtures::template(&conn, "daily", "");
        let roster = SqliteRoster::new(&conn);
        generator::generate(&conn, &roster, fixtures::date("2025-01-06"), 1, None, fixtures::now())
            .unwrap();
        let row = generated_rows(&conn, &template.id).remove(0);

        let err = reassign(&conn, &roster, &row.id, "stranger", fixtures::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        complete(&conn, &row.id, "a", fixtures::now()).unwrap();
        crate::db::household_repo::add_member(&conn, fixtures::HOUSEHOLD, "b", "2025-01-02").unwrap();
        let err = reassign(&conn, &roster, &row.id, "b", fixtures::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::OfferClosed);
    }
}
