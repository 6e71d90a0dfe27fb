use rusqlite::{params, Connection};

use crate::error::ChoreError;
use crate::models::{Assignment, AssignmentEvent, EventKind};

/// Append an event for a transition that has just been applied. Must run in
/// the same transaction as the transition.
pub fn record_event(
    conn: &Connection,
    assignment: &Assignment,
    kind: EventKind,
    member_id: &str,
    points: i64,
    occurred_at: &str,
) -> Result<i64, ChoreError> {
    conn.execute(
        "INSERT INTO assignment_events
            (assignment_id, template_id, household_id, kind, member_id, points, occurred_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            assignment.id,
            assignment.template_id,
            assignment.household_id,
            kind.as_str(),
            member_id,
            points,
            occurred_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Events with `seq > after`, oldest first.
pub fn list_events(
    conn: &Connection,
    after: i64,
    limit: i64,
) -> Result<Vec<AssignmentEvent>, ChoreError> {
    let mut stmt = conn.prepare(
        "SELECT seq, assignment_id, template_id, household_id, kind, member_id, points, occurred_at
         FROM assignment_events WHERE seq > ?1 ORDER BY seq ASC LIMIT ?2",
    )?;
    let events = stmt
        .query_map(params![after, limit], |row| {
            Ok(AssignmentEvent {
                seq: row.get(0)?,
                assignment_id: row.get(1)?,
                template_id: row.get(2)?,
                household_id: row.get(3)?,
                kind: read_kind(row.get(4)?)?,
                member_id: row.get(5)?,
                points: row.get(6)?,
                occurred_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(events)
}

fn read_kind(raw: String) -> rusqlite::Result<EventKind> {
    EventKind::from_str(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            Box::new(ChoreError::database(format!("unknown event kind '{raw}'"))),
        )
    })
}
