use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::db::offer_repo;
use crate::error::ChoreError;
use crate::models::{Assignment, AssignmentStatus};

const ASSIGNMENT_COLUMNS: &str = "id, template_id, household_id, due_date, assignee_id, status,
     deadline, created_at, updated_at, accepted_at, completed_at";

/// Insert one recurring row in `pending`. Returns false when the natural key
/// `(template_id, due_date, assignee_id)` already exists.
pub fn insert_recurring(
    conn: &Connection,
    id: &str,
    template_id: &str,
    household_id: &str,
    due_date: &str,
    assignee_id: &str,
    now: &str,
) -> Result<bool, ChoreError> {
    let inserted = conn.execute(
        "INSERT INTO task_assignments
            (id, template_id, household_id, due_date, assignee_id, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?6)
         ON CONFLICT DO NOTHING",
        params![id, template_id, household_id, due_date, assignee_id, now],
    )?;
    Ok(inserted == 1)
}

/// Whether any row, in any status, exists for the template on this date.
pub fn has_assignments_for_date(
    conn: &Connection,
    template_id: &str,
    due_date: &str,
) -> Result<bool, ChoreError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM task_assignments WHERE template_id = ?1 AND due_date = ?2)",
        params![template_id, due_date],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Insert a single-task offer in `offered`. Fails with `OFFER_ACTIVE` when
/// the template already has an offered or accepted instance.
pub fn insert_offer(
    conn: &Connection,
    id: &str,
    template_id: &str,
    household_id: &str,
    deadline: Option<&str>,
    now: &str,
) -> Result<(), ChoreError> {
    let result = conn.execute(
        "INSERT INTO task_assignments
            (id, template_id, household_id, status, deadline, created_at, updated_at)
         VALUES (?1, ?2, ?3, 'offered', ?4, ?5, ?5)",
        params![id, template_id, household_id, deadline, now],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(ChoreError::offer_active(template_id))
        }
        Err(e) => Err(e.into()),
    }
}

/// The template's instance that is still offered or accepted but not yet
/// completed, if any.
pub fn live_instance_for_template(
    conn: &Connection,
    template_id: &str,
) -> Result<Option<String>, ChoreError> {
    let id = conn
        .query_row(
            "SELECT id FROM task_assignments
             WHERE template_id = ?1 AND status IN ('offered', 'accepted')",
            params![template_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_assignment(conn: &Connection, id: &str) -> Result<Assignment, ChoreError> {
    let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM task_assignments WHERE id = ?1");
    let mut assignment = conn
        .query_row(&sql, params![id], row_to_assignment)
        .optional()?
        .ok_or_else(|| ChoreError::assignment_not_found(id))?;
    if assignment.is_offer() {
        assignment.candidates = offer_repo::candidates_for(conn, id)?;
    }
    Ok(assignment)
}

#[derive(Debug, Default, Clone)]
pub struct AssignmentFilter {
    pub household_id: Option<String>,
    pub template_id: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<AssignmentStatus>,
    pub assignee_id: Option<String>,
}

pub fn list_assignments(
    conn: &Connection,
    filter: &AssignmentFilter,
) -> Result<Vec<Assignment>, ChoreError> {
    let mut clauses = Vec::new();
    let mut values: Vec<String> = Vec::new();
    let mut push = |column: &str, value: &str| {
        values.push(value.to_string());
        clauses.push(format!("{column} = ?{}", values.len()));
    };
    if let Some(ref v) = filter.household_id {
        push("household_id", v);
    }
    if let Some(ref v) = filter.template_id {
        push("template_id", v);
    }
    if let Some(ref v) = filter.due_date {
        push("due_date", v);
    }
    if let Some(ref v) = filter.status {
        push("status", v.as_str());
    }
    if let Some(ref v) = filter.assignee_id {
        push("assignee_id", v);
    }
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM task_assignments {where_clause}
         ORDER BY COALESCE(due_date, created_at) ASC, template_id ASC, assignee_id ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut assignments = stmt
        .query_map(params_from_iter(values.iter()), row_to_assignment)?
        .collect::<Result<Vec<_>, _>>()?;
    for a in assignments.iter_mut().filter(|a| a.is_offer()) {
        a.candidates = offer_repo::candidates_for(conn, &a.id)?;
    }
    Ok(assignments)
}

/// `offered → accepted`, guarded on the offer still being open, the
/// deadline not having passed, and the member being an undeclined
/// candidate. Returns the number of rows changed (0 or 1).
pub fn accept_offer(
    conn: &Connection,
    id: &str,
    member_id: &str,
    now: &str,
) -> Result<usize, ChoreError> {
    let changed = conn.execute(
        "UPDATE task_assignments
         SET status = 'accepted', assignee_id = ?2, accepted_at = ?3, updated_at = ?3
         WHERE id = ?1
           AND status = 'offered'
           AND (deadline IS NULL OR deadline > ?3)
           AND EXISTS (
               SELECT 1 FROM offer_candidates
               WHERE assignment_id = ?1 AND member_id = ?2 AND declined_at IS NULL
           )",
        params![id, member_id, now],
    )?;
    Ok(changed)
}

/// `offered → declined_by_all` once no candidate is left undeclined.
pub fn close_if_all_declined(conn: &Connection, id: &str, now: &str) -> Result<usize, ChoreError> {
    let changed = conn.execute(
        "UPDATE task_assignments
         SET status = 'declined_by_all', updated_at = ?2
         WHERE id = ?1
           AND status = 'offered'
           AND NOT EXISTS (
               SELECT 1 FROM offer_candidates
               WHERE assignment_id = ?1 AND declined_at IS NULL
           )",
        params![id, now],
    )?;
    Ok(changed)
}

/// `offered → expired` when the deadline is at or before `now`.
pub fn expire_offer(conn: &Connection, id: &str, now: &str) -> Result<usize, ChoreError> {
    let changed = conn.execute(
        "UPDATE task_assignments
         SET status = 'expired', updated_at = ?2
         WHERE id = ?1
           AND status = 'offered'
           AND deadline IS NOT NULL
           AND deadline <= ?2",
        params![id, now],
    )?;
    Ok(changed)
}

pub fn expirable_offer_ids(conn: &Connection, now: &str) -> Result<Vec<String>, ChoreError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM task_assignments
         WHERE status = 'offered' AND deadline IS NOT NULL AND deadline <= ?1
         ORDER BY deadline ASC, id ASC",
    )?;
    let ids = stmt
        .query_map(params![now], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// `from → completed` for the row's own assignee.
pub fn complete_assignment(
    conn: &Connection,
    id: &str,
    member_id: &str,
    from: AssignmentStatus,
    now: &str,
) -> Result<usize, ChoreError> {
    let changed = conn.execute(
        "UPDATE task_assignments
         SET status = 'completed', completed_at = ?3, updated_at = ?3
         WHERE id = ?1 AND assignee_id = ?2 AND status = ?4",
        params![id, member_id, now, from.as_str()],
    )?;
    Ok(changed)
}

/// Move a pending recurring row to another member. Returns 0 when the row
/// left `pending` in the meantime.
pub fn reassign(
    conn: &Connection,
    id: &str,
    member_id: &str,
    now: &str,
) -> Result<usize, ChoreError> {
    let result = conn.execute(
        "UPDATE task_assignments
         SET assignee_id = ?2, updated_at = ?3
         WHERE id = ?1 AND status = 'pending' AND due_date IS NOT NULL",
        params![id, member_id, now],
    );
    match result {
        Ok(changed) => Ok(changed),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(ChoreError::validation(format!(
                "{member_id} already has this chore on that date"
            )))
        }
        Err(e) => Err(e.into()),
    }
}

fn read_status(raw: String) -> rusqlite::Result<AssignmentStatus> {
    AssignmentStatus::from_str(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            Box::new(ChoreError::database(format!("unknown assignment status '{raw}'"))),
        )
    })
}

fn row_to_assignment(row: &rusqlite::Row) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        template_id: row.get(1)?,
        household_id: row.get(2)?,
        due_date: row.get(3)?,
        assignee_id: row.get(4)?,
        status: read_status(row.get(5)?)?,
        deadline: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        accepted_at: row.get(9)?,
        completed_at: row.get(10)?,
        candidates: Vec::new(),
    })
}
