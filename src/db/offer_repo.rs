use rusqlite::{params, Connection};

use crate::error::ChoreError;
use crate::models::{MemberId, OfferCandidate};

pub fn insert_candidates(
    conn: &Connection,
    assignment_id: &str,
    candidates: &[MemberId],
) -> Result<(), ChoreError> {
    let mut stmt = conn.prepare(
        "INSERT INTO offer_candidates (assignment_id, member_id) VALUES (?1, ?2)",
    )?;
    for member_id in candidates {
        stmt.execute(params![assignment_id, member_id])?;
    }
    Ok(())
}

pub fn candidates_for(
    conn: &Connection,
    assignment_id: &str,
) -> Result<Vec<OfferCandidate>, ChoreError> {
    let mut stmt = conn.prepare(
        "SELECT member_id, declined_at FROM offer_candidates
         WHERE assignment_id = ?1 ORDER BY member_id ASC",
    )?;
    let candidates = stmt
        .query_map(params![assignment_id], |row| {
            Ok(OfferCandidate {
                member_id: row.get(0)?,
                declined_at: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(candidates)
}

/// Record a decline, guarded on the offer still being open and the member
/// not having declined before. Returns the number of rows changed.
pub fn record_decline(
    conn: &Connection,
    assignment_id: &str,
    member_id: &str,
    now: &str,
) -> Result<usize, ChoreError> {
    let changed = conn.execute(
        "UPDATE offer_candidates SET declined_at = ?3
         WHERE assignment_id = ?1
           AND member_id = ?2
           AND declined_at IS NULL
           AND EXISTS (
               SELECT 1 FROM task_assignments WHERE id = ?1 AND status = 'offered'
           )",
        params![assignment_id, member_id, now],
    )?;
    Ok(changed)
}
