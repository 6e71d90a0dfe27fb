use rusqlite::{params, Connection, OptionalExtension};

use crate::error::ChoreError;
use crate::models::{Household, MemberId, Membership};

pub fn create_household(
    conn: &Connection,
    id: &str,
    name: &str,
    created_at: &str,
) -> Result<Household, ChoreError> {
    let inserted = conn.execute(
        "INSERT INTO households (id, name, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO NOTHING",
        params![id, name, created_at],
    )?;
    if inserted == 0 {
        return Err(ChoreError::validation(format!(
            "Household '{id}' already exists"
        )));
    }
    get_household(conn, id)
}

pub fn get_household(conn: &Connection, id: &str) -> Result<Household, ChoreError> {
    conn.query_row(
        "SELECT id, name, created_at FROM households WHERE id = ?1",
        params![id],
        row_to_household,
    )
    .optional()?
    .ok_or_else(|| ChoreError::household_not_found(id))
}

pub fn list_households(conn: &Connection) -> Result<Vec<Household>, ChoreError> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM households ORDER BY id ASC")?;
    let households = stmt
        .query_map([], row_to_household)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(households)
}

/// Add a member, or re-admit one who left earlier.
pub fn add_member(
    conn: &Connection,
    household_id: &str,
    member_id: &str,
    joined_on: &str,
) -> Result<Membership, ChoreError> {
    get_household(conn, household_id)?;
    let changed = conn.execute(
        "INSERT INTO household_members (household_id, member_id, joined_on)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(household_id, member_id) DO UPDATE
            SET joined_on = excluded.joined_on, left_on = NULL
            WHERE household_members.left_on IS NOT NULL",
        params![household_id, member_id, joined_on],
    )?;
    if changed == 0 {
        return Err(ChoreError::validation(format!(
            "{member_id} is already a member of {household_id}"
        )));
    }
    get_membership(conn, household_id, member_id)
}

/// Mark a member as having left. The member stays on rosters for dates
/// before `left_on`.
pub fn remove_member(
    conn: &Connection,
    household_id: &str,
    member_id: &str,
    left_on: &str,
) -> Result<Membership, ChoreError> {
    let membership = get_membership(conn, household_id, member_id)?;
    if membership.left_on.is_some() {
        return Err(ChoreError::validation(format!(
            "{member_id} has already left {household_id}"
        )));
    }
    if left_on <= membership.joined_on.as_str() {
        return Err(ChoreError::validation(format!(
            "{member_id} cannot leave on or before joining ({})",
            membership.joined_on
        )));
    }
    conn.execute(
        "UPDATE household_members SET left_on = ?1
         WHERE household_id = ?2 AND member_id = ?3 AND left_on IS NULL",
        params![left_on, household_id, member_id],
    )?;
    get_membership(conn, household_id, member_id)
}

pub fn get_membership(
    conn: &Connection,
    household_id: &str,
    member_id: &str,
) -> Result<Membership, ChoreError> {
    conn.query_row(
        "SELECT household_id, member_id, joined_on, left_on
         FROM household_members WHERE household_id = ?1 AND member_id = ?2",
        params![household_id, member_id],
        row_to_membership,
    )
    .optional()?
    .ok_or_else(|| {
        ChoreError::validation(format!("{member_id} is not a member of {household_id}"))
    })
}

pub fn list_members(conn: &Connection, household_id: &str) -> Result<Vec<Membership>, ChoreError> {
    let mut stmt = conn.prepare(
        "SELECT household_id, member_id, joined_on, left_on
         FROM household_members WHERE household_id = ?1
         ORDER BY joined_on ASC, member_id ASC",
    )?;
    let members = stmt
        .query_map(params![household_id], row_to_membership)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

/// Members on the roster for `date`: joined on or before it and not yet
/// left. Ordered by join date, then id.
pub fn roster_as_of(
    conn: &Connection,
    household_id: &str,
    date: &str,
) -> Result<Vec<MemberId>, ChoreError> {
    let mut stmt = conn.prepare(
        "SELECT member_id FROM household_members
         WHERE household_id = ?1
           AND joined_on <= ?2
           AND (left_on IS NULL OR left_on > ?2)
         ORDER BY joined_on ASC, member_id ASC",
    )?;
    let roster = stmt
        .query_map(params![household_id, date], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(roster)
}

fn row_to_household(row: &rusqlite::Row) -> rusqlite::Result<Household> {
    Ok(Household {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn row_to_membership(row: &rusqlite::Row) -> rusqlite::Result<Membership> {
    Ok(Membership {
        household_id: row.get(0)?,
        member_id: row.get(1)?,
        joined_on: row.get(2)?,
        left_on: row.get(3)?,
    })
}
