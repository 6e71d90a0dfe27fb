use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::household_repo;
use crate::error::ChoreError;
use crate::models::MemberId;
use crate::time::format_date;

/// Source of household rosters. Callers have already checked that the
/// requester belongs to the household; implementations only answer who is
/// eligible on a date.
pub trait RosterSource {
    fn roster(&self, household_id: &str, as_of: NaiveDate) -> Result<Vec<MemberId>, ChoreError>;
}

/// Roster backed by the `household_members` table.
pub struct SqliteRoster<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteRoster<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl RosterSource for SqliteRoster<'_> {
    fn roster(&self, household_id: &str, as_of: NaiveDate) -> Result<Vec<MemberId>, ChoreError> {
        household_repo::roster_as_of(self.conn, household_id, &format_date(as_of))
            .map_err(|e| ChoreError::roster_unavailable(household_id, e))
    }
}
