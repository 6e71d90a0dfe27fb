//! Shared setup for engine tests.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

use crate::db::{self, household_repo, template_repo};
use crate::engine::roster::{RosterSource, SqliteRoster};
use crate::error::ChoreError;
use crate::models::{MemberId, RuleConfig, RuleType, TaskTemplate};
use crate::time::parse_date;

pub const HOUSEHOLD: &str = "home";
const JOINED_ON: &str = "2025-01-01";
const CREATED_AT: &str = "2025-01-01T00:00:00Z";

/// In-memory database with one household whose members all joined on
/// 2025-01-01.
pub fn household(members: &[&str]) -> Connection {
    let conn = db::open_in_memory().unwrap();
    add_household(&conn, HOUSEHOLD, members);
    conn
}

/// Same as [`household`], backed by a file so several connections can share it.
pub fn file_household(path: &Path, members: &[&str]) -> Connection {
    db::init_db(path).unwrap();
    let conn = db::open_db(path).unwrap();
    add_household(&conn, HOUSEHOLD, members);
    conn
}

pub fn add_household(conn: &Connection, id: &str, members: &[&str]) {
    household_repo::create_household(conn, id, id, CREATED_AT).unwrap();
    for member in members {
        household_repo::add_member(conn, id, member, JOINED_ON).unwrap();
    }
}

pub fn template(conn: &Connection, rule_type: &str, payload: &str) -> TaskTemplate {
    template_in(conn, HOUSEHOLD, rule_type, payload)
}

pub fn template_in(conn: &Connection, household_id: &str, rule_type: &str, payload: &str) -> TaskTemplate {
    let rule = RuleConfig::parse(RuleType::from_str(rule_type).unwrap(), payload).unwrap();
    template_repo::create_template(
        conn,
        &ulid::Ulid::new().to_string(),
        household_id,
        &format!("{rule_type} chore"),
        5,
        true,
        &rule,
        CREATED_AT,
    )
    .unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

/// Monday 2025-01-06, 08:00 UTC.
pub fn now() -> DateTime<Utc> {
    "2025-01-06T08:00:00Z".parse().unwrap()
}

/// Roster source that is down for one household.
pub struct FailingRoster<'c> {
    pub inner: SqliteRoster<'c>,
    pub failing_household: &'static str,
}

impl RosterSource for FailingRoster<'_> {
    fn roster(&self, household_id: &str, as_of: NaiveDate) -> Result<Vec<MemberId>, ChoreError> {
        if household_id == self.failing_household {
            return Err(ChoreError::roster_unavailable(household_id, "membership service offline"));
        }
        self.inner.roster(household_id, as_of)
    }
}
