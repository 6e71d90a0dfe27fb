pub mod assignment;
pub mod commands;
pub mod events;
pub mod generate;
pub mod household;
pub mod init;
pub mod member;
pub mod offer;
pub mod run;
pub mod template;

pub use commands::*;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use serde_json::Value;

use crate::db::connection;
use crate::error::ChoreError;
use crate::output;
use crate::time::{parse_date, parse_timestamp};

/// Flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub json: bool,
    pub db: Option<String>,
    pub now: Option<String>,
}

impl Globals {
    pub fn open(&self) -> Result<Connection, ChoreError> {
        connection::open_db(&connection::db_path(self.db.as_deref()))
    }

    /// `--now` when given, otherwise the wall clock.
    pub fn now(&self) -> Result<DateTime<Utc>, ChoreError> {
        match self.now.as_deref() {
            Some(s) => parse_timestamp(s),
            None => Ok(Utc::now()),
        }
    }

    /// An explicit date argument, or today's UTC date.
    pub fn date_or_today(&self, date: Option<&str>) -> Result<NaiveDate, ChoreError> {
        match date {
            Some(s) => parse_date(s),
            None => Ok(self.now()?.date_naive()),
        }
    }

    pub fn print_success(&self, data: Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(data)).unwrap()
        );
    }
}

/// Print an error the way the output mode expects and map it to an exit
/// code: 2 for conflicts, 1 otherwise.
pub fn finish(result: Result<i32, ChoreError>, json_output: bool) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&output::json::error(&e)).unwrap());
            } else {
                eprintln!("Error: {}", e.message);
            }
            if e.is_conflict() {
                2
            } else {
                1
            }
        }
    }
}
