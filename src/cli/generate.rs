use serde_json::json;

use crate::cli::{finish, Globals};
use crate::config::EngineConfig;
use crate::db::household_repo;
use crate::engine::generator;
use crate::engine::roster::SqliteRoster;
use crate::error::ChoreError;
use crate::output;

pub fn run(
    today: Option<&str>,
    window_days: Option<u32>,
    household: Option<&str>,
    globals: &Globals,
) -> i32 {
    finish(run_inner(today, window_days, household, globals), globals.json)
}

fn run_inner(
    today: Option<&str>,
    window_days: Option<u32>,
    household: Option<&str>,
    globals: &Globals,
) -> Result<i32, ChoreError> {
    let config = EngineConfig::from_env()?;
    let start = globals.date_or_today(today)?;
    let window_days = window_days.unwrap_or(config.generation_window_days);
    let now = globals.now()?;

    let conn = globals.open()?;
    if let Some(household) = household {
        household_repo::get_household(&conn, household)?;
    }
    let report = generator::generate(
        &conn,
        &SqliteRoster::new(&conn),
        start,
        window_days,
        household,
        now,
    )?;

    if globals.json {
        globals.print_success(json!({ "report": report }));
    } else {
        output::text::print_generation_report(&report);
    }
    Ok(0)
}
