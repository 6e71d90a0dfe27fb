use serde_json::json;

use crate::cli::{finish, Globals};
use crate::config::EngineConfig;
use crate::engine::roster::SqliteRoster;
use crate::engine::scheduler;
use crate::error::ChoreError;

pub fn run(iterations: Option<u64>, globals: &Globals) -> i32 {
    finish(run_inner(iterations, globals), globals.json)
}

fn run_inner(iterations: Option<u64>, globals: &Globals) -> Result<i32, ChoreError> {
    if iterations == Some(0) {
        return Err(ChoreError::validation("--iterations must be at least 1"));
    }
    let config = EngineConfig::from_env()?;
    let conn = globals.open()?;
    let failed = scheduler::run(&conn, &SqliteRoster::new(&conn), &config, iterations);

    if globals.json {
        globals.print_success(json!({ "cycles": iterations, "failed_cycles": failed }));
    } else {
        println!("Scheduler stopped ({failed} failed cycle(s))");
    }
    Ok(if failed > 0 { 1 } else { 0 })
}
