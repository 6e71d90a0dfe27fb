use serde_json::json;

use crate::cli::commands::HouseholdCommands;
use crate::cli::{finish, Globals};
use crate::db::household_repo;
use crate::error::ChoreError;
use crate::output;
use crate::time::format_timestamp;

pub fn run(cmd: HouseholdCommands, globals: &Globals) -> i32 {
    let result = match cmd {
        HouseholdCommands::Add { id, name } => run_add(&id, name.as_deref(), globals),
        HouseholdCommands::List => run_list(globals),
    };
    finish(result, globals.json)
}

fn run_add(id: &str, name: Option<&str>, globals: &Globals) -> Result<i32, ChoreError> {
    if id.trim().is_empty() {
        return Err(ChoreError::validation("household id must not be empty"));
    }
    let conn = globals.open()?;
    let now = format_timestamp(globals.now()?);
    let household = household_repo::create_household(&conn, id, name.unwrap_or(id), &now)?;

    if globals.json {
        globals.print_success(json!({ "household": output::json::household_json(&household) }));
    } else {
        println!("Added household: {} ({})", household.name, household.id);
    }
    Ok(0)
}

fn run_list(globals: &Globals) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    let households = household_repo::list_households(&conn)?;

    if globals.json {
        let list: Vec<_> = households.iter().map(output::json::household_json).collect();
        globals.print_success(json!({ "households": list }));
    } else {
        output::text::print_household_list(&households);
    }
    Ok(0)
}
