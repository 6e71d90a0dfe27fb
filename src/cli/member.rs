use serde_json::json;

use crate::cli::commands::MemberCommands;
use crate::cli::{finish, Globals};
use crate::db::household_repo;
use crate::error::ChoreError;
use crate::output;
use crate::time::format_date;

pub fn run(cmd: MemberCommands, globals: &Globals) -> i32 {
    let result = match cmd {
        MemberCommands::Add { household, member, joined_on } => {
            run_add(&household, &member, joined_on.as_deref(), globals)
        }
        MemberCommands::Remove { household, member, left_on } => {
            run_remove(&household, &member, left_on.as_deref(), globals)
        }
        MemberCommands::List { household, as_of } => run_list(&household, as_of.as_deref(), globals),
    };
    finish(result, globals.json)
}

fn run_add(
    household: &str,
    member: &str,
    joined_on: Option<&str>,
    globals: &Globals,
) -> Result<i32, ChoreError> {
    if member.trim().is_empty() {
        return Err(ChoreError::validation("member id must not be empty"));
    }
    let joined_on = format_date(globals.date_or_today(joined_on)?);
    let conn = globals.open()?;
    let membership = household_repo::add_member(&conn, household, member, &joined_on)?;
    tracing::info!(household = %household, member = %member, joined_on = %joined_on, "Member added");

    if globals.json {
        globals.print_success(json!({ "member": output::json::membership_json(&membership) }));
    } else {
        println!("Added {member} to {household} from {joined_on}");
    }
    Ok(0)
}

fn run_remove(
    household: &str,
    member: &str,
    left_on: Option<&str>,
    globals: &Globals,
) -> Result<i32, ChoreError> {
    let left_on = format_date(globals.date_or_today(left_on)?);
    let conn = globals.open()?;
    household_repo::get_household(&conn, household)?;
    let membership = household_repo::remove_member(&conn, household, member, &left_on)?;
    tracing::info!(household = %household, member = %member, left_on = %left_on, "Member removed");

    if globals.json {
        globals.print_success(json!({ "member": output::json::membership_json(&membership) }));
    } else {
        println!("Removed {member} from {household} as of {left_on}");
    }
    Ok(0)
}

fn run_list(household: &str, as_of: Option<&str>, globals: &Globals) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    household_repo::get_household(&conn, household)?;

    if let Some(as_of) = as_of {
        let date = format_date(crate::time::parse_date(as_of)?);
        let roster = household_repo::roster_as_of(&conn, household, &date)?;
        if globals.json {
            globals.print_success(json!({ "as_of": date, "roster": roster }));
        } else if roster.is_empty() {
            println!("Nobody is on the roster on {date}.");
        } else {
            println!("Roster on {date}: {}", roster.join(", "));
        }
        return Ok(0);
    }

    let members = household_repo::list_members(&conn, household)?;
    if globals.json {
        let list: Vec<_> = members.iter().map(output::json::membership_json).collect();
        globals.print_success(json!({ "members": list }));
    } else {
        output::text::print_member_list(&members);
    }
    Ok(0)
}
