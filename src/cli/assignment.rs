use serde_json::json;

use crate::cli::commands::AssignmentCommands;
use crate::cli::{finish, Globals};
use crate::db::assignment_repo::{self, AssignmentFilter};
use crate::engine::completion;
use crate::engine::roster::SqliteRoster;
use crate::error::ChoreError;
use crate::models::AssignmentStatus;
use crate::output;
use crate::time::{format_date, parse_date};

pub fn run(cmd: AssignmentCommands, globals: &Globals) -> i32 {
    let result = match cmd {
        AssignmentCommands::List { household, template, date, status, assignee } => {
            run_list(household, template, date, status, assignee, globals)
        }
        AssignmentCommands::Show { id } => run_show(&id, globals),
        AssignmentCommands::Complete { id, member } => run_complete(&id, &member, globals),
        AssignmentCommands::Reassign { id, member } => run_reassign(&id, &member, globals),
    };
    finish(result, globals.json)
}

fn run_list(
    household: Option<String>,
    template: Option<String>,
    date: Option<String>,
    status: Option<String>,
    assignee: Option<String>,
    globals: &Globals,
) -> Result<i32, ChoreError> {
    let status = status
        .map(|s| {
            AssignmentStatus::from_str(&s)
                .ok_or_else(|| ChoreError::validation(format!("Unknown status '{s}'")))
        })
        .transpose()?;
    let due_date = date.map(|d| parse_date(&d).map(format_date)).transpose()?;
    let filter = AssignmentFilter {
        household_id: household,
        template_id: template,
        due_date,
        status,
        assignee_id: assignee,
    };

    let conn = globals.open()?;
    let assignments = assignment_repo::list_assignments(&conn, &filter)?;

    if globals.json {
        let list: Vec<_> = assignments.iter().map(output::json::assignment_json).collect();
        globals.print_success(json!({ "assignments": list }));
    } else {
        output::text::print_assignment_list(&assignments);
    }
    Ok(0)
}

fn run_show(id: &str, globals: &Globals) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    let assignment = assignment_repo::get_assignment(&conn, id)?;

    if globals.json {
        globals.print_success(json!({ "assignment": output::json::assignment_json(&assignment) }));
    } else {
        output::text::print_assignment(&assignment);
    }
    Ok(0)
}

fn run_complete(id: &str, member: &str, globals: &Globals) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    let assignment = completion::complete(&conn, id, member, globals.now()?)?;

    if globals.json {
        globals.print_success(json!({ "assignment": output::json::assignment_json(&assignment) }));
    } else {
        println!("{member} completed {}", assignment.id);
    }
    Ok(0)
}

fn run_reassign(id: &str, member: &str, globals: &Globals) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    let assignment =
        completion::reassign(&conn, &SqliteRoster::new(&conn), id, member, globals.now()?)?;

    if globals.json {
        globals.print_success(json!({ "assignment": output::json::assignment_json(&assignment) }));
    } else {
        println!("Reassigned {} to {member}", assignment.id);
    }
    Ok(0)
}
