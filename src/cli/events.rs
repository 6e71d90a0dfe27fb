use serde_json::json;

use crate::cli::commands::EventCommands;
use crate::cli::{finish, Globals};
use crate::db::event_repo;
use crate::error::ChoreError;
use crate::output;

pub fn run(cmd: EventCommands, globals: &Globals) -> i32 {
    let result = match cmd {
        EventCommands::List { after, limit } => run_list(after, limit, globals),
    };
    finish(result, globals.json)
}

fn run_list(after: i64, limit: i64, globals: &Globals) -> Result<i32, ChoreError> {
    if limit < 1 {
        return Err(ChoreError::validation("--limit must be at least 1"));
    }
    let conn = globals.open()?;
    let events = event_repo::list_events(&conn, after, limit)?;

    if globals.json {
        let list: Vec<_> = events.iter().map(output::json::event_json).collect();
        let last_seq = events.last().map(|e| e.seq).unwrap_or(after);
        globals.print_success(json!({ "events": list, "last_seq": last_seq }));
    } else {
        output::text::print_events(&events);
    }
    Ok(0)
}
