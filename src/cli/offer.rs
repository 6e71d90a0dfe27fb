use serde_json::json;

use crate::cli::commands::OfferCommands;
use crate::cli::{finish, Globals};
use crate::config::EngineConfig;
use crate::engine::negotiation;
use crate::error::ChoreError;
use crate::output;

pub fn run(cmd: OfferCommands, globals: &Globals) -> i32 {
    let result = match cmd {
        OfferCommands::Publish { template } => run_publish(&template, globals),
        OfferCommands::Accept { id, member } => run_respond(&id, &member, true, globals),
        OfferCommands::Decline { id, member } => run_respond(&id, &member, false, globals),
        OfferCommands::Sweep => run_sweep(globals),
    };
    finish(result, globals.json)
}

fn run_publish(template_id: &str, globals: &Globals) -> Result<i32, ChoreError> {
    let config = EngineConfig::from_env()?;
    let conn = globals.open()?;
    let offer = negotiation::publish_offer(&conn, template_id, config.offer_deadline, globals.now()?)?;

    if globals.json {
        globals.print_success(json!({ "assignment": output::json::assignment_json(&offer) }));
    } else {
        println!("Published offer {} to {} candidate(s)", offer.id, offer.candidates.len());
    }
    Ok(0)
}

fn run_respond(id: &str, member: &str, accept: bool, globals: &Globals) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    let now = globals.now()?;
    let assignment = if accept {
        negotiation::accept_offer(&conn, id, member, now)?
    } else {
        negotiation::decline_offer(&conn, id, member, now)?
    };

    if globals.json {
        globals.print_success(json!({ "assignment": output::json::assignment_json(&assignment) }));
    } else if accept {
        println!("{member} accepted {}", assignment.id);
    } else {
        println!("{member} declined {} [{}]", assignment.id, assignment.status.as_str());
    }
    Ok(0)
}

fn run_sweep(globals: &Globals) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    let report = negotiation::sweep_expired(&conn, globals.now()?)?;

    if globals.json {
        globals.print_success(json!({ "report": report }));
    } else {
        output::text::print_sweep_report(&report);
    }
    Ok(0)
}
