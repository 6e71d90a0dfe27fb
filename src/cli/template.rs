use serde_json::json;

use crate::cli::commands::TemplateCommands;
use crate::cli::{finish, Globals};
use crate::db::{self, household_repo, template_repo};
use crate::error::ChoreError;
use crate::models::{validate_template_fields, RuleConfig, RuleType};
use crate::output;
use crate::time::format_timestamp;

pub fn run(cmd: TemplateCommands, globals: &Globals) -> i32 {
    let result = match cmd {
        TemplateCommands::Add { household, name, rule_type, config, points, inactive } => {
            run_add(&household, &name, &rule_type, &config, points, !inactive, globals)
        }
        TemplateCommands::List { household } => run_list(&household, globals),
        TemplateCommands::Show { id } => run_show(&id, globals),
        TemplateCommands::Update { id, name, points, config, active } => {
            run_update(&id, name.as_deref(), points, config.as_deref(), active, globals)
        }
    };
    finish(result, globals.json)
}

fn parse_rule_type(s: &str) -> Result<RuleType, ChoreError> {
    RuleType::from_str(s).ok_or_else(|| {
        ChoreError::validation(format!(
            "Unknown rule type '{s}' (expected daily, repeating, weekly_rotation or single)"
        ))
    })
}

fn run_add(
    household: &str,
    name: &str,
    rule_type: &str,
    config: &str,
    points: i64,
    active: bool,
    globals: &Globals,
) -> Result<i32, ChoreError> {
    // Validate everything before touching the database.
    validate_template_fields(name, points)?;
    let rule = RuleConfig::parse(parse_rule_type(rule_type)?, config)?;

    let conn = globals.open()?;
    household_repo::get_household(&conn, household)?;
    let id = ulid::Ulid::new().to_string();
    let now = format_timestamp(globals.now()?);
    let template =
        template_repo::create_template(&conn, &id, household, name.trim(), points, active, &rule, &now)?;
    tracing::info!(template = %template.id, household = %household, rule_type = rule.rule_type().as_str(), "Template created");

    if globals.json {
        globals.print_success(json!({ "template": output::json::template_json(&template) }));
    } else {
        println!("Added template: {} ({})", template.name, template.id);
    }
    Ok(0)
}

fn run_list(household: &str, globals: &Globals) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    household_repo::get_household(&conn, household)?;
    let templates = template_repo::list_templates(&conn, household)?;

    if globals.json {
        let list: Vec<_> = templates.iter().map(output::json::template_json).collect();
        globals.print_success(json!({ "templates": list }));
    } else {
        output::text::print_template_list(&templates);
    }
    Ok(0)
}

fn run_show(id: &str, globals: &Globals) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    let template = template_repo::get_template(&conn, id)?;

    if globals.json {
        globals.print_success(json!({ "template": output::json::template_json(&template) }));
    } else {
        output::text::print_template(&template);
    }
    Ok(0)
}

fn run_update(
    id: &str,
    name: Option<&str>,
    points: Option<i64>,
    config: Option<&str>,
    active: Option<bool>,
    globals: &Globals,
) -> Result<i32, ChoreError> {
    let conn = globals.open()?;
    let now = format_timestamp(globals.now()?);

    let template = db::immediate(&conn, |conn| {
        let current = template_repo::get_template(conn, id)?;
        validate_template_fields(
            name.map(str::trim).unwrap_or(current.name.as_str()),
            points.unwrap_or(current.point_value),
        )?;
        // The rule type is fixed at creation; a new config must match it.
        let rule = config
            .map(|payload| RuleConfig::parse(current.rule_type(), payload))
            .transpose()?;
        template_repo::update_template(
            conn,
            id,
            name.map(str::trim),
            points,
            active,
            rule.as_ref(),
            &now,
        )
    })?;
    tracing::info!(template = %template.id, "Template updated");

    if globals.json {
        globals.print_success(json!({ "template": output::json::template_json(&template) }));
    } else {
        println!("Updated template: {} ({})", template.name, template.id);
    }
    Ok(0)
}
