use rusqlite::{params, Connection, OptionalExtension};

use crate::error::ChoreError;
use crate::models::{RuleConfig, RuleType, TaskTemplate};

const TEMPLATE_COLUMNS: &str =
    "id, household_id, name, point_value, active, rule_type, rule_config, created_at, updated_at";

#[allow(clippy::too_many_arguments)]
pub fn create_template(
    conn: &Connection,
    id: &str,
    household_id: &str,
    name: &str,
    point_value: i64,
    active: bool,
    rule: &RuleConfig,
    now: &str,
) -> Result<TaskTemplate, ChoreError> {
    conn.execute(
        "INSERT INTO task_templates
            (id, household_id, name, point_value, active, rule_type, rule_config, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            id,
            household_id,
            name,
            point_value,
            active,
            rule.rule_type().as_str(),
            rule.payload().to_string(),
            now
        ],
    )?;
    get_template(conn, id)
}

pub fn get_template(conn: &Connection, id: &str) -> Result<TaskTemplate, ChoreError> {
    let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM task_templates WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], read_template_row)
        .optional()?
        .ok_or_else(|| ChoreError::template_not_found(id))?;
    row.into_template()
}

pub fn list_templates(conn: &Connection, household_id: &str) -> Result<Vec<TaskTemplate>, ChoreError> {
    let sql = format!(
        "SELECT {TEMPLATE_COLUMNS} FROM task_templates
         WHERE household_id = ?1 ORDER BY created_at ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![household_id], read_template_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(TemplateRow::into_template).collect()
}

/// Active templates of a household, each parsed on its own so that one
/// corrupt rule does not hide the others.
pub fn list_active_templates(
    conn: &Connection,
    household_id: &str,
) -> Result<Vec<Result<TaskTemplate, ChoreError>>, ChoreError> {
    let sql = format!(
        "SELECT {TEMPLATE_COLUMNS} FROM task_templates
         WHERE household_id = ?1 AND active = 1 ORDER BY created_at ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![household_id], read_template_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().map(TemplateRow::into_template).collect())
}

/// Households that own at least one active recurring template.
pub fn households_with_recurring_templates(conn: &Connection) -> Result<Vec<String>, ChoreError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT household_id FROM task_templates
         WHERE active = 1 AND rule_type != 'single'
         ORDER BY household_id ASC",
    )?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Apply the given changes. Existing assignments are never touched: the
/// new rule only governs dates that have not been generated yet.
pub fn update_template(
    conn: &Connection,
    id: &str,
    name: Option<&str>,
    point_value: Option<i64>,
    active: Option<bool>,
    rule: Option<&RuleConfig>,
    now: &str,
) -> Result<TaskTemplate, ChoreError> {
    let (rule_type, rule_config) = match rule {
        Some(rule) => (
            Some(rule.rule_type().as_str()),
            Some(rule.payload().to_string()),
        ),
        None => (None, None),
    };
    let updated = conn.execute(
        "UPDATE task_templates SET
            name = COALESCE(?1, name),
            point_value = COALESCE(?2, point_value),
            active = COALESCE(?3, active),
            rule_type = COALESCE(?4, rule_type),
            rule_config = COALESCE(?5, rule_config),
            updated_at = ?6
         WHERE id = ?7",
        params![name, point_value, active, rule_type, rule_config, now, id],
    )?;
    if updated == 0 {
        return Err(ChoreError::template_not_found(id));
    }
    get_template(conn, id)
}

struct TemplateRow {
    id: String,
    household_id: String,
    name: String,
    point_value: i64,
    active: bool,
    rule_type: String,
    rule_config: String,
    created_at: String,
    updated_at: String,
}

impl TemplateRow {
    fn into_template(self) -> Result<TaskTemplate, ChoreError> {
        let rule_type = RuleType::from_str(&self.rule_type).ok_or_else(|| {
            ChoreError::database(format!(
                "template {} has unknown rule type '{}'",
                self.id, self.rule_type
            ))
        })?;
        let rule = RuleConfig::parse(rule_type, &self.rule_config).map_err(|e| {
            ChoreError::database(format!("template {} has a corrupt rule: {}", self.id, e.message))
        })?;
        Ok(TaskTemplate {
            id: self.id,
            household_id: self.household_id,
            name: self.name,
            point_value: self.point_value,
            active: self.active,
            rule,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn read_template_row(row: &rusqlite::Row) -> rusqlite::Result<TemplateRow> {
    Ok(TemplateRow {
        id: row.get(0)?,
        household_id: row.get(1)?,
        name: row.get(2)?,
        point_value: row.get(3)?,
        active: row.get(4)?,
        rule_type: row.get(5)?,
        rule_config: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
