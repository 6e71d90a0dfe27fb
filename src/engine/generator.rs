//! Assignment generation over a rolling window of dates.
//!
//! Each `(template, date)` pair is an independent unit: it runs in its own
//! transaction and either writes every fan-out row for that date or none.
//! A unit that finds any row for its date (whatever the status or assignee)
//! leaves the date alone, so manual reassignments survive re-runs. The
//! partial unique index on `(template_id, due_date, assignee_id)` resolves
//! races between overlapping runs; no application lock is taken.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, assignment_repo, template_repo};
use crate::engine::evaluator::{self, Evaluation};
use crate::engine::roster::RosterSource;
use crate::error::ChoreError;
use crate::models::{MemberId, TaskTemplate};
use crate::time::{format_date, format_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    NoInstance,
    AlreadyGenerated,
    Created(usize),
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct GenerationReport {
    pub window_start: String,
    pub window_end: String,
    pub households: usize,
    pub units: usize,
    pub created: usize,
    pub already_generated: usize,
    pub no_instance: usize,
    pub failed_units: usize,
    pub failed_templates: usize,
    pub skipped_households: Vec<String>,
}

/// Generate assignments for `window_days` dates starting at `start`.
///
/// Restricted to one household when `household` is given, otherwise every
/// household with an active recurring template. A roster failure skips the
/// household for this run; a failed unit is logged and left for the next
/// run. Neither stops the rest of the batch.
pub fn generate(
    conn: &Connection,
    roster: &dyn RosterSource,
    start: NaiveDate,
    window_days: u32,
    household: Option<&str>,
    now: DateTime<Utc>,
) -> Result<GenerationReport, ChoreError> {
    if window_days == 0 {
        return Err(ChoreError::validation("generation window must be at least one day"));
    }
    let dates: Vec<NaiveDate> = (0..i64::from(window_days))
        .map(|offset| start + Duration::days(offset))
        .collect();
    let mut report = GenerationReport {
        window_start: format_date(dates[0]),
        window_end: format_date(dates[dates.len() - 1]),
        ..GenerationReport::default()
    };

    let households = match household {
        Some(id) => vec![id.to_string()],
        None => template_repo::households_with_recurring_templates(conn)?,
    };

    'households: for household_id in &households {
        report.households += 1;
        let loaded = match template_repo::list_active_templates(conn, household_id) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(household = %household_id, error = %e, "Generation: failed to load templates");
                report.skipped_households.push(household_id.clone());
                continue;
            }
        };
        let mut templates: Vec<TaskTemplate> = Vec::new();
        for template in loaded {
            match template {
                Ok(t) if t.rule_type().is_recurring() => templates.push(t),
                Ok(_) => {}
                Err(e) => {
                    report.failed_templates += 1;
                    tracing::error!(household = %household_id, error = %e, "Generation: skipping unreadable template");
                }
            }
        }
        if templates.is_empty() {
            continue;
        }

        for &date in &dates {
            let members = match roster.roster(household_id, date) {
                Ok(members) => members,
                Err(e) => {
                    tracing::warn!(
                        household = %household_id,
                        date = %date,
                        error = %e,
                        "Generation: roster unavailable, skipping household for this run"
                    );
                    report.skipped_households.push(household_id.clone());
                    continue 'households;
                }
            };

            for template in &templates {
                report.units += 1;
                match generate_unit(conn, template, date, &members, now) {
                    Ok(UnitOutcome::Created(count)) => {
                        report.created += count;
                        tracing::debug!(template = %template.id, date = %date, count, "Generation: created assignments");
                    }
                    Ok(UnitOutcome::AlreadyGenerated) => report.already_generated += 1,
                    Ok(UnitOutcome::NoInstance) => report.no_instance += 1,
                    Err(e) => {
                        report.failed_units += 1;
                        tracing::error!(
                            template = %template.id,
                            date = %date,
                            error = %e,
                            "Generation: unit failed, will retry next run"
                        );
                    }
                }
            }
        }
    }

    tracing::info!(
        window_start = %report.window_start,
        window_end = %report.window_end,
        households = report.households,
        created = report.created,
        already_generated = report.already_generated,
        failed_units = report.failed_units,
        failed_templates = report.failed_templates,
        skipped_households = report.skipped_households.len(),
        "Generation run finished"
    );
    Ok(report)
}

/// Evaluate one template on one date and persist the result if the date has
/// not been generated yet.
pub fn generate_unit(
    conn: &Connection,
    template: &TaskTemplate,
    date: NaiveDate,
    roster: &[MemberId],
    now: DateTime<Utc>,
) -> Result<UnitOutcome, ChoreError> {
    let evaluation = evaluator::evaluate(&template.rule, date, roster);
    let assignees = match evaluation {
        Evaluation::NoInstance | Evaluation::Offered(_) => return Ok(UnitOutcome::NoInstance),
        ref resolved => resolved.assignees(),
    };
    let due_date = format_date(date);
    let created_at = format_timestamp(now);

    db::immediate(conn, |conn| {
        if assignment_repo::has_assignments_for_date(conn, &template.id, &due_date)? {
            return Ok(UnitOutcome::AlreadyGenerated);
        }
        let mut created = 0;
        for member_id in &assignees {
            let id = ulid::Ulid::new().to_string();
            if assignment_repo::insert_recurring(
                conn,
                &id,
                &template.id,
                &template.household_id,
                &due_date,
                member_id,
                &created_at,
            )? {
                created += 1;
            }
        }
        Ok(UnitOutcome::Created(created))
    })
}
