//! Periodic driver: generation over the configured window, then the offer
//! expiry sweep. A failing cycle is logged and the loop carries on.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::engine::generator::{self, GenerationReport};
use crate::engine::negotiation::{self, SweepReport};
use crate::engine::roster::RosterSource;
use crate::error::ChoreError;

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub generation: GenerationReport,
    pub sweep: SweepReport,
}

/// One generation run starting at `now`'s UTC date, followed by a sweep.
pub fn run_cycle(
    conn: &Connection,
    roster: &dyn RosterSource,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<CycleReport, ChoreError> {
    let generation = generator::generate(
        conn,
        roster,
        now.date_naive(),
        config.generation_window_days,
        None,
        now,
    )?;
    let sweep = negotiation::sweep_expired(conn, now)?;
    Ok(CycleReport { generation, sweep })
}

/// Run cycles until `iterations` is reached (forever when `None`), sleeping
/// the configured interval between them. Returns the number of cycles that
/// failed.
pub fn run(
    conn: &Connection,
    roster: &dyn RosterSource,
    config: &EngineConfig,
    iterations: Option<u64>,
) -> u64 {
    let mut completed = 0u64;
    let mut failed = 0u64;
    tracing::info!(
        window_days = config.generation_window_days,
        interval_minutes = config.generator_interval_minutes,
        "Scheduler started"
    );
    loop {
        match run_cycle(conn, roster, config, Utc::now()) {
            Ok(report) => tracing::debug!(
                created = report.generation.created,
                expired = report.sweep.expired.len(),
                "Scheduler cycle finished"
            ),
            Err(e) => {
                failed += 1;
                tracing::error!(error = %e, transient = e.is_transient(), "Scheduler cycle failed");
            }
        }
        completed += 1;
        if iterations.is_some_and(|limit| completed >= limit) {
            break;
        }
        std::thread::sleep(config.interval());
    }
    tracing::info!(cycles = completed, failed, "Scheduler stopped");
    failed
}
