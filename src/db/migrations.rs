use rusqlite::Connection;

use crate::error::ChoreError;

pub fn run_migrations(conn: &Connection) -> Result<(), ChoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS households (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS household_members (
            household_id TEXT NOT NULL REFERENCES households(id) ON DELETE CASCADE,
            member_id TEXT NOT NULL,
            joined_on TEXT NOT NULL,
            left_on TEXT,
            PRIMARY KEY (household_id, member_id),
            CHECK (left_on IS NULL OR left_on > joined_on)
        );

        CREATE TABLE IF NOT EXISTS task_templates (
            id TEXT PRIMARY KEY,
            household_id TEXT NOT NULL REFERENCES households(id),
            name TEXT NOT NULL,
            point_value INTEGER NOT NULL CHECK (point_value > 0),
            active INTEGER NOT NULL DEFAULT 1 CHECK (active IN (0, 1)),
            rule_type TEXT NOT NULL
                CHECK (rule_type IN ('daily', 'repeating', 'weekly_rotation', 'single')),
            rule_config TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS task_assignments (
            id TEXT PRIMARY KEY,
            template_id TEXT NOT NULL REFERENCES task_templates(id),
            household_id TEXT NOT NULL REFERENCES households(id),
            due_date TEXT,
            assignee_id TEXT,
            status TEXT NOT NULL
                CHECK (status IN ('pending', 'offered', 'accepted', 'declined_by_all', 'completed', 'expired')),
            deadline TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            accepted_at TEXT,
            completed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS offer_candidates (
            assignment_id TEXT NOT NULL REFERENCES task_assignments(id),
            member_id TEXT NOT NULL,
            declined_at TEXT,
            PRIMARY KEY (assignment_id, member_id)
        );

        CREATE TABLE IF NOT EXISTS assignment_events (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            assignment_id TEXT NOT NULL REFERENCES task_assignments(id),
            template_id TEXT NOT NULL,
            household_id TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('accepted', 'completed')),
            member_id TEXT NOT NULL,
            points INTEGER NOT NULL,
            occurred_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS ux_assignments_recurring
            ON task_assignments(template_id, due_date, assignee_id)
            WHERE due_date IS NOT NULL;
        DROP INDEX IF EXISTS ux_assignments_live_offer;
        CREATE UNIQUE INDEX IF NOT EXISTS ux_assignments_live_instance
            ON task_assignments(template_id)
            WHERE status IN ('offered', 'accepted');
        CREATE INDEX IF NOT EXISTS idx_templates_household
            ON task_templates(household_id, active);
        CREATE INDEX IF NOT EXISTS idx_assignments_household_date
            ON task_assignments(household_id, due_date);
        CREATE INDEX IF NOT EXISTS idx_assignments_offer_deadline
            ON task_assignments(deadline)
            WHERE status = 'offered';
        ",
    )?;
    Ok(())
}
