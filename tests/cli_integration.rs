#[allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

// ─── helpers ───────────────────────────────────────────────────────

const NOW: &str = "2025-01-06T08:00:00Z";

struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("create tempdir");
        Self { dir }
    }

    fn db_path(&self) -> PathBuf {
        self.dir.path().join("choreboard.db")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("choreboard").expect("binary");
        cmd.current_dir(self.dir.path())
            .env("CHOREBOARD_DB", self.db_path())
            .env("RUST_LOG", "off")
            .env_remove("CHOREBOARD_GENERATION_WINDOW_DAYS")
            .env_remove("CHOREBOARD_GENERATOR_INTERVAL_MINUTES")
            .env_remove("CHOREBOARD_OFFER_DEADLINE_HOURS");
        cmd
    }

    fn run_with(&self, cmd: &mut Command, args: &[&str]) -> (Option<i32>, Value) {
        let mut a: Vec<&str> = args.to_vec();
        a.push("--json");
        let output = cmd.args(&a).output().expect("run");
        let stdout = String::from_utf8_lossy(&output.stdout);
        let v = serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("parse JSON failed: {e}\nstdout: {stdout}"));
        (output.status.code(), v)
    }

    fn run_json(&self, args: &[&str]) -> (Option<i32>, Value) {
        self.run_with(&mut self.cmd(), args)
    }

    fn run_ok(&self, args: &[&str]) -> Value {
        let (code, v) = self.run_json(args);
        assert_eq!(v["success"], true, "expected success=true: {v}");
        assert_eq!(code, Some(0));
        v
    }

    fn run_err(&self, args: &[&str]) -> Value {
        let (code, v) = self.run_json(args);
        assert_eq!(v["success"], false, "expected success=false: {v}");
        assert_eq!(code, Some(1), "expected exit code 1: {v}");
        v
    }

    fn run_conflict(&self, args: &[&str]) -> Value {
        let (code, v) = self.run_json(args);
        assert_eq!(v["success"], false, "expected success=false: {v}");
        assert_eq!(code, Some(2), "expected exit code 2: {v}");
        v
    }

    /// Initialized database with household `home` and the given members,
    /// all on the roster from 2025-01-01.
    fn household(members: &[&str]) -> Self {
        let env = Self::new();
        env.run_ok(&["init"]);
        env.run_ok(&["household", "add", "home", "--name", "Home"]);
        for m in members {
            env.run_ok(&["member", "add", "home", m, "--joined-on", "2025-01-01"]);
        }
        env
    }

    fn add_template(&self, rule_type: &str, config: &str) -> String {
        let v = self.run_ok(&[
            "template", "add", "home", "Chore", "--rule-type", rule_type, "--config", config,
            "--points", "3", "--now", NOW,
        ]);
        v["data"]["template"]["id"].as_str().unwrap().to_string()
    }

    fn generate(&self, today: &str, days: &str) -> Value {
        let v = self.run_ok(&["generate", "--today", today, "--window-days", days, "--now", NOW]);
        v["data"]["report"].clone()
    }

    fn assignments(&self, args: &[&str]) -> Vec<Value> {
        let mut a = vec!["assignment", "list"];
        a.extend_from_slice(args);
        let v = self.run_ok(&a);
        v["data"]["assignments"].as_array().unwrap().clone()
    }

    fn publish(&self, template: &str) -> String {
        let v = self.run_ok(&["offer", "publish", template, "--now", NOW]);
        v["data"]["assignment"]["id"].as_str().unwrap().to_string()
    }
}

fn assignees(rows: &[Value]) -> Vec<String> {
    rows.iter()
        .map(|r| r["assignee_id"].as_str().unwrap().to_string())
        .collect()
}

// ─── 1. init ───────────────────────────────────────────────────────

#[test]
fn test_init() {
    let env = TestEnv::new();
    let v = env.run_ok(&["init"]);
    let path = v["data"]["path"].as_str().unwrap();
    assert!(path.ends_with("choreboard.db"));
    assert!(PathBuf::from(path).exists());
}

#[test]
fn test_init_idempotent() {
    let env = TestEnv::new();
    env.run_ok(&["init"]);
    let v = env.run_ok(&["init"]);
    assert!(v["data"]["path"].as_str().unwrap().contains("choreboard.db"));
}

#[test]
fn test_init_required_before_commands() {
    let env = TestEnv::new();
    let v = env.run_err(&["household", "list"]);
    assert_eq!(v["error"]["code"], "NOT_INITIALIZED");
}

#[test]
fn test_db_flag_overrides_env() {
    let env = TestEnv::new();
    let other = env.dir.path().join("nested/other.db");
    let other = other.to_str().unwrap();
    env.run_ok(&["init", "--db", other]);
    env.run_ok(&["household", "add", "flat", "--db", other]);
    // The env database was never initialized.
    let v = env.run_err(&["household", "list"]);
    assert_eq!(v["error"]["code"], "NOT_INITIALIZED");
    let v = env.run_ok(&["household", "list", "--db", other]);
    assert_eq!(v["data"]["households"][0]["id"], "flat");
}

// ─── 2. households, members, templates ─────────────────────────────

#[test]
fn test_member_roster_as_of() {
    let env = TestEnv::household(&["a", "b"]);
    env.run_ok(&["member", "remove", "home", "b", "--left-on", "2025-01-08"]);

    let v = env.run_ok(&["member", "list", "home", "--as-of", "2025-01-07"]);
    assert_eq!(v["data"]["roster"], serde_json::json!(["a", "b"]));
    let v = env.run_ok(&["member", "list", "home", "--as-of", "2025-01-08"]);
    assert_eq!(v["data"]["roster"], serde_json::json!(["a"]));

    let v = env.run_ok(&["member", "list", "home"]);
    let members = v["data"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[1]["left_on"], "2025-01-08");
}

#[test]
fn test_household_not_found() {
    let env = TestEnv::household(&[]);
    let v = env.run_err(&["member", "add", "nowhere", "a"]);
    assert_eq!(v["error"]["code"], "HOUSEHOLD_NOT_FOUND");
    let v = env.run_err(&["template", "add", "nowhere", "Dishes", "--rule-type", "daily"]);
    assert_eq!(v["error"]["code"], "HOUSEHOLD_NOT_FOUND");
}

#[test]
fn test_template_validation_errors() {
    let env = TestEnv::household(&["a"]);
    let cases: &[&[&str]] = &[
        &["template", "add", "home", "X", "--rule-type", "hourly"],
        &["template", "add", "home", "X", "--rule-type", "repeating", "--config", r#"{"days_of_week":[]}"#],
        &["template", "add", "home", "X", "--rule-type", "repeating", "--config", r#"{"days_of_week":[7]}"#],
        &["template", "add", "home", "X", "--rule-type", "weekly_rotation", "--config",
          r#"{"rotation_kind":"alternating","assigned_members":["a"]}"#],
        &["template", "add", "home", "X", "--rule-type", "single", "--config", r#"{"candidates":[]}"#],
        &["template", "add", "home", "X", "--rule-type", "daily", "--config", r#"{"candidates":["a"]}"#],
        &["template", "add", "home", "X", "--rule-type", "daily", "--points", "0"],
        &["template", "add", "home", " ", "--rule-type", "daily"],
    ];
    for args in cases {
        let v = env.run_err(args);
        assert_eq!(v["error"]["code"], "VALIDATION_ERROR", "args: {args:?}");
    }
    let v = env.run_ok(&["template", "list", "home"]);
    assert!(v["data"]["templates"].as_array().unwrap().is_empty());
}

#[test]
fn test_template_show_and_update() {
    let env = TestEnv::household(&["a"]);
    let id = env.add_template("repeating", r#"{"days_of_week":[1]}"#);

    let v = env.run_ok(&["template", "show", &id]);
    assert_eq!(v["data"]["template"]["rule_type"], "repeating");
    assert_eq!(v["data"]["template"]["rule_config"]["days_of_week"], serde_json::json!([1]));
    assert_eq!(v["data"]["template"]["point_value"], 3);

    let v = env.run_ok(&[
        "template", "update", &id, "--name", "Bins", "--config", r#"{"days_of_week":[2,4]}"#,
    ]);
    assert_eq!(v["data"]["template"]["name"], "Bins");
    assert_eq!(v["data"]["template"]["rule_config"]["days_of_week"], serde_json::json!([2, 4]));

    // A config of another rule type is rejected.
    let v = env.run_err(&["template", "update", &id, "--config", r#"{"candidates":["a"]}"#]);
    assert_eq!(v["error"]["code"], "VALIDATION_ERROR");

    let v = env.run_err(&["template", "show", "missing"]);
    assert_eq!(v["error"]["code"], "TEMPLATE_NOT_FOUND");
}

// ─── 3. generation ─────────────────────────────────────────────────

#[test]
fn test_daily_fans_out_per_member() {
    let env = TestEnv::household(&["a", "b"]);
    let id = env.add_template("daily", "");

    let report = env.generate("2025-01-06", "1");
    assert_eq!(report["created"], 2);

    let rows = env.assignments(&["--template", &id]);
    assert_eq!(assignees(&rows), vec!["a", "b"]);
    assert!(rows.iter().all(|r| r["status"] == "pending" && r["due_date"] == "2025-01-06"));
}

#[test]
fn test_generate_is_idempotent() {
    let env = TestEnv::household(&["a", "b"]);
    let id = env.add_template("daily", "");

    let first = env.generate("2025-01-06", "7");
    assert_eq!(first["created"], 14);
    assert_eq!(first["window_end"], "2025-01-12");
    let second = env.generate("2025-01-06", "7");
    assert_eq!(second["created"], 0);
    assert_eq!(second["already_generated"], 7);

    assert_eq!(env.assignments(&["--template", &id]).len(), 14);
}

#[test]
fn test_repeating_only_on_listed_days() {
    let env = TestEnv::household(&["a"]);
    let id = env.add_template("repeating", r#"{"days_of_week":[2]}"#);

    env.generate("2025-01-06", "7");
    let rows = env.assignments(&["--template", &id]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["due_date"], "2025-01-07");
}

#[test]
fn test_rotation_alternates_by_iso_week() {
    let env = TestEnv::household(&["a", "b"]);
    let id = env.add_template(
        "weekly_rotation",
        r#"{"rotation_kind":"alternating","assigned_members":["a","b"]}"#,
    );

    env.generate("2025-01-06", "14");
    let week2 = env.assignments(&["--template", &id, "--date", "2025-01-06"]);
    let week3 = env.assignments(&["--template", &id, "--date", "2025-01-13"]);
    assert_eq!(assignees(&week2), vec!["a"]);
    assert_eq!(assignees(&week3), vec!["b"]);
    assert_eq!(env.assignments(&["--template", &id, "--assignee", "a"]).len(), 7);
}

#[test]
fn test_reassignment_survives_generation() {
    let env = TestEnv::household(&["a", "b"]);
    let id = env.add_template("daily", r#"{"assigned_members":["a"]}"#);
    env.generate("2025-01-06", "1");
    let row = env.assignments(&["--template", &id]).remove(0);
    let row_id = row["id"].as_str().unwrap();

    let v = env.run_ok(&["assignment", "reassign", row_id, "b"]);
    assert_eq!(v["data"]["assignment"]["assignee_id"], "b");

    env.generate("2025-01-06", "1");
    assert_eq!(assignees(&env.assignments(&["--template", &id])), vec!["b"]);
}

// ─── 4. single-task negotiation ────────────────────────────────────

#[test]
fn test_offer_accept_then_taken() {
    let env = TestEnv::household(&["a", "b"]);
    let template = env.add_template("single", r#"{"candidates":["a","b"]}"#);
    let offer = env.publish(&template);

    let v = env.run_ok(&["offer", "accept", &offer, "a", "--now", NOW]);
    assert_eq!(v["data"]["assignment"]["status"], "accepted");
    assert_eq!(v["data"]["assignment"]["assignee_id"], "a");

    let v = env.run_conflict(&["offer", "accept", &offer, "b", "--now", NOW]);
    assert_eq!(v["error"]["code"], "OFFER_TAKEN");
    assert!(v["error"]["message"].as_str().unwrap().contains("already taken"));
}

#[test]
fn test_offer_exhaustion() {
    let env = TestEnv::household(&["a", "b", "c"]);
    let template = env.add_template("single", r#"{"candidates":["a","b","c"]}"#);
    let offer = env.publish(&template);

    for member in ["a", "b"] {
        let v = env.run_ok(&["offer", "decline", &offer, member]);
        assert_eq!(v["data"]["assignment"]["status"], "offered");
    }
    let v = env.run_ok(&["offer", "decline", &offer, "c"]);
    assert_eq!(v["data"]["assignment"]["status"], "declined_by_all");
    assert_eq!(v["data"]["assignment"]["declined_by"], serde_json::json!(["a", "b", "c"]));

    // A new offer may follow once the previous one is terminal.
    env.publish(&template);
}

#[test]
fn test_offer_active_blocks_second_publish() {
    let env = TestEnv::household(&["a"]);
    let template = env.add_template("single", r#"{"candidates":["a"]}"#);
    let offer = env.publish(&template);
    let v = env.run_conflict(&["offer", "publish", &template]);
    assert_eq!(v["error"]["code"], "OFFER_ACTIVE");

    // Still live once accepted; free again after completion.
    env.run_ok(&["offer", "accept", &offer, "a", "--now", NOW]);
    let v = env.run_conflict(&["offer", "publish", &template]);
    assert_eq!(v["error"]["code"], "OFFER_ACTIVE");
    env.run_ok(&["assignment", "complete", &offer, "a", "--now", NOW]);
    env.publish(&template);
}

#[test]
fn test_offer_expiry_sweep() {
    let env = TestEnv::household(&["a", "b"]);
    let template = env.add_template("single", r#"{"candidates":["a","b"]}"#);
    let (code, v) = env.run_with(
        env.cmd().env("CHOREBOARD_OFFER_DEADLINE_HOURS", "1"),
        &["offer", "publish", &template, "--now", NOW],
    );
    assert_eq!(code, Some(0), "{v}");
    assert_eq!(v["data"]["assignment"]["deadline"], "2025-01-06T09:00:00.000Z");
    let offer = v["data"]["assignment"]["id"].as_str().unwrap().to_string();

    let v = env.run_ok(&["offer", "sweep", "--now", "2025-01-06T08:30:00Z"]);
    assert!(v["data"]["report"]["expired"].as_array().unwrap().is_empty());

    let v = env.run_ok(&["offer", "sweep", "--now", "2025-01-06T10:00:00Z"]);
    assert_eq!(v["data"]["report"]["expired"], serde_json::json!([offer.clone()]));

    let v = env.run_conflict(&["offer", "accept", &offer, "a", "--now", "2025-01-06T10:00:00Z"]);
    assert_eq!(v["error"]["code"], "OFFER_EXPIRED");
    let v = env.run_ok(&["assignment", "show", &offer]);
    assert_eq!(v["data"]["assignment"]["status"], "expired");
}

#[test]
fn test_offer_rejects_non_candidates_and_recurring_templates() {
    let env = TestEnv::household(&["a", "b"]);
    let single = env.add_template("single", r#"{"candidates":["a"]}"#);
    let offer = env.publish(&single);
    let v = env.run_err(&["offer", "accept", &offer, "b"]);
    assert_eq!(v["error"]["code"], "NOT_CANDIDATE");

    let daily = env.add_template("daily", "");
    let v = env.run_err(&["offer", "publish", &daily]);
    assert_eq!(v["error"]["code"], "VALIDATION_ERROR");
}

// ─── 5. completion and events ──────────────────────────────────────

#[test]
fn test_completion_emits_events() {
    let env = TestEnv::household(&["a", "b"]);
    let single = env.add_template("single", r#"{"candidates":["a","b"]}"#);
    let offer = env.publish(&single);
    env.run_ok(&["offer", "accept", &offer, "b", "--now", NOW]);
    let v = env.run_ok(&["assignment", "complete", &offer, "b", "--now", NOW]);
    assert_eq!(v["data"]["assignment"]["status"], "completed");

    let v = env.run_ok(&["events", "list"]);
    let events = v["data"]["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["kind"], "accepted");
    assert_eq!(events[1]["kind"], "completed");
    assert_eq!(events[1]["points"], 3);
    assert_eq!(events[1]["member_id"], "b");

    let first_seq = events[0]["seq"].as_i64().unwrap().to_string();
    let v = env.run_ok(&["events", "list", "--after", &first_seq]);
    assert_eq!(v["data"]["events"].as_array().unwrap().len(), 1);
    assert_eq!(v["data"]["last_seq"], events[1]["seq"]);

    let v = env.run_conflict(&["assignment", "complete", &offer, "b"]);
    assert_eq!(v["error"]["code"], "OFFER_CLOSED");
}

#[test]
fn test_assignment_not_found() {
    let env = TestEnv::household(&[]);
    let v = env.run_err(&["assignment", "show", "nope"]);
    assert_eq!(v["error"]["code"], "ASSIGNMENT_NOT_FOUND");
}

// ─── 6. scheduler, config and exit codes ───────────────────────────

#[test]
fn test_run_single_iteration() {
    let env = TestEnv::household(&["a"]);
    env.add_template("daily", "");
    let (code, v) = env.run_with(
        env.cmd().env("CHOREBOARD_GENERATION_WINDOW_DAYS", "2"),
        &["run", "--iterations", "1"],
    );
    assert_eq!(code, Some(0), "{v}");
    assert_eq!(v["data"]["failed_cycles"], 0);
    assert_eq!(env.assignments(&[]).len(), 2);
}

#[test]
fn test_invalid_config_is_reported() {
    let env = TestEnv::household(&["a"]);
    let (code, v) = env.run_with(
        env.cmd().env("CHOREBOARD_GENERATION_WINDOW_DAYS", "0"),
        &["generate"],
    );
    assert_eq!(code, Some(1));
    assert_eq!(v["error"]["code"], "CONFIG_ERROR");
}

#[test]
fn test_text_error_goes_to_stderr() {
    let env = TestEnv::new();
    env.cmd()
        .args(["household", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Run `choreboard init` first"));
}

#[test]
fn test_text_output() {
    let env = TestEnv::household(&["a"]);
    env.cmd()
        .args(["household", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("home - Home"));
}
