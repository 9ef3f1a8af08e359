#[allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ─── helpers ───────────────────────────────────────────────────────

const TZ: &str = "Asia/Yekaterinburg";

struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("create tempdir");
        Self { dir }
    }

    fn db_path(&self) -> PathBuf {
        self.dir.path().join("shiftops.db")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("shiftops").expect("binary");
        cmd.current_dir(self.dir.path());
        cmd.env("SHIFTOPS_DB", self.db_path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut a: Vec<&str> = args.to_vec();
        a.push("--json");
        let output = self.cmd().args(&a).output().expect("run");
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("parse JSON failed: {e}\nstdout: {stdout}"))
    }

    fn run_ok(&self, args: &[&str]) -> Value {
        let v = self.run_json(args);
        assert_eq!(v["success"], true, "expected success=true: {v}");
        v
    }

    fn run_err(&self, args: &[&str]) -> Value {
        let v = self.run_json(args);
        assert_eq!(v["success"], false, "expected success=false: {v}");
        v
    }

    /// Run at a pinned business-local instant.
    fn at(&self, now: &str, args: &[&str]) -> Value {
        let mut a: Vec<&str> = args.to_vec();
        a.extend(["--now", now]);
        self.run_ok(&a)
    }

    fn load_generators(&self, content: &str) -> Value {
        let p = self.dir.path().join("_generators.json");
        fs::write(&p, content).expect("write generators file");
        let output = self
            .cmd()
            .args(["generator", "load", "--json", "--now", "2024-03-01 08:00"])
            .pipe_stdin(&p)
            .unwrap()
            .output()
            .expect("generator load");
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("parse JSON failed: {e}\nstdout: {stdout}"))
    }

    fn add_dealership(&self, name: &str) -> String {
        let v = self.run_ok(&["dealership", "add", name]);
        id_of(&v["data"]["dealership"])
    }

    fn add_user(&self, name: &str, dealership: &str) -> String {
        let v = self.run_ok(&["user", "add", name, "--dealership", dealership]);
        id_of(&v["data"]["user"])
    }

    fn add_task(&self, title: &str, deadline: &str, assignees: &[&str]) -> String {
        let mut args = vec![
            "task", "add", title, "--dealership", "North",
            "--appear", "2024-03-01 08:00", "--deadline", deadline,
        ];
        for a in assignees {
            args.extend(["--assignee", a]);
        }
        let v = self.run_ok(&args);
        id_of(&v["data"]["task"])
    }

    fn respond(&self, task: &str, user: &str, status: &str, now: &str) -> Value {
        self.at(now, &["respond", task, "--user", user, "--status", status])
    }

    fn task_status(&self, task: &str, now: &str) -> String {
        let v = self.at(now, &["task", "show", task]);
        v["data"]["task"]["status"].as_str().unwrap().to_string()
    }

    fn generated(&self, now: &str) -> usize {
        let v = self.at(now, &["sweep", "generate"]);
        v["data"]["generated"].as_array().unwrap().len()
    }
}

fn id_of(v: &Value) -> String {
    v["id"].as_str().unwrap().to_string()
}

struct Staff {
    ann: String,
    bob: String,
    cid: String,
}

fn setup(env: &TestEnv) -> Staff {
    env.run_ok(&["init", "--timezone", TZ]);
    let north = env.add_dealership("North");
    Staff {
        ann: env.add_user("Ann", &north),
        bob: env.add_user("Bob", &north),
        cid: env.add_user("Cid", &north),
    }
}

// ─── init & config ─────────────────────────────────────────────────

#[test]
fn test_init_creates_db_and_config() {
    let env = TestEnv::new();
    let v = env.run_ok(&["init", "--timezone", TZ]);
    assert_eq!(v["data"]["timezone"], TZ);
    assert!(env.db_path().exists());
    let config = fs::read_to_string(env.dir.path().join("shiftops.db.config.json")).unwrap();
    assert!(config.contains(TZ));
}

#[test]
fn test_commands_require_init() {
    let env = TestEnv::new();
    let v = env.run_err(&["dealership", "list"]);
    assert_eq!(v["error"]["code"], "NOT_INITIALIZED");
}

#[test]
fn test_init_rejects_unknown_timezone() {
    let env = TestEnv::new();
    let v = env.run_err(&["init", "--timezone", "Mars/Olympus"]);
    assert_eq!(v["error"]["code"], "INVALID_TIMEZONE");
    assert!(!env.db_path().exists());
}

#[test]
fn test_text_output_and_exit_code() {
    let env = TestEnv::new();
    env.cmd()
        .args(["init", "--timezone", TZ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized shiftops"));
    env.cmd()
        .args(["task", "show", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task not found"));
}

// ─── generation ────────────────────────────────────────────────────

#[test]
fn test_daily_generator_once_per_day() {
    let env = TestEnv::new();
    let staff = setup(&env);
    env.run_ok(&[
        "generator", "add", "Open the showroom", "--dealership", "North",
        "--recurrence", "daily", "--appear", "09:00", "--deadline", "10:00",
        "--start", "2024-03-01", "--assignee", &staff.ann,
    ]);

    assert_eq!(env.generated("2024-03-04 08:59"), 0);
    assert_eq!(env.generated("2024-03-04 09:15"), 1);
    assert_eq!(env.generated("2024-03-04 18:00"), 0);
    assert_eq!(env.generated("2024-03-05 09:00"), 1);

    let v = env.at("2024-03-05 09:30", &["task", "list"]);
    let tasks = v["data"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    // 09:00 in UTC+5 is 04:00Z.
    assert_eq!(tasks[0]["appear_at"], "2024-03-05T04:00:00Z");
    assert_eq!(tasks[0]["deadline_at"], "2024-03-05T05:00:00Z");
}

#[test]
fn test_weekly_friday_generator() {
    let env = TestEnv::new();
    let staff = setup(&env);
    env.run_ok(&[
        "generator", "add", "Weekly stock count", "--dealership", "North",
        "--recurrence", "weekly", "--weekday", "5", "--appear", "10:00", "--deadline", "18:00",
        "--start", "2024-03-01", "--assignee", &staff.ann,
    ]);

    assert_eq!(env.generated("2024-03-01 11:00"), 1);
    assert_eq!(env.generated("2024-03-01 15:00"), 0);
    assert_eq!(env.generated("2024-03-06 11:00"), 0);
    assert_eq!(env.generated("2024-03-08 11:00"), 1);
}

#[test]
fn test_monthly_last_day_generator() {
    let env = TestEnv::new();
    let staff = setup(&env);
    env.run_ok(&[
        "generator", "add", "Month-end report", "--dealership", "North",
        "--recurrence", "monthly", "--month-day", "-1", "--appear", "09:00",
        "--start", "2024-01-01", "--assignee", &staff.ann,
    ]);

    assert_eq!(env.generated("2024-01-30 10:00"), 0);
    assert_eq!(env.generated("2024-01-31 10:00"), 1);
    assert_eq!(env.generated("2024-02-28 10:00"), 0);
    assert_eq!(env.generated("2024-02-29 10:00"), 1);
}

#[test]
fn test_deadline_before_appear_rolls_to_next_day() {
    let env = TestEnv::new();
    let staff = setup(&env);
    env.run_ok(&[
        "generator", "add", "Night watch", "--dealership", "North",
        "--appear", "22:00", "--deadline", "02:00", "--start", "2024-03-01",
        "--assignee", &staff.bob,
    ]);
    assert_eq!(env.generated("2024-03-01 22:30"), 1);
    let v = env.at("2024-03-01 22:30", &["task", "list"]);
    assert_eq!(v["data"]["tasks"][0]["deadline_at"], "2024-03-01T21:00:00Z");
}

#[test]
fn test_paused_generator_does_not_generate() {
    let env = TestEnv::new();
    let staff = setup(&env);
    let v = env.run_ok(&[
        "generator", "add", "Coffee machine", "--dealership", "North",
        "--start", "2024-03-01", "--assignee", &staff.ann,
    ]);
    let gen_id = id_of(&v["data"]["generator"]);

    env.run_ok(&["generator", "pause", &gen_id]);
    assert_eq!(env.generated("2024-03-04 12:00"), 0);
    env.run_ok(&["generator", "resume", &gen_id]);
    assert_eq!(env.generated("2024-03-04 12:00"), 1);

    let v = env.at("2024-03-04 12:00", &["generator", "show", &gen_id]);
    assert_eq!(v["data"]["generator"]["last_generated_at"], "2024-03-04");
    assert_eq!(v["data"]["tasks"].as_array().unwrap().len(), 1);
}

#[test]
fn test_inactive_assignee_is_skipped_and_last_one_blocks() {
    let env = TestEnv::new();
    let staff = setup(&env);
    env.run_ok(&[
        "generator", "add", "Lot walk", "--dealership", "North", "--start", "2024-03-01",
        "--assignee", &staff.ann, "--assignee", &staff.bob,
    ]);
    env.run_ok(&["user", "deactivate", &staff.bob]);
    env.at("2024-03-04 12:00", &["sweep", "generate"]);
    let v = env.at("2024-03-04 12:00", &["task", "list"]);
    let task_id = v["data"]["tasks"][0]["id"].as_str().unwrap().to_string();
    let v = env.at("2024-03-04 12:00", &["task", "show", &task_id]);
    assert_eq!(v["data"]["task"]["assignees"], serde_json::json!([staff.ann]));

    env.run_ok(&["user", "deactivate", &staff.ann]);
    let v = env.at("2024-03-05 12:00", &["sweep", "generate"]);
    assert_eq!(v["data"]["generated"].as_array().unwrap().len(), 0);
    assert_eq!(v["data"]["errors"]["integrity"], 1);
}

#[test]
fn test_generator_add_validates_definition() {
    let env = TestEnv::new();
    let staff = setup(&env);
    let v = env.run_err(&[
        "generator", "add", "Broken", "--dealership", "North", "--recurrence", "weekly",
        "--assignee", &staff.ann,
    ]);
    assert_eq!(v["error"]["code"], "INVALID_RECURRENCE");
    let v = env.run_err(&[
        "generator", "add", "Broken", "--dealership", "North", "--recurrence", "monthly",
        "--month-day", "32", "--assignee", &staff.ann,
    ]);
    assert_eq!(v["error"]["code"], "INVALID_RECURRENCE");
    let v = env.run_ok(&["generator", "list"]);
    assert_eq!(v["data"]["generators"].as_array().unwrap().len(), 0);
}

#[test]
fn test_generator_load_is_atomic() {
    let env = TestEnv::new();
    let staff = setup(&env);
    let bad = serde_json::json!({
        "generators": [
            {"dealership": "North", "title": "Ok", "appear_time": "09:00", "assignees": [staff.ann]},
            {"dealership": "North", "title": "Bad", "recurrence": "weekly", "appear_time": "09:00",
             "assignees": [staff.ann]}
        ]
    });
    let v = env.load_generators(&bad.to_string());
    assert_eq!(v["success"], false);
    let v = env.run_ok(&["generator", "list"]);
    assert_eq!(v["data"]["generators"].as_array().unwrap().len(), 0);

    let good = serde_json::json!({
        "generators": [
            {"dealership": "North", "title": "Ok", "appear_time": "09:00", "assignees": [staff.ann]},
            {"dealership": "North", "title": "Fridays", "recurrence": "weekly", "days_of_week": [5],
             "appear_time": "10:00", "deadline_time": "18:00", "assignees": [staff.bob, staff.cid]}
        ]
    });
    let v = env.load_generators(&good.to_string());
    assert_eq!(v["success"], true, "{v}");
    assert_eq!(v["data"]["generators_created"], 2);
    assert_eq!(v["data"]["generators"][0]["start_date"], "2024-03-01");
}

// ─── status resolution ─────────────────────────────────────────────

#[test]
fn test_group_task_pending_review_and_completed_late() {
    let env = TestEnv::new();
    let s = setup(&env);
    let task = env.add_task("Prepare demo cars", "2024-03-01 13:00", &[&s.ann, &s.bob, &s.cid]);

    assert_eq!(env.task_status(&task, "2024-03-01 09:00"), "pending");
    env.respond(&task, &s.ann, "acknowledged", "2024-03-01 09:30");
    assert_eq!(env.task_status(&task, "2024-03-01 09:31"), "acknowledged");

    env.respond(&task, &s.ann, "completed", "2024-03-01 11:00");
    env.respond(&task, &s.bob, "completed", "2024-03-01 12:00");
    env.respond(&task, &s.cid, "pending_review", "2024-03-01 12:30");
    assert_eq!(env.task_status(&task, "2024-03-01 14:00"), "pending_review");

    env.respond(&task, &s.cid, "completed", "2024-03-01 14:30");
    assert_eq!(env.task_status(&task, "2024-03-01 15:00"), "completed_late");

    let v = env.at("2024-03-01 15:00", &["task", "show", &task]);
    let responses = v["data"]["task"]["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 3);
    assert!(responses.iter().all(|r| r["status"] == "completed"));
    assert_eq!(v["data"]["task"]["completed_at"], "2024-03-01T09:30:00Z");
}

#[test]
fn test_overdue_and_status_filter() {
    let env = TestEnv::new();
    let s = setup(&env);
    let late = env.add_task("Call back leads", "2024-03-01 12:00", &[&s.ann]);
    let fine = env.add_task("Wash cars", "2024-03-01 18:00", &[&s.bob]);
    env.respond(&late, &s.ann, "acknowledged", "2024-03-01 10:00");

    let v = env.at("2024-03-01 13:00", &["task", "list", "--status", "overdue"]);
    let tasks = v["data"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], late.as_str());
    assert_eq!(env.task_status(&fine, "2024-03-01 13:00"), "pending");

    let v = env.run_err(&["task", "list", "--status", "done"]);
    assert_eq!(v["error"]["code"], "VALIDATION_ERROR");
}

#[test]
fn test_respond_requires_assignment() {
    let env = TestEnv::new();
    let s = setup(&env);
    let task = env.add_task("Tire check", "2024-03-01 18:00", &[&s.ann]);
    let v = env.run_err(&["respond", &task, "--user", &s.bob, "--status", "completed"]);
    assert_eq!(v["error"]["code"], "NOT_ASSIGNED");
    let v = env.run_err(&["respond", &task, "--user", &s.ann, "--status", "overdue"]);
    assert_eq!(v["error"]["code"], "VALIDATION_ERROR");
}

// ─── archival ──────────────────────────────────────────────────────

#[test]
fn test_completion_archive_after_cooldown() {
    let env = TestEnv::new();
    let s = setup(&env);
    let task = env.add_task("Restock brochures", "2024-03-01 18:00", &[&s.ann]);
    env.respond(&task, &s.ann, "completed", "2024-03-01 12:00");

    let v = env.at("2024-03-01 12:04", &["sweep", "archive"]);
    assert_eq!(v["data"]["archived"].as_array().unwrap().len(), 0);
    let v = env.at("2024-03-01 12:05", &["sweep", "archive"]);
    assert_eq!(v["data"]["archived"][0]["task_id"], task.as_str());
    assert_eq!(v["data"]["archived"][0]["reason"], "completed");

    let v = env.run_err(&["respond", &task, "--user", &s.ann, "--status", "rejected"]);
    assert_eq!(v["error"]["code"], "TASK_ARCHIVED");
    let v = env.at("2024-03-01 13:00", &["task", "list"]);
    assert_eq!(v["data"]["tasks"].as_array().unwrap().len(), 0);
    let v = env.at("2024-03-01 13:00", &["task", "list", "--all"]);
    assert_eq!(v["data"]["tasks"][0]["archive_reason"], "completed");
}

#[test]
fn test_archive_day_diverges_between_dealerships() {
    let env = TestEnv::new();
    let s = setup(&env);
    let south = env.add_dealership("South");
    let dan = env.add_user("Dan", &south);

    let north_task = env.add_task("North close-out", "2024-03-01 18:00", &[&s.ann]);
    let v = env.run_ok(&[
        "task", "add", "South close-out", "--dealership", "South",
        "--appear", "2024-03-01 08:00", "--deadline", "2024-03-01 18:00", "--assignee", &dan,
    ]);
    let south_task = id_of(&v["data"]["task"]);
    env.respond(&north_task, &s.ann, "completed", "2024-03-01 10:00");
    env.respond(&south_task, &dan, "completed", "2024-03-01 10:00");

    env.run_ok(&["setting", "set", "auto_archive_day_of_week", "5", "--dealership", "North"]);
    env.run_ok(&["setting", "set", "auto_archive_day_of_week", "6", "--dealership", "South"]);

    let v = env.at("2024-03-01 20:00", &["sweep", "archive"]);
    let archived = v["data"]["archived"].as_array().unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0]["task_id"], north_task.as_str());
    assert_eq!(v["data"]["completion_skipped"], serde_json::json!([south]));

    let v = env.at("2024-03-02 09:00", &["sweep", "archive"]);
    assert_eq!(v["data"]["archived"][0]["task_id"], south_task.as_str());
}

#[test]
fn test_general_expiry() {
    let env = TestEnv::new();
    let s = setup(&env);
    env.run_ok(&["setting", "set", "task_archive_days", "2"]);
    let task = env.add_task("Forgotten", "2024-03-01 12:00", &[&s.ann]);

    let v = env.at("2024-03-03 12:00", &["sweep", "archive"]);
    assert_eq!(v["data"]["archived"].as_array().unwrap().len(), 0);
    let v = env.at("2024-03-03 12:01", &["sweep", "archive"]);
    assert_eq!(v["data"]["archived"][0]["task_id"], task.as_str());
    assert_eq!(v["data"]["archived"][0]["reason"], "expired");
}

#[test]
fn test_shift_sweep_archives_once() {
    let env = TestEnv::new();
    let s = setup(&env);
    let v = env.run_ok(&["shift", "open", "--user", &s.ann, "--at", "2024-03-01 08:00"]);
    let shift = id_of(&v["data"]["shift"]);
    env.run_ok(&["shift", "close", &shift, "--at", "2024-03-01 20:00"]);

    let unfinished = env.add_task("Unfinished", "2024-03-01 13:00", &[&s.ann, &s.bob]);
    let late = env.add_task("Late", "2024-03-01 13:00", &[&s.ann]);
    let tomorrow = env.add_task("Tomorrow", "2024-03-02 13:00", &[&s.ann]);
    env.respond(&unfinished, &s.ann, "completed", "2024-03-01 12:00");
    env.respond(&late, &s.ann, "completed", "2024-03-01 15:00");

    let v = env.at("2024-03-01 21:00", &["sweep", "shifts"]);
    assert_eq!(v["data"]["waiting"], 1);
    assert_eq!(v["data"]["processed_shifts"].as_array().unwrap().len(), 0);

    let v = env.at("2024-03-01 22:00", &["sweep", "shifts"]);
    assert_eq!(v["data"]["processed_shifts"], serde_json::json!([shift]));
    let archived = v["data"]["archived"].as_array().unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0]["task_id"], unfinished.as_str());
    assert_eq!(archived[0]["reason"], "expired_after_shift");

    let v = env.at("2024-03-02 22:00", &["sweep", "shifts"]);
    assert_eq!(v["data"]["processed_shifts"].as_array().unwrap().len(), 0);
    assert_eq!(v["data"]["archived"].as_array().unwrap().len(), 0);

    let v = env.run_ok(&["shift", "list"]);
    assert_eq!(v["data"]["shifts"][0]["archived_tasks_processed"], true);
    assert_eq!(env.task_status(&late, "2024-03-02 22:00"), "completed_late");
    let v = env.at("2024-03-02 22:00", &["task", "show", &tomorrow]);
    assert_eq!(v["data"]["task"]["is_active"], true);

    let v = env.run_err(&["shift", "close", &shift]);
    assert_eq!(v["error"]["code"], "SHIFT_ALREADY_CLOSED");
}

#[test]
fn test_sweep_all_is_idempotent() {
    let env = TestEnv::new();
    let s = setup(&env);
    env.run_ok(&[
        "generator", "add", "Daily huddle", "--dealership", "North", "--start", "2024-03-01",
        "--appear", "08:30", "--deadline", "09:00", "--assignee", &s.ann,
    ]);
    let first = env.at("2024-03-04 10:00", &["sweep", "all"]);
    assert_eq!(first["data"]["generation"]["generated"].as_array().unwrap().len(), 1);
    let second = env.at("2024-03-04 10:00", &["sweep", "all"]);
    assert_eq!(second["data"]["generation"]["generated"].as_array().unwrap().len(), 0);
    assert_eq!(second["data"]["archival"]["archived"].as_array().unwrap().len(), 0);
}

// ─── settings ──────────────────────────────────────────────────────

#[test]
fn test_settings_scope_and_validation() {
    let env = TestEnv::new();
    setup(&env);

    let v = env.run_ok(&["setting", "get", "task_archive_days", "--dealership", "North"]);
    assert_eq!(v["data"]["value"], "30");
    assert_eq!(v["data"]["source"], "default");

    env.run_ok(&["setting", "set", "task_archive_days", "14"]);
    let v = env.run_ok(&["setting", "get", "task_archive_days", "--dealership", "North"]);
    assert_eq!(v["data"]["value"], "14");
    assert_eq!(v["data"]["source"], "global");

    env.run_ok(&["setting", "set", "task_archive_days", "7", "--dealership", "North"]);
    let v = env.run_ok(&["setting", "get", "task_archive_days", "--dealership", "North"]);
    assert_eq!(v["data"]["value"], "7");
    assert_eq!(v["data"]["source"], "dealership");

    let v = env.run_err(&["setting", "set", "task_archive_days", "-1"]);
    assert_eq!(v["error"]["code"], "INVALID_SETTING");
    let v = env.run_err(&["setting", "set", "auto_archive_day_of_week", "funday"]);
    assert_eq!(v["error"]["code"], "INVALID_SETTING");
    let v = env.run_err(&["setting", "set", "task_archive_days", "200000000000"]);
    assert_eq!(v["error"]["code"], "INVALID_SETTING");
    let v = env.run_err(&["setting", "set", "colour", "blue"]);
    assert_eq!(v["error"]["code"], "VALIDATION_ERROR");

    let v = env.run_ok(&["setting", "list", "--dealership", "North"]);
    assert_eq!(v["data"]["settings"].as_array().unwrap().len(), 2);
}

// ─── references ────────────────────────────────────────────────────

#[test]
fn test_dealership_reference_by_name_and_prefix() {
    let env = TestEnv::new();
    env.run_ok(&["init"]);
    let id = env.add_dealership("Central");
    let v = env.run_ok(&["user", "add", "Eve", "--dealership", &id[..10]]);
    assert_eq!(v["data"]["user"]["dealership_id"], id.as_str());
    let v = env.run_err(&["user", "add", "Eve", "--dealership", "Nowhere"]);
    assert_eq!(v["error"]["code"], "DEALERSHIP_NOT_FOUND");
    let v = env.run_err(&["dealership", "add", "Central"]);
    assert_eq!(v["error"]["code"], "VALIDATION_ERROR");
}
