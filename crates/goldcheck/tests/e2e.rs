//! End-to-end tests for the goldcheck CLI.
//!
//! Each test builds a throwaway project in a temp directory: `test/` with
//! fixtures, `answer/` with reference answers, and a small shell target that
//! echoes its fixture back (or hangs when the fixture says `hang`).

#![cfg(unix)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TARGET: &str = r#"input=$(cat)
case "$input" in
  hang) exec sleep 10 ;;
  *) printf '%s' "$input" ;;
esac
"#;

/// Get a Command for the goldcheck binary.
#[allow(deprecated)]
fn goldcheck_cmd(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("goldcheck").unwrap();
    cmd.current_dir(project.path())
        .env_remove("NO_COLOR")
        .env_remove("GOLDCHECK_BIN")
        .env_remove("RUST_LOG")
        .args(["--bin", "sh target.sh", "--no-color", "--timeout-ms", "2000"]);
    cmd
}

/// `cases` is `(id, target output, reference answer)`.
fn project(cases: &[(&str, &str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("target.sh"), TARGET).unwrap();
    fs::create_dir(dir.path().join("test")).unwrap();
    fs::create_dir(dir.path().join("answer")).unwrap();
    for (id, output, answer) in cases {
        fs::write(dir.path().join("test").join(format!("{id}.txt")), output).unwrap();
        fs::write(dir.path().join("answer").join(format!("{id}.json")), answer).unwrap();
    }
    dir
}

fn exists(dir: &TempDir, rel: &str) -> bool {
    dir.path().join(rel).exists()
}

// =============================================================================
// Core Scenarios
// =============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_all_fixtures_pass() {
        let dir = project(&[("t1", r#"[{"MEM":{"0":1}}]"#, r#"[{"MEM":{"0":1}}]"#)]);

        goldcheck_cmd(&dir)
            .assert()
            .success()
            .stdout(predicate::str::contains("All correct!"));
    }

    #[test]
    fn test_value_mismatch_shows_diff() {
        let dir = project(&[
            ("t1", r#"[{"MEM":{"0":1}}]"#, r#"[{"MEM":{"0":1}}]"#),
            ("t2", r#"[{"MEM":{"1":2}}]"#, r#"[{"MEM":{"1":3}}]"#),
        ]);

        goldcheck_cmd(&dir)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Wrong answer for t2"))
            .stdout(predicate::str::contains("Your answer:\n[{\"MEM\": {\"1\": 2}}]"))
            .stdout(predicate::str::contains("Correct answer:\n[{\"MEM\": {\"1\": 3}}]"))
            .stdout(predicate::str::contains(r#"[{"MEM": {"1": {+3+}[-2-]}}]"#))
            .stdout(predicate::str::contains("All correct!").not());
    }

    #[test]
    fn test_hanging_target_times_out() {
        let dir = project(&[
            ("t1", r#"[{"MEM":{"0":1}}]"#, r#"[{"MEM":{"0":1}}]"#),
            ("t3", "hang", r#"[{"MEM":{"0":1}}]"#),
            ("t4", r#"[{"MEM":{"0":9}}]"#, r#"[{"MEM":{"0":1}}]"#),
        ]);

        goldcheck_cmd(&dir)
            .args(["--timeout-ms", "200"])
            .assert()
            .code(2)
            .stdout(predicate::str::contains("t3 timed out after 200ms"))
            .stdout(predicate::str::contains("Wrong answer").not());
    }

    #[test]
    fn test_malformed_output_is_a_mismatch() {
        let dir = project(&[("t4", "this is not json {", r#"[{"MEM":{"0":1}}]"#)]);

        goldcheck_cmd(&dir)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Wrong answer for t4"))
            .stdout(predicate::str::contains("<undecodable:"));
    }

    #[test]
    fn test_yaml_output_with_integer_keys_matches() {
        let dir = project(&[("t5", "- MEM: {0: 1, 16: 255}\n", r#"[{"MEM":{"0":1,"16":255}}]"#)]);

        goldcheck_cmd(&dir)
            .assert()
            .success()
            .stdout(predicate::str::contains("All correct!"));
    }
}

// =============================================================================
// Fatal Errors
// =============================================================================

mod fatal {
    use super::*;

    #[test]
    fn test_missing_canonical_attribute_is_fatal() {
        let dir = project(&[("t6", r#"[{"PC":1}]"#, r#"[{"MEM":{"0":1}}]"#)]);

        goldcheck_cmd(&dir)
            .assert()
            .code(2)
            .stdout(predicate::str::contains("has no `MEM` attribute"))
            .stdout(predicate::str::contains(r#"[{"PC": 1}]"#));
    }

    #[test]
    fn test_missing_fixture_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("target.sh"), TARGET).unwrap();

        goldcheck_cmd(&dir).assert().code(2);
    }

    #[test]
    fn test_missing_program() {
        let dir = project(&[("t1", "[]", "[]")]);

        goldcheck_cmd(&dir)
            .args(["--bin", "./definitely-not-here"])
            .assert()
            .code(2)
            .stdout(predicate::str::contains("Execution failed"));
    }

    #[test]
    fn test_strict_answers_rejects_bad_answer() {
        let dir = project(&[("t1", "[]", "not an answer {")]);

        goldcheck_cmd(&dir).assert().code(1);
        goldcheck_cmd(&dir)
            .arg("--strict-answers")
            .assert()
            .code(2)
            .stdout(predicate::str::contains("reference answer for t1"));
    }
}

// =============================================================================
// Scratch Directory
// =============================================================================

mod scratch {
    use super::*;

    #[test]
    fn test_scratch_removed_by_default() {
        let dir = project(&[("t1", r#"[{"MEM":{"0":1}}]"#, r#"[{"MEM":{"0":1}}]"#)]);

        goldcheck_cmd(&dir).assert().success();
        assert!(!exists(&dir, "temp_answer"));
    }

    #[test]
    fn test_scratch_removed_after_fatal_error() {
        let dir = project(&[("t3", "hang", "[]")]);

        goldcheck_cmd(&dir).args(["--timeout-ms", "100"]).assert().code(2);
        assert!(!exists(&dir, "temp_answer"));
    }

    #[test]
    fn test_save_mid_keeps_outputs() {
        let dir = project(&[("t1", r#"[{"MEM":{"0":1}}]"#, r#"[{"MEM":{"0":1}}]"#)]);

        goldcheck_cmd(&dir).arg("--save-mid").assert().success();
        let saved = fs::read_to_string(dir.path().join("temp_answer/t1.json")).unwrap();
        assert_eq!(saved, r#"[{"MEM":{"0":1}}]"#);
    }
}

// =============================================================================
// Run-All Mode and Reports
// =============================================================================

mod keep_going {
    use super::*;

    fn mixed() -> TempDir {
        project(&[
            ("t1", r#"[{"MEM":{"0":1}}]"#, r#"[{"MEM":{"0":1}}]"#),
            ("t2", r#"[{"MEM":{"1":2}}]"#, r#"[{"MEM":{"1":3}}]"#),
            ("t4", "garbage {", r#"[{"MEM":{"0":1}}]"#),
        ])
    }

    #[test]
    fn test_first_failure_stops_early() {
        goldcheck_cmd(&mixed())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Wrong answer for t2"))
            .stdout(predicate::str::contains("t4").not());
    }

    #[test]
    fn test_keep_going_reports_every_failure() {
        goldcheck_cmd(&mixed())
            .arg("--keep-going")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Wrong answer for t2"))
            .stdout(predicate::str::contains("Wrong answer for t4"))
            .stdout(predicate::str::contains("1 passed, 2 failed (of 3)"));
    }

    #[test]
    fn test_json_report() {
        let dir = mixed();

        goldcheck_cmd(&dir)
            .args(["--keep-going", "--report", "report.json"])
            .assert()
            .code(1);

        let text = fs::read_to_string(dir.path().join("report.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["passed"], 1);
        assert_eq!(json["failed"], 2);
        assert_eq!(json["cases"][0]["fixture"], "t1");
        assert_eq!(json["cases"][0]["status"], "pass");
        assert_eq!(json["cases"][0]["exit_code"], 0);
        assert_eq!(json["cases"][1]["status"], "mismatch");
        assert!(json["cases"][1]["similarity"].as_f64().unwrap() > 0.9);
    }

    #[test]
    fn test_report_written_when_run_halts_on_error() {
        let dir = project(&[
            ("t1", r#"[{"MEM":{"0":1}}]"#, r#"[{"MEM":{"0":1}}]"#),
            ("t3", "hang", r#"[{"MEM":{"0":1}}]"#),
            ("t4", r#"[{"MEM":{"0":1}}]"#, r#"[{"MEM":{"0":1}}]"#),
        ]);

        goldcheck_cmd(&dir)
            .args(["--timeout-ms", "200", "--report", "report.json"])
            .assert()
            .code(2)
            .stdout(predicate::str::contains("t3 timed out after 200ms"));

        let text = fs::read_to_string(dir.path().join("report.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["passed"], 1);
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["cases"].as_array().unwrap().len(), 2);
        assert_eq!(json["cases"][1]["fixture"], "t3");
        assert_eq!(json["cases"][1]["status"], "error");
        assert_eq!(json["cases"][1]["error_kind"], "timeout");
        assert!(json["cases"][1]["message"].as_str().unwrap().contains("timed out"));
    }

    #[test]
    fn test_unified_diff_style() {
        goldcheck_cmd(&mixed())
            .args(["--diff-style", "unified"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("--- expected"))
            .stdout(predicate::str::contains("+++ actual"));
    }
}

// =============================================================================
// Configuration File
// =============================================================================

mod config_file {
    use super::*;

    #[test]
    fn test_config_supplies_layout() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("target.sh"), TARGET).unwrap();
        fs::create_dir(dir.path().join("cases")).unwrap();
        fs::create_dir(dir.path().join("golden")).unwrap();
        fs::write(dir.path().join("cases/a.in"), r#"[{"RAM":{"0":1}}]"#).unwrap();
        fs::write(dir.path().join("golden/a.json"), r#"[{"RAM":{"0":1}}]"#).unwrap();
        fs::write(
            dir.path().join("goldcheck.toml"),
            "fixtures_dir = \"cases\"\nanswers_dir = \"golden\"\ncanonical_key = \"RAM\"\n",
        )
        .unwrap();

        goldcheck_cmd(&dir)
            .args(["--config", "goldcheck.toml"])
            .assert()
            .success()
            .stdout(predicate::str::contains("All correct!"));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let dir = project(&[("t1", "[]", "[]")]);
        fs::write(dir.path().join("bad.toml"), "no_such_option = 1\n").unwrap();

        goldcheck_cmd(&dir).args(["--config", "bad.toml"]).assert().code(2);
    }
}
