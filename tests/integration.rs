//! Integration tests for the rolo query subcommand

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

const SEED: &str = r#"[
    {"first_name": "Zara", "last_name": "Khan", "phone_numbers": [{"number": "5552109876"}]},
    {"first_name": "Aarav", "last_name": "Patel", "phone_numbers": [{"number": "1234567890"}]},
    {"first_name": "Aanya", "last_name": "Sharma", "phone_numbers": [{"number": "9876543210"}]},
    {"first_name": "José", "last_name": "García", "phone_numbers": [{"number": "5550000000"}]},
    {"first_name": "Tara", "last_name": "Rao", "phone_numbers": []},
    {"first_name": "", "last_name": "Lone", "phone_numbers": [{"number": "5551112222"}]}
]"#;

/// Test environment with an isolated config and contacts file
struct TestEnv {
    _temp_dir: TempDir,
    config_path: PathBuf,
    contacts_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        Self::with_seed(SEED)
    }

    fn with_seed(seed: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let contacts_path = temp_dir.path().join("contacts.json");
        fs::write(&contacts_path, seed).unwrap();
        Self {
            _temp_dir: temp_dir,
            config_path,
            contacts_path,
        }
    }

    fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).unwrap();
    }

    /// Run rolo with this test env's config and contacts file
    fn rolo(&self) -> AssertCommand {
        let mut cmd = rolo_cmd();
        cmd.args(["--config", self.config_path.to_str().unwrap()]);
        cmd.args(["--contacts", self.contacts_path.to_str().unwrap()]);
        cmd
    }

    /// Run rolo with only the config file (no --contacts flag)
    fn rolo_config_only(&self) -> AssertCommand {
        let mut cmd = rolo_cmd();
        cmd.args(["--config", self.config_path.to_str().unwrap()]);
        cmd
    }
}

/// Get the rolo binary command
fn rolo_cmd() -> AssertCommand {
    AssertCommand::cargo_bin("rolo").unwrap()
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_query_empty_matches_all_with_sections() {
    let env = TestEnv::new();

    env.rolo()
        .args(["query", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 6 contact(s) matching \"\""))
        .stdout(predicate::str::contains("# A"))
        .stdout(predicate::str::contains("# Z"))
        .stdout(predicate::str::contains("Aarav Patel\t1234567890"));
}

#[test]
fn test_query_output_is_sorted_by_first_name() {
    let env = TestEnv::new();

    let output = env.rolo().args(["query", ""]).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    let aanya = stdout.find("Aanya Sharma").unwrap();
    let aarav = stdout.find("Aarav Patel").unwrap();
    let zara = stdout.find("Zara Khan").unwrap();
    assert!(aanya < aarav, "Aanya must sort before Aarav");
    assert!(aarav < zara, "sections must come out in sorted order");
}

#[test]
fn test_query_filters_case_insensitively() {
    let env = TestEnv::new();

    env.rolo()
        .args(["query", "PATEL"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 contact(s) matching \"PATEL\""))
        .stdout(predicate::str::contains("# A"))
        .stdout(predicate::str::contains("Aarav Patel\t1234567890"))
        .stdout(predicate::str::contains("Aanya Sharma").not());
}

#[test]
fn test_query_matches_across_name_boundary() {
    let env = TestEnv::new();

    env.rolo()
        .args(["query", "aarav p"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aarav Patel"));
}

#[test]
fn test_query_matches_transliterated_names() {
    let env = TestEnv::new();

    env.rolo()
        .args(["query", "jose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("José García\t5550000000"));
}

#[test]
fn test_query_no_matches() {
    let env = TestEnv::new();

    env.rolo()
        .args(["query", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches for \"zzz\""))
        .stdout(predicate::str::contains("# ").not());
}

#[test]
fn test_query_contact_without_phone_prints_bare_name() {
    let env = TestEnv::new();

    env.rolo()
        .args(["query", "tara"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tara Rao\n"))
        .stdout(predicate::str::contains("Tara Rao\t").not());
}

#[test]
fn test_query_empty_first_name_groups_under_sentinel() {
    let env = TestEnv::new();

    env.rolo()
        .args(["query", "lone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# #"));
}

#[test]
fn test_query_worked_example() {
    let env = TestEnv::with_seed(
        r#"[
            {"first_name": "Aanya", "last_name": "Sharma", "phone_numbers": [{"number": "9876543210"}]},
            {"first_name": "Aarav", "last_name": "Patel", "phone_numbers": [{"number": "1234567890"}]}
        ]"#,
    );

    let output = env.rolo().args(["query", ""]).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "Found 2 contact(s) matching \"\"",
            "# A",
            "Aanya Sharma\t9876543210",
            "Aarav Patel\t1234567890",
        ]
    );
}

#[test]
fn test_builtin_fixture_used_without_seed_flag() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    rolo_cmd()
        .args(["--config", config_path.to_str().unwrap()])
        .args(["query", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 20 contact(s)"));
}

// =============================================================================
// Config and Seed Tests
// =============================================================================

#[test]
fn test_contacts_path_from_config() {
    let env = TestEnv::new();
    env.write_config(&format!(
        "contacts_path = \"{}\"\n",
        env.contacts_path.display()
    ));

    env.rolo_config_only()
        .args(["query", "patel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aarav Patel"));
}

#[test]
fn test_missing_seed_file_fails() {
    let env = TestEnv::new();

    env.rolo_config_only()
        .args(["--contacts", "/nonexistent/contacts.json"])
        .args(["query", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read contacts file"));
}

#[test]
fn test_malformed_seed_file_fails() {
    let env = TestEnv::new();
    fs::write(&env.contacts_path, "not json").unwrap();

    env.rolo()
        .args(["query", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse contacts file"));
}

#[test]
fn test_unknown_config_key_warns_but_succeeds() {
    let env = TestEnv::new();
    env.write_config("mystery = true\n");

    env.rolo()
        .args(["query", "patel"])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown configuration key `mystery`"));
}

#[test]
fn test_key_binding_collision_fails_startup() {
    let env = TestEnv::new();
    env.write_config("[keys.list]\nedit = \"x\"\n");

    env.rolo()
        .args(["query", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key binding collision"));
}
