//! End-to-end tests for the `keycycle` binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

const NOW: &str = "2024-06-01T00:00:00Z";

fn keycycle() -> Command {
    let mut cmd = Command::cargo_bin("keycycle").unwrap();
    for var in [
        "KEYCYCLE_CONFIG",
        "KEYCYCLE_LOG",
        "KEYCYCLE_LOG_FORMAT",
        "KEYCYCLE_SCAN__DRY_RUN",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write(dir: &TempDir, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn inventory() -> Value {
    json!({
        "accounts": [{
            "id": "111122223333",
            "name": "prod",
            "email": "security@example.com",
            "identities": {
                "ci-bot": {
                    "tags": { "owner": "ci-team@example.com" },
                    "credentials": [{
                        "owner": "ci-bot",
                        "key_id": "AKIAOLD",
                        "status": "Active",
                        "created_at": "2024-01-01T00:00:00Z",
                        "last_used_at": "2024-05-31T00:00:00Z"
                    }]
                },
                "reporter": {
                    "credentials": [{
                        "owner": "reporter",
                        "key_id": "AKIAREP",
                        "status": "Active",
                        "created_at": "2024-05-01T00:00:00Z",
                        "last_used_at": "2024-05-31T00:00:00Z"
                    }]
                }
            }
        }]
    })
}

#[test]
fn test_evaluate_prints_actions() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "keys.json",
        &json!([{
            "owner": "ci-bot",
            "key_id": "AKIAOLD",
            "status": "Active",
            "created_at": "2024-01-01T00:00:00Z",
            "last_used_at": "2024-05-31T00:00:00Z"
        }]),
    );

    let actions = stdout_json(keycycle().args(["evaluate", "--now", NOW, "--input"]).arg(&input));

    assert_eq!(
        actions,
        json!([{
            "target": { "owner": "ci-bot", "key_id": "AKIAOLD" },
            "kind": "rotate",
            "reason": "EXPIRED_ACTIVE_KEY"
        }])
    );
}

#[test]
fn test_evaluate_force_rotates_fresh_key() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "keys.json",
        &json!([{
            "owner": "reporter",
            "key_id": "AKIAREP",
            "status": "Active",
            "created_at": "2024-05-01T00:00:00Z",
            "last_used_at": "2024-05-31T00:00:00Z"
        }]),
    );

    let actions = stdout_json(
        keycycle()
            .args(["evaluate", "--force", "--now", NOW, "--input"])
            .arg(&input),
    );

    assert_eq!(actions[0]["reason"], "FORCED_ROTATION");
}

#[test]
fn test_evaluate_rejects_three_keys() {
    let dir = TempDir::new().unwrap();
    let key = |id: &str| {
        json!({
            "owner": "svc",
            "key_id": id,
            "status": "Active",
            "created_at": "2024-01-01T00:00:00Z"
        })
    };
    let input = write(&dir, "keys.json", &json!([key("A"), key("B"), key("C")]));

    keycycle()
        .args(["evaluate", "--now", NOW, "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credential set"))
        .stderr(predicate::str::contains("at most 2"));
}

#[test]
fn test_evaluate_rejects_bad_timestamp() {
    keycycle()
        .args(["evaluate", "--input", "keys.json", "--now", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RFC 3339"));
}

#[test]
fn test_scan_enforce_rotates_and_exports() {
    // GIVEN an inventory with one expired key
    let dir = TempDir::new().unwrap();
    let inventory = write(&dir, "inventory.json", &inventory());
    let output = dir.path().join("after.json");
    let notifications = dir.path().join("notifications.json");

    // WHEN it is scanned in enforce mode
    let report = stdout_json(
        keycycle()
            .args(["scan", "--now", NOW, "--inventory"])
            .arg(&inventory)
            .arg("--output")
            .arg(&output)
            .arg("--notifications")
            .arg(&notifications),
    );

    // THEN the report, the exported snapshot and the notifications agree
    assert_eq!(report["reports"][0]["actions"].as_array().unwrap().len(), 1);
    assert!(report["failures"].as_array().unwrap().is_empty());

    let after = read(&output);
    let keys = after["accounts"][0]["identities"]["ci-bot"]["credentials"]
        .as_array()
        .unwrap();
    assert_eq!(keys.len(), 2);

    let sent = read(&notifications);
    assert_eq!(sent[0]["recipient"], "security@example.com");
    assert_eq!(sent[0]["email_template"], "keycycle-enforce");
}

#[test]
fn test_scan_dry_run_leaves_snapshot_unchanged() {
    let dir = TempDir::new().unwrap();
    let inventory = write(&dir, "inventory.json", &inventory());
    let output = dir.path().join("after.json");
    let notifications = dir.path().join("notifications.json");

    keycycle()
        .args(["scan", "--dry-run", "--now", NOW, "--inventory"])
        .arg(&inventory)
        .arg("--output")
        .arg(&output)
        .arg("--notifications")
        .arg(&notifications)
        .assert()
        .success();

    let after = read(&output);
    assert_eq!(
        after["accounts"][0]["identities"]["ci-bot"]["credentials"],
        read(&inventory)["accounts"][0]["identities"]["ci-bot"]["credentials"]
    );
    let sent = read(&notifications);
    assert_eq!(sent[0]["email_template"], "keycycle-audit");
    assert!(
        sent[0]["template_values"]["actions"][0]
            .as_str()
            .unwrap()
            .starts_with("DRYRUN: ROTATE key ci-bot:AKIAOLD.")
    );
}

#[test]
fn test_scan_force_rotate_and_owner_tag_from_env() {
    let dir = TempDir::new().unwrap();
    let inventory = write(&dir, "inventory.json", &inventory());
    let notifications = dir.path().join("notifications.json");

    keycycle()
        .env("KEYCYCLE_SCAN__RESOURCE_OWNER_TAG", "owner")
        .args(["scan", "--dry-run", "--now", NOW, "--force-rotate", "reporter", "--inventory"])
        .arg(&inventory)
        .arg("--notifications")
        .arg(&notifications)
        .assert()
        .success();

    let sent = read(&notifications);
    let recipients: Vec<&str> = sent
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["recipient"].as_str().unwrap())
        .collect();
    assert_eq!(recipients, vec!["security@example.com", "ci-team@example.com"]);
    assert_eq!(
        sent[0]["template_values"]["actions"].as_array().unwrap().len(),
        2
    );
}

#[test]
fn test_scan_missing_inventory_fails() {
    keycycle()
        .args(["scan", "--inventory", "/nonexistent/inventory.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_config_layers_file_and_env() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("keycycle.toml");
    std::fs::write(
        &file,
        "[policy]\nrotation_period = \"30days\"\n\n[scan]\nmax_concurrent_accounts = 2\n",
    )
    .unwrap();

    keycycle()
        .env("KEYCYCLE_SCAN__DRY_RUN", "true")
        .arg("config")
        .arg("--config")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("rotation_period = \"30days\""))
        .stdout(predicate::str::contains("max_concurrent_accounts = 2"))
        .stdout(predicate::str::contains("dry_run = true"));
}

#[test]
fn test_config_missing_file_fails() {
    keycycle()
        .args(["config", "--config", "/nonexistent/keycycle.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_completions() {
    keycycle()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keycycle"));
}
