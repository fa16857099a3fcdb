// Drives the baton binary against a throwaway project directory

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn baton(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("baton").unwrap();
    cmd.current_dir(dir.path())
        .env("BATON_STORE__DIRECTORY", dir.path().join("projects"))
        .env("BATON_STORE__BACKEND", "file")
        .env("BATON_NOTIFICATIONS__SLACK_ENABLED", "false")
        .env_remove("RUST_LOG");
    cmd
}

fn create_project(dir: &TempDir) -> String {
    baton(dir)
        .args([
            "create",
            "--name",
            "Mobile App Redesign",
            "--owner",
            "John Doe",
            "--stage",
            "Product",
            "--stage",
            "Design",
            "--member",
            "Dhruv Patel:Product",
            "--member",
            "Ayush Kumar:Design",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Created project Mobile App Redesign"));

    let output = baton(dir).args(["list", "--json"]).output().unwrap();
    let projects: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    projects[0]["id"].as_str().unwrap().to_string()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    baton(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("handoff"))
        .stdout(predicate::str::contains("tick"));
}

#[test]
fn test_empty_list_gives_guidance() {
    let dir = TempDir::new().unwrap();
    baton(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects yet"));
}

#[test]
fn test_handoff_flow() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir);

    baton(&dir)
        .args(["handoff", &id, "m1", "https://docs.test/prd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next in line: Ayush Kumar"));

    baton(&dir)
        .args(["handoff", &id, "m2", "https://figma.test/file"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All stages completed"));

    let output = baton(&dir).args(["show", &id, "--json"]).output().unwrap();
    let project: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(project["status"], "completed");
    assert_eq!(project["currentStage"], 2);
}

#[test]
fn test_out_of_order_handoff_fails() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir);

    baton(&dir)
        .args(["handoff", &id, "m2", "https://figma.test/file"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of order"));
}

#[test]
fn test_handoff_as_someone_else_is_denied() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir);

    baton(&dir)
        .args(["handoff", &id, "m1", "https://docs.test/prd", "--as", "Ayush Kumar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied"));

    baton(&dir)
        .args(["handoff", &id, "m1", "https://docs.test/prd", "--as", "Root", "--admin"])
        .assert()
        .success();
}

#[test]
fn test_task_commands() {
    let dir = TempDir::new().unwrap();
    let id = create_project(&dir);

    baton(&dir)
        .args([
            "task",
            "create",
            &id,
            "--title",
            "Write PRD",
            "--description",
            "Requirements for the redesign",
            "--assign-to",
            "m1",
            "--by",
            "John Doe",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task-1"));

    baton(&dir)
        .args(["task", "complete", &id, "task-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid task transition"));

    baton(&dir)
        .args(["task", "start", &id, "task-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("in-progress"));
}

#[test]
fn test_config_redacts_token() {
    let dir = TempDir::new().unwrap();
    baton(&dir)
        .env("BATON_NOTIFICATIONS__SLACK_BOT_TOKEN", "xoxb-secret")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("xoxb-secret").not());
}
