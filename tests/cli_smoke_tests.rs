use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const BIN_NAME: &str = "subtrack_cli";

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("SUBTRACK_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// Runs `add` and returns the id printed in the confirmation line.
fn add_and_capture_id(home: &TempDir, args: &[&str]) -> String {
    let output = cli(home)
        .arg("add")
        .args(args)
        .output()
        .expect("run add");
    assert!(output.status.success(), "add failed: {:?}", output);
    let stdout = String::from_utf8(output.stdout).expect("utf8 output");
    let start = stdout.find("Created ").expect("confirmation line");
    let line = &stdout[start..];
    let open = line.find('(').expect("id opens");
    let close = line.find(')').expect("id closes");
    line[open + 1..close].to_string()
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("help")
        .assert()
        .success()
        .stdout(contains("dashboard").and(contains("add")));
}

#[test]
fn empty_list_explains_how_to_add() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No subscriptions yet"));
}

#[test]
fn added_subscriptions_show_up_in_list_and_dashboard() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["add", "name=Netflix", "cost=15.99", "category=Streaming", "start=2025-01-01"])
        .assert()
        .success()
        .stdout(contains("Created Netflix").and(contains("Next renewal: 2025-02-01")));
    cli(&home)
        .args(["add", "name=Spotify", "cost=9.99", "category=Music", "start=2025-01-15"])
        .assert()
        .success();

    cli(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Netflix").and(contains("Spotify")));
    cli(&home)
        .arg("dashboard")
        .assert()
        .success()
        .stdout(
            contains("25.98 USD")
                .and(contains("Streaming"))
                .and(contains("Music")),
        );
    assert!(home.path().join("subscriptions.json").exists());
}

#[test]
fn export_prints_stored_keys() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["add", "name=Cloud", "cost=2.99", "category=Storage"])
        .assert()
        .success();
    cli(&home)
        .arg("export")
        .assert()
        .success()
        .stdout(contains("@subscriptions").and(contains("Cloud")));
}

#[test]
fn deleting_an_unknown_id_is_not_an_error() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["delete", "missing"])
        .assert()
        .success()
        .stdout(contains("nothing to delete"));
}

#[test]
fn invalid_cost_is_rejected() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["add", "name=Bad", "cost=-3", "category=Misc"])
        .assert()
        .failure()
        .stderr(contains("Error"));
}

#[test]
fn unknown_command_suggests_a_close_match() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("dashbord")
        .assert()
        .failure()
        .stdout(contains("Suggestion: `dashboard`?"));
}

#[test]
fn clear_requires_confirmation() {
    let home = TempDir::new().unwrap();
    cli(&home).arg("clear").assert().failure();
    cli(&home)
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(contains("All data has been cleared"));
}

#[test]
fn editing_the_cycle_moves_the_renewal_date() {
    let home = TempDir::new().unwrap();
    let id = add_and_capture_id(
        &home,
        &["name=Netflix", "cost=15.99", "category=Streaming", "start=2025-01-01"],
    );

    cli(&home)
        .args(["edit", id.as_str(), "cycle=yearly"])
        .assert()
        .success()
        .stdout(contains("Updated Netflix").and(contains("2026-01-01")));
    cli(&home)
        .args(["show", id.as_str()])
        .assert()
        .success()
        .stdout(contains("Renews").and(contains("2026-01-01")).and(contains("yearly")));
}

#[test]
fn showing_an_unknown_id_fails() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["show", "missing"])
        .assert()
        .failure()
        .stderr(contains("Subscription not found: missing"));
}

#[test]
fn out_of_range_costs_are_rejected() {
    let home = TempDir::new().unwrap();
    for cost in ["cost=1e15", "cost=0.00004", "cost=1.23456"] {
        cli(&home)
            .args(["add", "name=Edge", cost, "category=Misc"])
            .assert()
            .failure()
            .stderr(contains("Validation failed"));
    }
    cli(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No subscriptions yet"));
}

#[test]
fn config_changes_are_saved_between_runs() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["config", "set", "locale", "en-GB"])
        .assert()
        .success()
        .stdout(contains("Saved locale"));
    cli(&home)
        .args(["config", "set", "currency", "eur"])
        .assert()
        .success();
    assert!(home.path().join("config").join("config.json").exists());

    cli(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(contains("en-GB").and(contains("EUR")));
    cli(&home)
        .args(["add", "name=Cloud", "cost=2.99", "category=Storage"])
        .assert()
        .success();
    cli(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("2.99 EUR"));
}
