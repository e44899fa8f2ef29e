mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

use common::{temp_home, SETUP_LINE};

fn cli(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("energy_ledger_cli").unwrap();
    cmd.env("ENERGY_LEDGER_CLI_SCRIPT", "1")
        .env("ENERGY_LEDGER_HOME", home)
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn script_mode_runs_setup_add_status() {
    let home = temp_home();
    let input = format!("config ui_color_enabled off\n{SETUP_LINE}\nadd 300 july\nstatus\nexit\n");

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Previous period imported: January - April: 1200 kWh"))
        .stdout(contains("Recorded May - July: 300 kWh"))
        .stdout(contains("Recorded     : 7 months"))
        .stdout(contains("next August"))
        .stdout(contains("(estimate)"));

    let ledger = std::fs::read_to_string(home.join("data").join("ledger.json")).unwrap();
    assert!(ledger.contains("\"july\""));
}

#[test]
fn status_lists_each_reading_batch_with_its_balance() {
    let home = temp_home();
    let input = format!("{SETUP_LINE}\nadd 300 july\nadd 90 august\nstatus\n");

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Readings"))
        .stdout(contains("initial"))
        .stdout(contains("-4097.00 CZK"))
        .stdout(contains("#1"))
        .stdout(contains("+1605.75 CZK"))
        .stdout(contains("#2"))
        .stdout(contains("August: 90 kWh"));
}

#[test]
fn undo_of_initial_period_is_rejected() {
    let home = temp_home();
    let input = format!("{SETUP_LINE}\nundo\nentries\n");

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stderr(contains("initial"))
        .stdout(contains("April"));
}

#[test]
fn commands_before_setup_point_to_setup() {
    let home = temp_home();

    cli(&home)
        .write_stdin("pending\n")
        .assert()
        .success()
        .stderr(contains("No contract set up yet."))
        .stdout(contains("Run `setup`"));
}

#[test]
fn unknown_command_suggests_nearest() {
    let home = temp_home();

    cli(&home)
        .write_stdin("stauts\n")
        .assert()
        .success()
        .stdout(contains("Suggestion: `status`?"));
}

#[test]
fn entries_json_lists_persisted_months() {
    let home = temp_home();
    let input = format!("{SETUP_LINE}\nadd 100 may\n");
    cli(&home).write_stdin(input).assert().success();

    cli(&home)
        .write_stdin("entries --json\n")
        .assert()
        .success()
        .stdout(contains("\"month\": \"may\""))
        .stdout(contains("\"batch\": 1"));
}

#[test]
fn reset_with_yes_clears_data_and_keeps_backup() {
    let home = temp_home();
    let input = format!("{SETUP_LINE}\nreset --yes\nbackups\nstatus\n");

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("All billing data removed"))
        .stdout(contains("before-reset").and(contains("billing_")))
        .stderr(contains("No contract set up yet."));

    assert!(!home.join("data").join("contract.json").exists());
}

#[test]
fn quote_prices_without_recording() {
    let home = temp_home();
    let input = format!("{SETUP_LINE}\nquote 200 2\nentries --json\n");

    let output = cli(&home).write_stdin(input).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Total        : 1929.49 CZK"));
    assert!(!stdout.contains("\"batch\": 1"));
}
