//! CLI integration tests using the REAL oval-session binary

mod common;

use assert_cmd::Command;
use common::{TestWorkspace, fixture_path};
use predicates::prelude::*;

#[allow(deprecated)]
fn oval_cmd() -> Command {
    let mut cmd = Command::cargo_bin("oval-session").unwrap();
    cmd.env_remove("OVAL_SESSION_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_output() {
    oval_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("OVAL"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_output() {
    oval_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("oval-session"))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_validate_definitions_document() {
    oval_cmd()
        .args(["validate", "--full"])
        .arg(fixture_path("definitions.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid:"))
        .stdout(predicate::str::contains("full validation"));
}

#[test]
fn test_validate_reports_diagnostics_on_stderr() {
    oval_cmd()
        .arg("validate")
        .arg(fixture_path("definitions-invalid.xml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("Validation of"));
}

#[test]
fn test_validate_full_reports_dangling_reference() {
    oval_cmd()
        .args(["validate", "--full"])
        .arg(fixture_path("definitions-dangling.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("oval:org.example:tst:99"));
}

#[test]
fn test_validate_rejects_unsupported_document() {
    oval_cmd()
        .arg("validate")
        .arg(fixture_path("not-scap.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported document"))
        .stderr(predicate::str::contains("Help:"));
}

#[test]
fn test_validate_missing_file() {
    let workspace = TestWorkspace::new();
    oval_cmd()
        .arg("validate")
        .arg(workspace.path.join("absent.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to read input"));
}

#[test]
fn test_info_datastream_summary() {
    oval_cmd()
        .arg("info")
        .arg(fixture_path("ds-single.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("scap_org.example_datastream_1"))
        .stdout(predicate::str::contains("scap_org.example_comp_oval1.xml"))
        .stdout(predicate::str::contains("oval:org.example:def:1"));
}

#[test]
fn test_info_json_output() {
    let output = oval_cmd()
        .args(["info", "--json"])
        .arg(fixture_path("definitions.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["kind"], "definitions_document");
    assert_eq!(value["counts"]["definitions"], 1);
    assert_eq!(value["counts"]["variables"], 1);
    assert_eq!(value["validated"], true);
}

#[test]
fn test_info_skip_valid() {
    let output = oval_cmd()
        .args(["info", "--json", "--skip-valid"])
        .arg(fixture_path("definitions.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["validated"], false);
}

#[test]
fn test_info_ambiguous_component() {
    oval_cmd()
        .arg("info")
        .arg(fixture_path("ds-two-checks.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Multiple 'checks' components"))
        .stderr(predicate::str::contains("--oval-id"));
}

#[test]
fn test_info_with_oval_id() {
    oval_cmd()
        .arg("info")
        .arg(fixture_path("ds-two-checks.xml"))
        .args(["--oval-id", "scap_org.example_cref_oval2.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("oval:org.example:def:2"));
}

#[test]
fn test_info_ambiguous_datastream_with_selection_first() {
    oval_cmd()
        .arg("info")
        .arg(fixture_path("ds-two-streams.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Multiple data streams"));

    oval_cmd()
        .arg("info")
        .arg(fixture_path("ds-two-streams.xml"))
        .args(["--selection", "first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scap_org.example_datastream_1"));
}

#[test]
fn test_info_with_datastream_id() {
    oval_cmd()
        .arg("info")
        .arg(fixture_path("ds-two-streams.xml"))
        .args(["--datastream-id", "scap_org.example_datastream_2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("oval:org.example:def:2"));
}

#[test]
fn test_info_config_from_environment() {
    let workspace = TestWorkspace::new();
    workspace.copy_fixture("variables.xml");
    let config = workspace.copy_fixture("session.yaml");

    oval_cmd()
        .arg("info")
        .arg(fixture_path("ds-two-checks.xml"))
        .env("OVAL_SESSION_CONFIG", &config)
        .assert()
        .success()
        .stdout(predicate::str::contains("oval:org.example:def:2"));
}

#[test]
fn test_command_line_overrides_config() {
    let workspace = TestWorkspace::new();
    workspace.copy_fixture("variables.xml");
    let config = workspace.copy_fixture("session.yaml");

    oval_cmd()
        .arg("info")
        .arg(fixture_path("ds-two-checks.xml"))
        .arg("--config")
        .arg(&config)
        .args(["--oval-id", "scap_org.example_cref_oval1.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("oval:org.example:def:1"));
}

#[test]
fn test_invalid_config_is_reported() {
    let workspace = TestWorkspace::new();
    let config = workspace.write_file("session.yaml", "unknown_key: 1\n");

    oval_cmd()
        .arg("info")
        .arg(fixture_path("definitions.xml"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse configuration file"));
}

#[test]
fn test_verbose_logging_goes_to_stderr() {
    let output = oval_cmd()
        .args(["info", "--json", "-vv"])
        .arg(fixture_path("ds-single.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    serde_json::from_slice::<serde_json::Value>(&output.stdout).unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DEBUG"));
}

#[test]
fn test_completions_bash() {
    oval_cmd()
        .args(["completions", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("oval-session"));
}

#[test]
fn test_completions_unknown_shell() {
    oval_cmd()
        .args(["completions", "--shell", "tcsh"])
        .assert()
        .failure();
}
