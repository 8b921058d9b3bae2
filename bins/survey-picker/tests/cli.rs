use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn picker(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("survey-picker").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn json_failure(cmd: &mut Command, code: i32) -> Value {
    let output = cmd.assert().code(code).get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn write_question(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("question.json");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn search_prints_table() {
    let dir = TempDir::new().unwrap();
    picker(&dir)
        .args(["search", "ger"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Germany"))
        .stdout(predicate::str::contains("+49"));
}

#[test]
fn search_by_code_json() {
    let dir = TempDir::new().unwrap();
    let results = json_stdout(picker(&dir).args(["search", "+49", "--json"]));

    let first = &results[0];
    assert_eq!(first["record"]["id"], "DE");
    assert_eq!(first["distance"], 0.0);
    assert_eq!(first["useAlternateName"], false);
}

#[test]
fn search_respects_limit() {
    let dir = TempDir::new().unwrap();
    let results = json_stdout(picker(&dir).args(["search", "ger", "--limit", "3", "--json"]));
    assert_eq!(results.as_array().unwrap().len(), 3);

    let all = json_stdout(picker(&dir).args(["search", "ger", "--limit", "0", "--json"]));
    assert_eq!(all.as_array().unwrap().len(), 173);
}

#[test]
fn empty_search_keeps_table_order() {
    let dir = TempDir::new().unwrap();
    let results = json_stdout(picker(&dir).args(["search", "", "--json"]));
    assert_eq!(results.as_array().unwrap().len(), 173);
    assert_eq!(results[0]["record"]["id"], "AF");
}

#[test]
fn config_limits_results() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".survey-widgets.toml"),
        "[picker]\nresult_limit = 2\n",
    )
    .unwrap();

    let results = json_stdout(picker(&dir).args(["search", "fra", "--json"]));
    assert_eq!(results.as_array().unwrap().len(), 2);
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    picker(&dir)
        .args(["--config", "nope.toml", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn missing_config_file_json_report() {
    let dir = TempDir::new().unwrap();
    let report = json_failure(
        picker(&dir).args(["--config", "nope.toml", "search", "ger", "--json"]),
        3,
    );
    assert_eq!(report["code"], "E3001");
    assert_eq!(report["category"], "config");
    assert_eq!(report["exit_code"], 3);
    assert!(report["hint"].as_str().unwrap().contains("--config"));
}

#[test]
fn search_table_shows_wide_names() {
    let dir = TempDir::new().unwrap();
    picker(&dir)
        .args(["search", "한국", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("한국"))
        .stdout(predicate::str::contains("+82"))
        .stdout(predicate::str::contains("Distance"));
}

#[test]
fn list_json_has_every_country() {
    let dir = TempDir::new().unwrap();
    let records = json_stdout(picker(&dir).args(["list", "--json"]));
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 173);
    assert_eq!(records[0]["id"], "AF");
    assert!(records.iter().any(|r| r["primaryName"] == "Deutschland"));
}

#[test]
fn validate_phone_without_code() {
    let dir = TempDir::new().unwrap();
    picker(&dir)
        .args(["validate-phone", "+4930123456"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid phone number"));

    picker(&dir)
        .args(["validate-phone", "30123456"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("country-code"));
}

#[test]
fn validate_phone_with_code() {
    let dir = TempDir::new().unwrap();
    picker(&dir)
        .args(["validate-phone", "30123456", "--code", "+49"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+49 30123456"));

    picker(&dir)
        .args(["validate-phone", "+4930123456", "--code", "49"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("type just numbers"));
}

#[test]
fn validate_phone_unknown_code() {
    let dir = TempDir::new().unwrap();
    picker(&dir)
        .args(["validate-phone", "123", "--code", "+999"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown dialling code"));
}

#[test]
fn validate_phone_with_country() {
    let dir = TempDir::new().unwrap();
    picker(&dir)
        .args(["validate-phone", "2025550123", "--country", "us"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+1 2025550123"))
        .stdout(predicate::str::contains("🇺🇸 +1"));

    // A shared code picks the first country in table order.
    picker(&dir)
        .args(["validate-phone", "2025550123", "--code", "+1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("🇨🇦 +1"));

    picker(&dir)
        .args(["validate-phone", "123", "--country", "ZZ"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown country id"));
}

#[test]
fn validate_phone_code_conflicts_with_country() {
    let dir = TempDir::new().unwrap();
    picker(&dir)
        .args(["validate-phone", "123", "--code", "+1", "--country", "US"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn submit_builds_response() {
    let dir = TempDir::new().unwrap();
    let question = write_question(
        &dir,
        r#"{"id": "contact", "required": true, "company": {"show": false}}"#,
    );

    let output = json_stdout(picker(&dir).args([
        "submit",
        "--question",
        question.to_str().unwrap(),
        "--values",
        "Jane,Doe,jane@example.com,30123456,Acme",
        "--code",
        "+49",
        "--survey",
        "survey-1",
        "--json",
    ]));

    assert_eq!(output["surveyId"], "survey-1");
    let response = &output["response"];
    assert_eq!(response["finished"], true);
    assert_eq!(
        response["data"]["contact"],
        serde_json::json!(["Jane", "Doe", "jane@example.com", "+49 30123456", ""])
    );
    assert!(response["ttc"]["contact"].as_f64().unwrap() >= 0.0);
}

#[test]
fn submit_reports_missing_required_values() {
    let dir = TempDir::new().unwrap();
    let question = write_question(&dir, r#"{"id": "contact", "required": true}"#);

    picker(&dir)
        .args([
            "submit",
            "--question",
            question.to_str().unwrap(),
            "--values",
            "Jane,,,,",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lastName"));
}

#[test]
fn submit_json_reports_validation_errors() {
    let dir = TempDir::new().unwrap();
    let question = write_question(&dir, r#"{"id": "contact", "required": true}"#);

    let report = json_failure(
        picker(&dir).args([
            "submit",
            "--question",
            question.to_str().unwrap(),
            "--values",
            "Jane,,,,",
            "--json",
        ]),
        2,
    );
    assert_eq!(report["category"], "validation");
    assert_eq!(report["exit_code"], 2);
    assert!(report["message"].as_str().unwrap().contains("lastName"));
}

#[test]
fn submit_json_reports_invalid_question() {
    let dir = TempDir::new().unwrap();
    let question = write_question(&dir, r#"{"id": "  "}"#);

    let report = json_failure(
        picker(&dir).args([
            "submit",
            "--question",
            question.to_str().unwrap(),
            "--values",
            "Jane",
            "--json",
        ]),
        4,
    );
    assert_eq!(report["code"], "E7001");
    assert_eq!(report["category"], "survey");
    assert!(!report["context"].as_array().unwrap().is_empty());
}

#[test]
fn submit_table_output() {
    let dir = TempDir::new().unwrap();
    let question = write_question(
        &dir,
        r#"{"id": "contact", "email": {"required": true, "placeholder": {"default": "Email"}}}"#,
    );

    picker(&dir)
        .args([
            "submit",
            "--question",
            question.to_str().unwrap(),
            "--values",
            "Jane,,jane@example.com,,",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Email*"))
        .stdout(predicate::str::contains("jane@example.com"));
}

#[test]
fn submit_missing_question_file() {
    let dir = TempDir::new().unwrap();
    picker(&dir)
        .args(["submit", "--question", "missing.json", "--values", "a"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn submit_rejects_invalid_question() {
    let dir = TempDir::new().unwrap();
    let question = write_question(&dir, r#"{"id": "  "}"#);

    picker(&dir)
        .args([
            "submit",
            "--question",
            question.to_str().unwrap(),
            "--values",
            "Jane",
        ])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Question id must not be empty"));
}
