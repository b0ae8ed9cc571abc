//! End-to-end tests for the pagediff CLI.
//!
//! These run the binary over the snapshot pairs in `tests/fixtures` and
//! check the report on stdout and the exit status.

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to create a Command for the pagediff-rs binary
fn pagediff() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("pagediff-rs"))
}

#[test]
fn test_identical_files_exit_0() {
    pagediff()
        .arg("tests/fixtures/identical_1.json")
        .arg("tests/fixtures/identical_2.json")
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_modified_json_reports_new_values() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .assert()
        .code(1)
        .stdout("31\nreq-91bc\n");
}

#[test]
fn test_sign_token_silences_volatile_value() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--sign")
        .arg("req-")
        .assert()
        .code(1)
        .stdout("31\n");
}

#[test]
fn test_exclude_flag() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--exclude=user.age")
        .arg("--exclude=request_id")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_ignore_pattern_flag() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--ignore=**.age")
        .assert()
        .code(1)
        .stdout("req-91bc\n");
}

#[test]
fn test_settings_file() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--config")
        .arg("tests/fixtures/settings.toml")
        .assert()
        .code(0);
}

#[test]
fn test_invalid_settings_exit_2() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--config")
        .arg("tests/fixtures/bad_settings.toml")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_diff_unavailable_exit_3() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--config=tests/fixtures/shallow.toml")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Diff unavailable"));
}

#[test]
fn test_html_pages() {
    pagediff()
        .arg("tests/fixtures/page_old.html")
        .arg("tests/fixtures/page_new.html")
        .assert()
        .code(1)
        .stdout("Pears 3.50");
}

#[test]
fn test_xml_feeds() {
    pagediff()
        .arg("tests/fixtures/feed_old.xml")
        .arg("tests/fixtures/feed_new.xml")
        .assert()
        .code(1)
        .stdout("1.2.0");
}

#[test]
fn test_text_added_words() {
    pagediff()
        .arg("tests/fixtures/notes_old.txt")
        .arg("tests/fixtures/notes_new.txt")
        .assert()
        .code(1)
        .stdout("Maintenance scheduled tonight.");
}

#[test]
fn test_type_mismatch_passes_through() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/notes_new.txt")
        .assert()
        .code(1)
        .stdout("The service is operating normally.\nMaintenance scheduled tonight.\n");
}

#[test]
fn test_content_type_overrides_extension() {
    pagediff()
        .arg("tests/fixtures/notes_old.txt")
        .arg("tests/fixtures/identical_1.json")
        .arg("--content-type=text/plain")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"checks\""));
}

#[test]
fn test_mixed_json_yaml() {
    pagediff()
        .arg("tests/fixtures/mixed.json")
        .arg("tests/fixtures/mixed.yaml")
        .assert()
        .code(0);
}

#[test]
fn test_file_not_found_exit_2() {
    pagediff()
        .arg("tests/fixtures/nonexistent.json")
        .arg("tests/fixtures/identical_1.json")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("nonexistent.json"));
}

#[test]
fn test_invalid_json_exit_2() {
    pagediff()
        .arg("tests/fixtures/invalid.json")
        .arg("tests/fixtures/identical_1.json")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse old snapshot"));
}

#[test]
fn test_json_output_format() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--format=json")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"kind\": \"json\""))
        .stdout(predicate::str::contains("\"user.age\""))
        .stdout(predicate::str::contains("\"report\""));
}

#[test]
fn test_terminal_output_format() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("-f")
        .arg("terminal")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("user.age"))
        .stdout(predicate::str::contains("Summary: 2 changed locations (json)"));
}

#[test]
fn test_quiet_flag() {
    pagediff()
        .arg("tests/fixtures/modified_old.json")
        .arg("tests/fixtures/modified_new.json")
        .arg("--format=terminal")
        .arg("--quiet")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Summary").not());
}

#[test]
fn test_verbose_flag() {
    pagediff()
        .arg("tests/fixtures/identical_1.json")
        .arg("tests/fixtures/identical_2.json")
        .arg("--verbose")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Parsed"));
}

#[test]
fn test_help_flag() {
    pagediff()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Change detection between two snapshots"))
        .stdout(predicate::str::contains("OLD"))
        .stdout(predicate::str::contains("NEW"));
}

#[test]
fn test_version_flag() {
    pagediff()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pagediff-rs"));
}
