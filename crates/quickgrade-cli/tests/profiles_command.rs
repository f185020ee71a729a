use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_quickgrade_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("quickgrade")
}

#[test]
fn test_profiles_help() {
    let mut cmd = Command::new(get_quickgrade_bin());
    cmd.arg("profiles").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("forget"));
}

#[test]
fn test_profiles_list_shows_custom_profiles() {
    let home = tempfile::tempdir().unwrap();
    fs::create_dir_all(home.path().join(".quickgrade-profile")).unwrap();

    let mut cmd = Command::new(get_quickgrade_bin());
    cmd.env("HOME", home.path()).arg("profiles").arg("list");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Custom profiles"))
        .stdout(predicate::str::contains(".quickgrade-profile"));
}

#[test]
fn test_profiles_forget_stored_path() {
    let home = tempfile::tempdir().unwrap();
    let stored = home.path().join("grading");
    let entry = json_string(&stored);
    fs::write(
        home.path().join(".quickgrade_profiles.json"),
        format!("{{\"custom_profiles\": [{}]}}", entry),
    )
    .unwrap();

    let mut cmd = Command::new(get_quickgrade_bin());
    cmd.env("HOME", home.path())
        .arg("profiles")
        .arg("forget")
        .arg(&stored);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Forgot"));

    let content = fs::read_to_string(home.path().join(".quickgrade_profiles.json")).unwrap();
    assert!(!content.contains("grading"));
}

#[test]
fn test_profiles_forget_unknown_path() {
    let home = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(get_quickgrade_bin());
    cmd.env("HOME", home.path())
        .arg("profiles")
        .arg("forget")
        .arg("never-used");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Not remembered"));
}

fn json_string(path: &std::path::Path) -> String {
    format!("{:?}", path.display().to_string())
}
