//! Binary-level checks of the command line surface.

mod common;

use assert_cmd::Command;
use common::{git, plain_project, project_with_origin, serve_once, write_files};
use predicates::prelude::*;
use std::fs;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("manifest_release").unwrap();
    cmd.env_remove("BUMP")
        .env_remove("GH_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .env("LC_ALL", "C");
    cmd
}

#[test]
fn test_bump_minor_updates_every_manifest() {
    let (_dir, work) = plain_project();
    write_files(
        &work,
        &[("release.toml", "version_files = [\"package.json\", \"config.xml\"]\n")],
    );

    cli()
        .args(["bump", "--minor", "--project"])
        .arg(&work)
        .assert()
        .success();

    let json = fs::read_to_string(work.join("package.json")).unwrap();
    assert!(json.contains("\"version\": \"1.3.0\""));
    let xml = fs::read_to_string(work.join("config.xml")).unwrap();
    assert!(xml.contains("version=\"1.3.0\""));
}

#[test]
fn test_bump_env_overrides_flags() {
    let (_dir, work) = plain_project();

    cli()
        .env("BUMP", "major")
        .args(["bump", "--minor", "--quiet", "--project"])
        .arg(&work)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json = fs::read_to_string(work.join("package.json")).unwrap();
    assert!(json.contains("\"version\": \"2.0.0\""));
}

#[test]
fn test_invalid_bump_env_fails() {
    let (_dir, work) = plain_project();

    cli()
        .env("BUMP", "huge")
        .args(["bump", "--project"])
        .arg(&work)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("huge"));

    let json = fs::read_to_string(work.join("package.json")).unwrap();
    assert!(json.contains("\"version\": \"1.2.3\""));
}

#[test]
fn test_changelog_preview_prints_payload() {
    let (_dir, work) = plain_project();
    write_files(&work, &[("release.toml", "repository = \"acme/widget\"\n")]);

    cli()
        .args(["changelog:testFmt", "--project"])
        .arg(&work)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tag_name\": \"v1.2.3\""))
        .stdout(predicate::str::contains("\"name\": \"v1.2.3: version 1.2.3\""))
        .stdout(predicate::str::contains("### 1.2.4"));

    let json = fs::read_to_string(work.join("package.json")).unwrap();
    assert!(json.contains("\"version\": \"1.2.3\""));
}

#[test]
fn test_push_outside_repository_fails_before_bumping() {
    let (_dir, work) = plain_project();

    cli()
        .args(["push", "--project"])
        .arg(&work)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Command 'push' failed"));

    let json = fs::read_to_string(work.join("package.json")).unwrap();
    assert!(json.contains("\"version\": \"1.2.3\""));
}

#[test]
fn test_empty_ver_rejected() {
    let (_dir, work) = plain_project();

    cli()
        .args(["bump", "--ver=", "--project"])
        .arg(&work)
        .assert()
        .code(1);
}

#[test]
fn test_changelog_preview_prints_payload_in_quiet_mode() {
    let (_dir, work) = plain_project();
    write_files(&work, &[("release.toml", "repository = \"acme/widget\"\n")]);

    cli()
        .args(["changelog-preview", "--quiet", "--project"])
        .arg(&work)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tag_name\": \"v1.2.3\""));
}

#[test]
fn test_relative_config_resolves_against_project() {
    let (dir, work) = plain_project();
    write_files(
        &work,
        &[("ci/release.toml", "version_files = [\"package.json\", \"config.xml\"]\n")],
    );
    let elsewhere = dir.path().join("elsewhere");
    fs::create_dir_all(&elsewhere).unwrap();

    cli()
        .current_dir(&elsewhere)
        .args(["bump", "--config", "ci/release.toml", "--project"])
        .arg(&work)
        .assert()
        .success();

    let xml = fs::read_to_string(work.join("config.xml")).unwrap();
    assert!(xml.contains("version=\"1.2.4\""));
}

#[tokio::test]
async fn test_release_full_exits_zero_when_api_rejects() {
    let fixture = project_with_origin();
    let (api_base, server) = serve_once(
        "422 Unprocessable Entity",
        r#"{"message":"Validation Failed"}"#.to_string(),
    )
    .await;
    let config = format!(
        "repository = \"acme/widget\"\napi_base = \"{}\"\n",
        api_base
    );
    write_files(&fixture.work, &[("release.toml", config.as_str())]);

    let work = fixture.work.clone();
    tokio::task::spawn_blocking(move || {
        cli()
            .args(["release-full", "--username", "jo", "--password", "pw", "--project"])
            .arg(&work)
            .assert()
            .code(0);
    })
    .await
    .unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /repos/acme/widget/releases"));
    assert_eq!(git(&fixture.origin, &["tag", "-l"]), "v1.2.4");
}
