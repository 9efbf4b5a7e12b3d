//! CLI integration tests.

#![allow(deprecated)]

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

const FULL_EXPAND: &str = "body.view,version,space,ancestors,metadata.labels";

/// A `cme` command isolated from the caller's settings and environment.
fn cme(home: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("cme"));
    cmd.env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("CME_CONFIG")
        .env_remove("CME_CONFLUENCE_URL")
        .env_remove("CME_USERNAME")
        .env_remove("CME_API_TOKEN")
        .env_remove("CME_PAT")
        .env_remove("CME_OUTPUT_PATH")
        .env_remove("RUST_LOG");
    cmd
}

fn mock_page<'a>(server: &'a MockServer, id: &str, version: u64, title: &str) -> (httpmock::Mock<'a>, httpmock::Mock<'a>) {
    let meta = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/rest/api/content/{}", id))
            .query_param("expand", "version");
        then.status(200)
            .json_body(json!({"id": id, "version": {"number": version}}));
    });
    let content = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/rest/api/content/{}", id))
            .query_param("expand", FULL_EXPAND);
        then.status(200).json_body(json!({
            "id": id,
            "title": title,
            "version": {"number": version},
            "space": {"key": "DOCS", "name": "Docs"},
            "ancestors": [],
            "body": {"view": {"value": format!("<p>{} body v{}</p>", title, version)}},
            "metadata": {"labels": {"results": [{"name": "guide"}]}}
        }));
    });
    (meta, content)
}

#[test]
fn help_works() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    cme(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Confluence"))
        .stdout(predicate::str::contains("sync"));
    Ok(())
}

#[test]
fn version_works() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    cme(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cme"));
    Ok(())
}

#[test]
fn status_without_state_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let out = home.path().join("export");

    cme(home.path())
        .args(["status", "--output-path"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No state file found"));
    Ok(())
}

#[test]
fn sync_without_state_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let out = home.path().join("export");

    cme(home.path())
        .env("CME_CONFLUENCE_URL", "https://wiki.example.com")
        .args(["sync", "--output-path"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run an export command first"));
    assert!(!out.exists());
    Ok(())
}

#[test]
fn sync_without_url_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    cme(home.path())
        .args(["sync", "--output-path"])
        .arg(home.path().join("export"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("confluence.url"));
    Ok(())
}

#[test]
fn verbose_and_quiet_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    cme(home.path())
        .args(["--verbose", "--quiet", "config"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn config_masks_secrets() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let config = home.path().join("settings.yml");
    fs::write(
        &config,
        "confluence:\n  url: https://wiki.example.com\n  username: me\n  api_token: secret-token\n",
    )?;

    cme(home.path())
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://wiki.example.com"))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("secret-token").not());
    Ok(())
}

#[test]
fn config_json_reports_env_override() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    cme(home.path())
        .env("CME_CONFLUENCE_URL", "https://env.example.com")
        .args(["config", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# overridden by: CME_CONFLUENCE_URL"))
        .stdout(predicate::str::contains("\"url\": \"https://env.example.com\""));
    Ok(())
}

#[test]
fn explicit_missing_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    cme(home.path())
        .arg("--config")
        .arg(home.path().join("nope.yml"))
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn completions_for_bash() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    cme(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cme"));
    Ok(())
}

#[test]
fn export_then_sync_round() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let out = home.path().join("export");
    let server = MockServer::start();
    let (mut meta, mut content) = mock_page(&server, "42", 1, "Guide");

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["pages", "42", "--output-path"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 pages"));

    let page = out.join("Docs").join("Guide.md");
    let markdown = fs::read_to_string(&page)?;
    assert!(markdown.contains("# Guide"));
    assert!(markdown.contains("Guide body v1"));
    assert!(markdown.contains("#guide"));
    assert!(out.join(".cme-state.json").is_file());

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["sync", "--output-path"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 new, 0 modified, 0 deleted, 1 unchanged"))
        .stdout(predicate::str::contains("Already up to date"));
    content.assert_hits(1);

    meta.delete();
    content.delete();
    mock_page(&server, "42", 2, "Guide");

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["sync", "--output-path"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("mod:  Docs/Guide.md"))
        .stdout(predicate::str::contains("1 exported, 0 deleted, 0 failed, 0 skipped"));
    assert!(fs::read_to_string(&page)?.contains("Guide body v2"));

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["status", "--output-path"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("pages 42"))
        .stdout(predicate::str::contains("1 tracked (1 active, 0 deleted)"));
    Ok(())
}

#[test]
fn sync_removes_deleted_page() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let out = home.path().join("export");
    let server = MockServer::start();
    let (mut meta, mut content) = mock_page(&server, "7", 3, "Old Notes");

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["pages", "7", "--output-path"])
        .arg(&out)
        .assert()
        .success();
    let page = out.join("Docs").join("Old Notes.md");
    assert!(page.is_file());

    meta.delete();
    content.delete();
    server.mock(|when, then| {
        when.method(GET).path("/rest/api/content/7");
        then.status(404);
    });

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["sync", "--output-path"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("del:  Docs/Old Notes.md"));
    assert!(!page.exists());

    let state = fs::read_to_string(out.join(".cme-state.json"))?;
    assert!(state.contains("\"deleted\""));
    Ok(())
}

#[test]
fn dry_run_leaves_export_alone() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let out = home.path().join("export");
    let server = MockServer::start();
    let (mut meta, mut content) = mock_page(&server, "42", 1, "Guide");

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["pages", "42", "--output-path"])
        .arg(&out)
        .assert()
        .success();
    let before = fs::read_to_string(out.join(".cme-state.json"))?;

    meta.delete();
    content.delete();
    let (_, content) = mock_page(&server, "42", 2, "Guide");

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["sync", "--dry-run", "--output-path"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("mod:  Docs/Guide.md"))
        .stdout(predicate::str::contains("Dry run"));

    content.assert_hits(0);
    assert_eq!(fs::read_to_string(out.join(".cme-state.json"))?, before);
    Ok(())
}

#[test]
fn export_twice_needs_append() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let out = home.path().join("export");
    let server = MockServer::start();
    mock_page(&server, "42", 1, "Guide");

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["pages", "42", "--output-path"])
        .arg(&out)
        .assert()
        .success();

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["pages", "42", "--output-path"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--append"));

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["pages", "42", "--append", "--output-path"])
        .arg(&out)
        .assert()
        .success();
    Ok(())
}

#[test]
fn sync_against_other_instance_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let out = home.path().join("export");
    let server = MockServer::start();
    mock_page(&server, "42", 1, "Guide");

    cme(home.path())
        .env("CME_CONFLUENCE_URL", server.base_url())
        .args(["pages", "42", "--output-path"])
        .arg(&out)
        .assert()
        .success();

    cme(home.path())
        .env("CME_CONFLUENCE_URL", "https://other.example.com")
        .args(["sync", "--output-path"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Confluence URL mismatch"));
    Ok(())
}
