use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Command running in an empty directory with offline sources
fn bytepress(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("bytepress");
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("BYTEPRESS__SOURCES__PROVIDER", "stub");
    cmd
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    bytepress(&dir)
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("[[sources.feeds]]"));
    assert!(content.contains("dry_run = true"));

    bytepress(&dir)
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn config_show_applies_env_overrides() {
    let dir = TempDir::new().expect("temp dir");

    bytepress(&dir)
        .env("BYTEPRESS__DIGEST__TOPICS", "rust,football")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("provider = \"stub\""))
        .stdout(predicate::str::contains("\"football\""));
}

#[test]
fn dry_run_prints_notice_for_every_topic() {
    let dir = TempDir::new().expect("temp dir");

    bytepress(&dir)
        .args(["run", "--dry-run", "--topic", "gut health", "--topic", "football"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily Digest - "))
        .stdout(predicate::str::contains("<h3>gut health</h3>"))
        .stdout(predicate::str::contains("<h3>football</h3>"))
        .stdout(predicate::str::contains("No articles found today.").count(2));

    assert!(!dir.path().join("outbox.jsonl").exists());
}

#[test]
fn dry_run_renders_ranked_articles() {
    let dir = TempDir::new().expect("temp dir");

    let output = bytepress(&dir)
        .env("BYTEPRESS__DIGEST__UTC_OFFSET", "+02:00")
        .args(["run", "--dry-run", "--topic", "rust", "--topic", "football"])
        .output()
        .expect("run digest");

    assert!(output.status.success());
    let body = String::from_utf8(output.stdout).expect("utf8 body");

    let rust = body
        .split("<h3>rust</h3>")
        .nth(1)
        .and_then(|rest| rest.split("<h3>football</h3>").next())
        .expect("rust section");

    // Newest first, description shown, link kept
    let newest = rust
        .find("Announcing Rust 1.85.0 and Rust 2024")
        .expect("newest article");
    let older = rust.find("This Week in Rust 587").expect("older article");
    assert!(newest < older);
    assert!(rust.contains("The 2024 edition is now stable.<br>"));
    assert!(rust.contains(
        "<a href=\"https://blog.rust-lang.org/2025/02/20/Rust-1.85.0.html\">Read more</a>"
    ));

    // Missing description renders as an empty line
    assert!(rust.contains("<strong>This Week in Rust 587</strong><br>\n    <br>"));
    assert!(!rust.contains("No articles found today."));

    let football = body.split("<h3>football</h3>").nth(1).expect("football section");
    assert!(football.contains("No articles found today."));
}

#[test]
fn invalid_utc_offset_is_rejected() {
    let dir = TempDir::new().expect("temp dir");

    bytepress(&dir)
        .env("BYTEPRESS__DIGEST__UTC_OFFSET", "CET")
        .args(["run", "--topic", "rust"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("utc_offset"));
}

#[test]
fn dry_run_text_format() {
    let dir = TempDir::new().expect("temp dir");

    bytepress(&dir)
        .args(["run", "--topic", "football", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## football"))
        .stdout(predicate::str::contains("<h3>").not());
}

#[test]
fn run_without_topics_fails() {
    let dir = TempDir::new().expect("temp dir");

    bytepress(&dir)
        .args(["run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No topics"));
}

#[test]
fn live_run_without_api_key_fails_before_fetching() {
    let dir = TempDir::new().expect("temp dir");

    bytepress(&dir)
        .env("BYTEPRESS__SOURCES__PROVIDER", "live")
        .env_remove("NEWS_API_KEY")
        .args(["run", "--topic", "football"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NEWS_API_KEY"));
}

#[test]
fn deliver_writes_outbox_line_per_recipient() {
    let dir = TempDir::new().expect("temp dir");
    let outbox = dir.path().join("out").join("digest.jsonl");

    bytepress(&dir)
        .args([
            "run",
            "--deliver",
            "--topic",
            "football",
            "--recipient",
            "a@example.com",
            "--recipient",
            "b@example.com",
            "--outbox",
        ])
        .arg(&outbox)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ a@example.com"))
        .stdout(predicate::str::contains("✓ b@example.com"));

    let contents = fs::read_to_string(&outbox).expect("read outbox");
    let lines: Vec<Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid json"))
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["recipient"], "a@example.com");
    assert_eq!(lines[0]["subject"], "Your Daily BytePress Digest");
    assert_eq!(lines[0]["format"], "html");
    assert!(
        lines[0]["body"]
            .as_str()
            .expect("body")
            .contains("No articles found today.")
    );
}

#[test]
fn fetch_outputs_json_array() {
    let dir = TempDir::new().expect("temp dir");

    let output = bytepress(&dir)
        .args(["fetch", "--topic", "football", "--json"])
        .output()
        .expect("run fetch");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value, Value::Array(vec![]));
}

#[test]
fn doctor_reports_json() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("config.toml"),
        "[digest]\ntopics = [\"football\"]\n",
    )
    .expect("write config");

    let output = bytepress(&dir)
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["config"]["status"], "ok");
    assert_eq!(value["topics"]["status"], "ok");
    assert_eq!(value["primary_source"]["status"], "warn");
    assert_eq!(value["overall"], "warn");
}
