mod common;
use common::{temp_path, vt};
use predicates::prelude::*;
use std::fs;

/// Config + fixture warehouse with the demo tickets; returns (config, fixture).
fn setup(name: &str) -> (String, String) {
    let conf = temp_path(&format!("{name}_conf"), "conf");
    let db = temp_path(&format!("{name}_db"), "sqlite");

    vt()
        .args(["--config", &conf, "--fixture", &db, "init", "--sample"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Inserted 7 sample tickets"));

    (conf, db)
}

#[test]
fn test_init_writes_fixture_config() {
    let (conf, db) = setup("cli_init");
    let content = fs::read_to_string(&conf).expect("read config");
    assert!(content.contains("backend: sqlite"));
    assert!(content.contains(&db));

    vt()
        .args(["--config", &conf, "config", "--check"])
        .assert()
        .success()
        .stderr(predicate::str::contains("complete"));
}

#[test]
fn test_sample_requires_fixture() {
    let conf = temp_path("cli_sample_nofixture", "conf");
    vt()
        .args(["--config", &conf, "init", "--sample"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--sample requires --fixture"));
}

#[test]
fn test_render_vendor_page_to_stdout() {
    let (conf, _) = setup("cli_render");
    vt()
        .args(["--config", &conf, "render", "--url", "/vendors/acme-roofing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h3>Acme Roofing! Tickets</h3>"))
        .stdout(predicate::str::contains("<strong>2</strong>"))
        .stderr(predicate::str::contains("Found 2 records"));
}

#[test]
fn test_render_to_file_respects_force() {
    let (conf, _) = setup("cli_render_out");
    let out = temp_path("cli_render_out_page", "html");

    vt()
        .args(["--config", &conf, "render", "--out", &out])
        .assert()
        .success();
    let page = fs::read_to_string(&out).expect("read page");
    assert!(page.contains("All Vendor Tickets"));

    // existing file, no --force, no terminal
    vt()
        .args(["--config", &conf, "render", "--out", &out])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    vt()
        .args(["--config", &conf, "render", "--out", &out, "--force", "--url", "/?type=Roofing"])
        .assert()
        .success();
    let page = fs::read_to_string(&out).expect("read page");
    assert!(page.contains("Found 1 records"));
}

#[test]
fn test_list_prints_table() {
    let (conf, _) = setup("cli_list");
    vt()
        .args(["--config", &conf, "list", "--url", "/?vendor=Volt%20Bros"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Panel inspection"))
        .stdout(predicate::str::contains("Kitchen sink leak").not())
        .stderr(predicate::str::contains("Volt Bros Tickets"));
}

#[test]
fn test_export_csv_and_json() {
    let (conf, _) = setup("cli_export");
    let csv = temp_path("cli_export_out", "csv");
    let json = temp_path("cli_export_out", "json");

    vt()
        .args(["--config", &conf, "export", "--format", "csv", "--file", &csv])
        .assert()
        .success();
    let content = fs::read_to_string(&csv).expect("read csv");
    assert!(content.starts_with("type,property,name,"));
    assert_eq!(content.lines().count(), 6);

    vt()
        .args([
            "--config", &conf, "export", "--format", "json", "--file", &json, "--url",
            "/vendors/acme-roofing",
        ])
        .assert()
        .success();
    let v: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).expect("read json")).expect("json");
    let items = v.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["pricing_label"], "1850");
    assert_eq!(items[0]["file_name"], "1001-scope.pdf");
}

#[test]
fn test_sql_shows_bound_vendor_key() {
    let (conf, _) = setup("cli_sql");
    vt()
        .args(["--config", &conf, "sql", "--url", "/vendors/Acme%20Roofing'%20OR%201=1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VENDOR_KEY(VENDOR_NAME) = ?"))
        .stdout(predicate::str::contains("\"acme-roofing-or-1-1\""))
        .stdout(predicate::str::contains("OR 1=1").not());
}

#[test]
fn test_missing_fixture_renders_error_page() {
    let conf = temp_path("cli_missing_conf", "conf");
    let db = std::env::temp_dir()
        .join("vendortickets_no_such_dir")
        .join("missing.sqlite");

    vt()
        .args(["--config", &conf, "--fixture", db.to_str().unwrap(), "render"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Error connecting to database"))
        .stdout(predicate::str::contains("role=\"alert\""))
        .stderr(predicate::str::contains("Error connecting to database"));
}

#[test]
fn test_unknown_auth_strategy_is_rejected() {
    vt()
        .args(["--auth", "kerberos", "sql"])
        .assert()
        .failure();
}
