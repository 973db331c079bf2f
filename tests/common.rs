#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use vendortickets::config::Config;
use vendortickets::core::params::PageRequest;
use vendortickets::core::pipeline::{Dashboard, load_dashboard};
use vendortickets::warehouse::fixture::{NewTicket, create_fixture, insert_ticket, seed_sample};
use vendortickets::warehouse::sqlite::SqliteWarehouse;
use vendortickets::warehouse::Warehouse;

pub fn vt() -> Command {
    cargo_bin_cmd!("vendortickets")
}

/// Unique path inside the system temp dir, with any previous file removed.
pub fn temp_path(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_vendortickets.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fixture warehouse filled with the demo tickets.
pub fn sample_fixture(name: &str) -> String {
    let path = temp_path(name, "sqlite");
    let conn = create_fixture(Path::new(&path)).expect("create fixture");
    seed_sample(&conn).expect("seed sample");
    path
}

/// Fixture warehouse holding exactly `tickets`.
pub fn fixture_with(name: &str, tickets: &[NewTicket]) -> String {
    let path = temp_path(name, "sqlite");
    let conn = create_fixture(Path::new(&path)).expect("create fixture");
    for t in tickets {
        insert_ticket(&conn, t).expect("insert ticket");
    }
    path
}

pub fn fixture_config(path: &str) -> Config {
    let mut cfg = Config::default();
    cfg.use_fixture(path);
    cfg
}

/// Load the dashboard for `url` from the fixture at `path`.
pub fn dashboard_for(path: &str, url: &str) -> Dashboard {
    let cfg = fixture_config(path);
    dashboard_with(&cfg, url)
}

pub fn dashboard_with(cfg: &Config, url: &str) -> Dashboard {
    let request = PageRequest::from_url(url, cfg.dashboard.vendor_match).expect("parse url");
    let mut wh = SqliteWarehouse::open(Path::new(cfg.warehouse.sqlite_path.as_deref().unwrap()))
        .expect("open fixture");
    let d = load_dashboard(&mut wh, cfg.warehouse.table_name(), &cfg.dashboard, &request)
        .expect("load dashboard");
    wh.close().expect("close fixture");
    d
}

pub fn names(d: &Dashboard) -> Vec<String> {
    d.visible.iter().filter_map(|r| r.name.clone()).collect()
}

pub fn ticket(id: i64, vendor: &str, model: &str) -> NewTicket {
    NewTicket {
        ticket_id: id,
        status: "1".into(),
        kind: Some("General".into()),
        property: Some("1 Main Street".into()),
        subject: Some(format!("Ticket {id}")),
        due_date: Some("2024-06-01".into()),
        vendor_name: Some(vendor.into()),
        payment_model: Some(model.into()),
        ..Default::default()
    }
}
