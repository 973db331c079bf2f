mod common;
use chrono::NaiveDate;
use common::{dashboard_for, dashboard_with, fixture_config, fixture_with, names, sample_fixture, ticket};
use std::path::Path;
use vendortickets::config::VendorMatch;
use vendortickets::core::params::normalize_vendor_key;
use vendortickets::core::pipeline::fetch_dashboard;
use vendortickets::core::params::PageRequest;
use vendortickets::core::query::{Dialect, build_ticket_query};
use vendortickets::core::shaper::records_from;
use vendortickets::errors::AppError;
use vendortickets::models::payment_model::{NEED_PRICING, PRICING_AFTER_WORK, PaymentModel};
use vendortickets::warehouse::Warehouse;
use vendortickets::warehouse::sqlite::SqliteWarehouse;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_all_vendors_excludes_closed_and_undated() {
    let db = sample_fixture("pipeline_all");
    let d = dashboard_for(&db, "/");

    assert_eq!(d.vendor_key, None);
    assert_eq!(d.vendor, None);
    assert_eq!(
        names(&d),
        vec![
            "Replace ridge shingles",
            "Kitchen sink leak",
            "Water heater flush",
            "Weekly mowing",
            "Panel inspection",
        ]
    );
    assert_eq!(d.open_count(), 5);
    assert_eq!(d.visible_count(), 5);
}

#[test]
fn test_zero_filters_reproduce_query_order() {
    let db = sample_fixture("pipeline_zero_filters");
    let d = dashboard_for(&db, "/");
    assert_eq!(d.visible, d.rows);
}

#[test]
fn test_vendor_path_example() {
    let db = sample_fixture("pipeline_vendor_path");
    let d = dashboard_for(&db, "/vendors/acme-roofing");

    assert_eq!(d.vendor_key.as_deref(), Some("acme-roofing"));
    assert_eq!(names(&d), vec!["Replace ridge shingles", "Water heater flush"]);

    let header = d.vendor.expect("vendor header");
    assert_eq!(header.name, "Acme Roofing!");
    assert_eq!(header.logo_url.as_deref(), Some("https://logos.example.com/acme.png"));
}

#[test]
fn test_unknown_vendor_is_empty_not_error() {
    let db = sample_fixture("pipeline_unknown_vendor");
    let d = dashboard_for(&db, "/vendors/nobody-at-all");
    assert!(d.rows.is_empty());
    assert!(d.vendor.is_none());
    assert!(d.options.types.is_empty());
}

#[test]
fn test_vendor_filter_round_trip() {
    let db = sample_fixture("pipeline_round_trip");
    let cfg = fixture_config(&db);
    let all = dashboard_for(&db, "/");
    assert!(!all.rows.is_empty());

    for vendor in ["Acme Roofing!", "Best Roofing", "Green Thumb Co.", "Volt Bros"] {
        let key = normalize_vendor_key(vendor);
        let q = build_ticket_query("TICKETS", &cfg.dashboard, Some(&key), Dialect::Sqlite)
            .expect("query");
        let mut wh = SqliteWarehouse::open(Path::new(&db)).expect("open");
        let records = records_from(&wh.query(&q).expect("run")).expect("records");
        wh.close().expect("close");

        assert!(!records.is_empty(), "{vendor}");
        for r in &records {
            let name = r.vendor_name.as_deref().unwrap_or("");
            assert_eq!(normalize_vendor_key(name), key);
            assert_eq!(r.vendor_key.as_deref(), Some(key.as_str()));
        }
    }
}

#[test]
fn test_exact_vendor_mode() {
    let db = sample_fixture("pipeline_exact");
    let mut cfg = fixture_config(&db);
    cfg.dashboard.vendor_match = VendorMatch::Exact;

    let d = dashboard_with(&cfg, "/?vendor=Best%20Roofing");
    assert_eq!(names(&d), vec!["Kitchen sink leak"]);

    let none = dashboard_with(&cfg, "/?vendor=best-roofing");
    assert!(none.rows.is_empty());
}

#[test]
fn test_pricing_labels_follow_payment_model() {
    let db = sample_fixture("pipeline_pricing");
    let d = dashboard_for(&db, "/");

    let labels: Vec<String> = d
        .rows
        .iter()
        .map(|r| r.pricing.as_ref().expect("pricing link").label.clone())
        .collect();
    assert_eq!(
        labels,
        vec!["1850", NEED_PRICING, PRICING_AFTER_WORK, PRICING_AFTER_WORK, ""]
    );

    let first = d.rows[0].pricing.as_ref().unwrap();
    assert_eq!(
        first.href,
        "https://welcome.bcstonehomes.com/vendor-bids?ticket_id=1001"
    );
}

#[test]
fn test_sql_label_matches_rust_label_for_every_model() {
    let models = [
        "Fixed Cost - Vendor Confirmed",
        "Fixed Cost - Vendor NOT Confirmed",
        "Open Ended",
        "Schedule Pay",
        "open ended",
        "Cost Plus",
    ];
    let tickets: Vec<_> = models
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let mut t = ticket(i as i64 + 1, "Acme", m);
            t.confirmed_amount = Some(420.0);
            t
        })
        .collect();
    let db = fixture_with("pipeline_sql_vs_rust", &tickets);

    let cfg = fixture_config(&db);
    let q = build_ticket_query("TICKETS", &cfg.dashboard, None, Dialect::Sqlite).expect("query");
    let mut wh = SqliteWarehouse::open(Path::new(&db)).expect("open");
    let records = records_from(&wh.query(&q).expect("run")).expect("records");
    wh.close().expect("close");

    assert_eq!(records.len(), models.len());
    for r in &records {
        let model = r.payment_model.clone().expect("payment model");
        let expected = model.pricing_label(r.confirmed_amount.as_deref());
        assert_eq!(r.pricing_label.as_deref().unwrap_or(""), expected, "{model:?}");
    }
}

#[test]
fn test_open_ended_ignores_amount() {
    let mut a = ticket(1, "Acme", "Open Ended");
    a.confirmed_amount = Some(99.0);
    let b = ticket(2, "Acme", "Open Ended");
    let db = fixture_with("pipeline_open_ended", &[a, b]);

    let d = dashboard_for(&db, "/");
    for row in &d.rows {
        assert_eq!(row.pricing.as_ref().unwrap().label, PRICING_AFTER_WORK);
    }
    assert_eq!(
        PaymentModel::parse("Open Ended").pricing_label(Some("99")),
        PRICING_AFTER_WORK
    );
}

#[test]
fn test_directions_cell_tracks_maps_url() {
    let db = sample_fixture("pipeline_directions");
    let d = dashboard_for(&db, "/");

    let hrefs: Vec<Option<String>> = d
        .rows
        .iter()
        .map(|r| r.directions.as_ref().map(|l| l.href.clone()))
        .collect();
    assert_eq!(
        hrefs,
        vec![
            Some("https://maps.google.com/?q=12+Oak+Street".to_string()),
            Some("https://maps.google.com/?q=7+Birch+Lane".to_string()),
            None,
            Some("https://maps.google.com/?q=40+Cedar+Court".to_string()),
            None,
        ]
    );
    assert!(d.rows[2].html_cells()[6].is_empty());
}

#[test]
fn test_due_dates_strip_time() {
    let db = sample_fixture("pipeline_due_dates");
    let d = dashboard_for(&db, "/");
    assert_eq!(d.rows[1].due_date, Some(ymd(2024, 6, 1)));
    assert_eq!(
        d.options.due_dates,
        vec![ymd(2024, 6, 1), ymd(2024, 6, 15), ymd(2024, 7, 1), ymd(2024, 7, 10)]
    );
}

#[test]
fn test_filters_combine_with_and() {
    let db = sample_fixture("pipeline_and_filters");

    let plumbing = dashboard_for(&db, "/?type=Plumbing");
    assert_eq!(names(&plumbing), vec!["Kitchen sink leak", "Water heater flush"]);

    let due = dashboard_for(&db, "/?due=2024-06-01");
    assert_eq!(names(&due), vec!["Replace ridge shingles", "Kitchen sink leak"]);

    let both = dashboard_for(&db, "/?type=Plumbing&due=2024-06-01");
    assert_eq!(names(&both), vec!["Kitchen sink leak"]);

    let either_type = dashboard_for(&db, "/?type=Plumbing&type=Roofing&property=12+Oak+Street");
    assert_eq!(names(&either_type), vec!["Replace ridge shingles", "Water heater flush"]);
}

#[test]
fn test_options_do_not_shrink_with_selection() {
    let db = sample_fixture("pipeline_options");
    let unfiltered = dashboard_for(&db, "/");
    let filtered = dashboard_for(&db, "/?type=Electrical");

    assert_eq!(filtered.visible_count(), 1);
    assert_eq!(filtered.options, unfiltered.options);
    assert_eq!(
        filtered.options.types,
        vec!["Electrical", "Landscaping", "Plumbing", "Roofing"]
    );
}

#[test]
fn test_missing_fixture_is_connection_error() {
    let cfg = fixture_config("/nonexistent/dir/vendortickets_missing.sqlite");
    let req = PageRequest::default();
    match fetch_dashboard(&cfg, &req) {
        Err(AppError::Connection(_)) => {}
        other => panic!("expected connection error, got {other:?}"),
    }
}

#[test]
fn test_missing_table_is_query_error() {
    let db = common::temp_path("pipeline_no_table", "sqlite");
    rusqlite::Connection::open(&db)
        .expect("create empty db")
        .execute_batch("CREATE TABLE OTHER (X INTEGER);")
        .expect("create other table");

    let cfg = fixture_config(&db);
    match fetch_dashboard(&cfg, &PageRequest::default()) {
        Err(AppError::Query(msg)) => assert!(msg.contains("TICKETS")),
        other => panic!("expected query error, got {other:?}"),
    }
}
