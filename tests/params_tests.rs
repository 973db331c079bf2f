use chrono::NaiveDate;
use vendortickets::config::VendorMatch;
use vendortickets::core::params::{PageRequest, normalize_vendor_key};

fn key(url: &str) -> Option<String> {
    PageRequest::from_url(url, VendorMatch::Normalized)
        .expect("parse")
        .vendor_key
}

#[test]
fn test_normalize_examples() {
    assert_eq!(normalize_vendor_key("Acme Roofing!"), "acme-roofing");
    assert_eq!(normalize_vendor_key("Best Roofing"), "best-roofing");
    assert_eq!(normalize_vendor_key("Green Thumb Co."), "green-thumb-co");
    assert_eq!(normalize_vendor_key("  A&B -- Plumbing  "), "a-b-plumbing");
    assert_eq!(normalize_vendor_key("Café Électrique"), "caf-lectrique");
    assert_eq!(normalize_vendor_key("!!!"), "");
}

#[test]
fn test_normalize_is_idempotent() {
    for name in ["Acme Roofing!", "Volt Bros", "X_Y z", "already-normal", "ÜBER 24/7"] {
        let once = normalize_vendor_key(name);
        assert_eq!(normalize_vendor_key(&once), once, "{name}");
    }
}

#[test]
fn test_vendor_from_last_path_segment() {
    assert_eq!(key("/vendors/acme-roofing"), Some("acme-roofing".into()));
    assert_eq!(key("/vendors/acme-roofing/"), Some("acme-roofing".into()));
    assert_eq!(
        key("https://dash.example.com/vendors/Acme%20Roofing!"),
        Some("acme-roofing".into())
    );
}

#[test]
fn test_path_wins_over_query() {
    assert_eq!(key("/vendors/acme-roofing?vendor=best-roofing"), Some("acme-roofing".into()));
}

#[test]
fn test_vendor_from_query_when_root() {
    assert_eq!(key("/?vendor=Best+Roofing"), Some("best-roofing".into()));
    assert_eq!(key("?vendor=volt-bros"), Some("volt-bros".into()));
}

#[test]
fn test_no_vendor_means_all() {
    assert_eq!(key("/"), None);
    assert_eq!(key(""), None);
    assert_eq!(key("/?vendor="), None);
    assert_eq!(key("/?type=Plumbing"), None);
}

#[test]
fn test_exact_mode_keeps_raw_key() {
    let req = PageRequest::from_url("/?vendor=Acme%20Roofing!", VendorMatch::Exact).expect("parse");
    assert_eq!(req.vendor_key.as_deref(), Some("Acme Roofing!"));
}

#[test]
fn test_filters_from_query() {
    let req = PageRequest::from_url(
        "/vendors/acme?type=Plumbing&type=Roofing&property=12+Oak+Street&due=2024-06-01&due=junk",
        VendorMatch::Normalized,
    )
    .expect("parse");

    assert_eq!(req.filters.types, vec!["Plumbing", "Roofing"]);
    assert_eq!(req.filters.properties, vec!["12 Oak Street"]);
    assert_eq!(
        req.filters.due_dates,
        vec![NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()]
    );
}

#[test]
fn test_injection_attempt_is_just_a_key() {
    let req = PageRequest::from_url("/?vendor=x'%20OR%20'1'='1", VendorMatch::Normalized)
        .expect("parse");
    assert_eq!(req.vendor_key.as_deref(), Some("x-or-1-1"));
}
