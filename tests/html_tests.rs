mod common;
use common::{dashboard_for, sample_fixture};
use vendortickets::config::PageSettings;
use vendortickets::errors::AppError;
use vendortickets::export::html::{render_error_page, render_page};

#[test]
fn test_all_vendors_page() {
    let db = sample_fixture("html_all");
    let page = render_page(&dashboard_for(&db, "/"), &PageSettings::default());

    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Vendor Tickets Dashboard</title>"));
    assert!(page.contains("<h3>All Vendor Tickets</h3>"));
    assert!(page.contains("<strong>5</strong> <span>Open Tickets</span>"));
    assert!(page.contains("BC-Stone-Homes-Your-Land-or-Ours-Logo-1.png"));
    for h in ["Type", "Property", "Name", "Scope", "Due Date", "File URL", "Directions", "Pricing"] {
        assert!(page.contains(&format!("<th>{h}</th>")), "{h}");
    }
    assert!(page.contains("Found 5 records"));
    assert_eq!(page.matches("<tr data-type=").count(), 5);
    assert!(!page.contains(" hidden>"));
}

#[test]
fn test_vendor_page_with_logo() {
    let db = sample_fixture("html_vendor");
    let page = render_page(&dashboard_for(&db, "/vendors/acme-roofing"), &PageSettings::default());

    assert!(page.contains(r#"<img src="https://logos.example.com/acme.png" class="vendor-logo" alt="Acme Roofing! logo">"#));
    assert!(page.contains("<h3>Acme Roofing! Tickets</h3>"));
    assert!(page.contains("<strong>2</strong>"));
    assert!(page.contains("1001-scope.pdf</a>"));
}

#[test]
fn test_vendor_page_without_logo_uses_subheader() {
    let db = sample_fixture("html_vendor_nologo");
    let page = render_page(&dashboard_for(&db, "/vendors/best-roofing"), &PageSettings::default());
    assert!(page.contains("<h3>Best Roofing Tickets</h3>"));
    assert!(!page.contains("class=\"vendor-logo\""));
}

#[test]
fn test_selection_marks_options_and_hides_rows() {
    let db = sample_fixture("html_selection");
    let page = render_page(
        &dashboard_for(&db, "/?type=Plumbing&due=2024-06-01"),
        &PageSettings::default(),
    );

    assert!(page.contains(r#"<option value="Plumbing" selected>Plumbing</option>"#));
    assert!(page.contains(r#"<option value="Roofing">Roofing</option>"#));
    assert!(page.contains(r#"<option value="2024-06-01" selected>2024-06-01</option>"#));
    // all five rows are emitted, four of them hidden
    assert_eq!(page.matches("<tr data-type=").count(), 5);
    assert_eq!(page.matches(" hidden>").count(), 4);
    assert!(page.contains("Found 1 records"));
    // the header count is the unfiltered total
    assert!(page.contains("<strong>5</strong>"));
}

#[test]
fn test_error_page_is_inline() {
    let err = AppError::Connection("unable to open <db>".into());
    let page = render_error_page(&err, &PageSettings::default());
    assert!(page.contains("Error connecting to database: unable to open &lt;db&gt;"));
    assert!(!page.contains("<table"));
}

#[test]
fn test_link_color_is_configurable() {
    let db = sample_fixture("html_color");
    let settings = PageSettings {
        link_color: "#ff0000".into(),
        ..Default::default()
    };
    let page = render_page(&dashboard_for(&db, "/"), &settings);
    assert!(page.contains("color: #ff0000;"));
}
