//! Creating and filling a local fixture warehouse. The query path never
//! writes; these helpers back `init --fixture` and the tests.

use crate::config::{DEFAULT_EXCLUDED_STATUSES, FIXTURE_TABLE};
use crate::errors::AppResult;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Column set of the warehouse ticket table that the dashboard reads.
fn create_tickets_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {FIXTURE_TABLE} (
            TICKET_ID                      INTEGER PRIMARY KEY,
            STATUS                         TEXT NOT NULL DEFAULT '1',
            TYPE                           TEXT,
            PROPERTY_NAME                  TEXT,
            SUBJECT                        TEXT,
            TICKET_SCOPE                   TEXT,
            TICKET_SCOPE_FILE_URL          TEXT,
            TICKET_SCOPE_MASTER_FILE_NAME  TEXT,
            ASSET_TICKET_DUE_DATE          TEXT,
            GOOGLE_MAPS_URL                TEXT,
            CONFIRMED_TICKET_AMOUNT        NUMERIC,
            VENDOR_LOGO_URL                TEXT,
            VENDOR_NAME                    TEXT,
            PRICING_AND_PAYMENT_MODEL      TEXT
        );
        "#
    ))
}

fn tickets_table_exists(conn: &Connection) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([FIXTURE_TABLE], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// One row to insert. `None` fields are stored as NULL.
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub ticket_id: i64,
    pub status: String,
    pub kind: Option<String>,
    pub property: Option<String>,
    pub subject: Option<String>,
    pub scope: Option<String>,
    pub scope_file_url: Option<String>,
    pub scope_file_name: Option<String>,
    pub due_date: Option<String>,
    pub maps_url: Option<String>,
    pub confirmed_amount: Option<f64>,
    pub vendor_logo_url: Option<String>,
    pub vendor_name: Option<String>,
    pub payment_model: Option<String>,
}

/// Open (creating if needed) a writable fixture database with the tickets table.
pub fn create_fixture(path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(path)?;
    if !tickets_table_exists(&conn)? {
        create_tickets_table(&conn)?;
    }
    Ok(conn)
}

pub fn insert_ticket(conn: &Connection, t: &NewTicket) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO {FIXTURE_TABLE} (
            TICKET_ID, STATUS, TYPE, PROPERTY_NAME, SUBJECT, TICKET_SCOPE,
            TICKET_SCOPE_FILE_URL, TICKET_SCOPE_MASTER_FILE_NAME, ASSET_TICKET_DUE_DATE,
            GOOGLE_MAPS_URL, CONFIRMED_TICKET_AMOUNT, VENDOR_LOGO_URL, VENDOR_NAME,
            PRICING_AND_PAYMENT_MODEL
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
    ))?;

    stmt.execute(params![
        t.ticket_id,
        t.status,
        t.kind,
        t.property,
        t.subject,
        t.scope,
        t.scope_file_url,
        t.scope_file_name,
        t.due_date,
        t.maps_url,
        t.confirmed_amount,
        t.vendor_logo_url,
        t.vendor_name,
        t.payment_model,
    ])?;
    Ok(())
}

fn s(v: &str) -> Option<String> {
    Some(v.to_string())
}

/// A handful of demo tickets covering every payment model, one closed
/// ticket and one without a due date.
pub fn sample_tickets() -> Vec<NewTicket> {
    vec![
        NewTicket {
            ticket_id: 1001,
            status: "1".into(),
            kind: s("Roofing"),
            property: s("12 Oak Street"),
            subject: s("Replace ridge shingles"),
            scope: s("Tear off and replace damaged ridge shingles on the north slope."),
            scope_file_url: s("https://files.example.com/scope/1001.pdf"),
            scope_file_name: s("1001-scope.pdf"),
            due_date: s("2024-06-01"),
            maps_url: s("https://maps.google.com/?q=12+Oak+Street"),
            confirmed_amount: Some(1850.0),
            vendor_logo_url: s("https://logos.example.com/acme.png"),
            vendor_name: s("Acme Roofing!"),
            payment_model: s("Fixed Cost - Vendor Confirmed"),
            ..Default::default()
        },
        NewTicket {
            ticket_id: 1002,
            status: "1".into(),
            kind: s("Plumbing"),
            property: s("7 Birch Lane"),
            subject: s("Kitchen sink leak"),
            scope: s("Locate and repair the leak under the kitchen sink."),
            due_date: s("2024-06-01 09:30:00"),
            maps_url: s("https://maps.google.com/?q=7+Birch+Lane"),
            vendor_name: s("Best Roofing"),
            payment_model: s("Fixed Cost - Vendor NOT Confirmed"),
            ..Default::default()
        },
        NewTicket {
            ticket_id: 1003,
            status: "1".into(),
            kind: s("Plumbing"),
            property: s("12 Oak Street"),
            subject: s("Water heater flush"),
            scope: s("Annual water heater flush and anode check."),
            due_date: s("2024-06-15"),
            vendor_logo_url: s("https://logos.example.com/acme.png"),
            vendor_name: s("Acme Roofing!"),
            payment_model: s("Open Ended"),
            ..Default::default()
        },
        NewTicket {
            ticket_id: 1004,
            status: "1".into(),
            kind: s("Landscaping"),
            property: s("40 Cedar Court"),
            subject: s("Weekly mowing"),
            due_date: s("2024-07-01"),
            maps_url: s("https://maps.google.com/?q=40+Cedar+Court"),
            vendor_name: s("Green Thumb Co."),
            payment_model: s("Schedule Pay"),
            ..Default::default()
        },
        NewTicket {
            ticket_id: 1005,
            status: "1".into(),
            kind: s("Electrical"),
            property: s("7 Birch Lane"),
            subject: s("Panel inspection"),
            due_date: s("2024-07-10"),
            vendor_name: s("Volt Bros"),
            payment_model: s("Time and Materials"),
            ..Default::default()
        },
        NewTicket {
            ticket_id: 1006,
            status: DEFAULT_EXCLUDED_STATUSES[0].into(),
            kind: s("Roofing"),
            property: s("40 Cedar Court"),
            subject: s("Gutter cleaning (cancelled)"),
            due_date: s("2024-05-20"),
            vendor_name: s("Acme Roofing!"),
            payment_model: s("Open Ended"),
            ..Default::default()
        },
        NewTicket {
            ticket_id: 1007,
            status: "1".into(),
            kind: s("Painting"),
            property: s("12 Oak Street"),
            subject: s("Touch-up trim"),
            vendor_name: s("Acme Roofing!"),
            payment_model: s("Open Ended"),
            ..Default::default()
        },
    ]
}

pub fn seed_sample(conn: &Connection) -> AppResult<usize> {
    let tickets = sample_tickets();
    for t in &tickets {
        insert_ticket(conn, t)?;
    }
    Ok(tickets.len())
}
