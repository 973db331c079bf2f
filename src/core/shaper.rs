//! Raw result set → ticket records → display rows.

use crate::errors::{AppError, AppResult};
use crate::models::payment_model::PaymentModel;
use crate::models::ticket::{DIRECTIONS_LABEL, Link, TicketRecord, TicketRow};
use crate::utils::date::parse_due_date;
use crate::warehouse::ResultSet;
use std::collections::HashMap;

/// Columns the display cannot do without.
const REQUIRED_COLUMNS: [&str; 10] = [
    "TYPE",
    "PROPERTY_NAME",
    "NAME",
    "TICKET_SCOPE",
    "TICKET_SCOPE_FILE_URL",
    "TICKET_SCOPE_MASTER_FILE_NAME",
    "ASSET_TICKET_DUE_DATE",
    "GOOGLE_MAPS_URL",
    "URL",
    "URL_TEXT",
];

struct ColumnIndex(HashMap<String, usize>);

impl ColumnIndex {
    fn new(columns: &[String]) -> AppResult<Self> {
        let map: HashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.to_ascii_uppercase(), i))
            .collect();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !map.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Query(format!(
                "result set is missing columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self(map))
    }

    fn get(&self, row: &[Option<String>], name: &str) -> Option<String> {
        self.0
            .get(name)
            .and_then(|i| row.get(*i))
            .and_then(|v| v.clone())
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

pub fn records_from(rs: &ResultSet) -> AppResult<Vec<TicketRecord>> {
    let idx = ColumnIndex::new(&rs.columns)?;

    Ok(rs
        .rows
        .iter()
        .map(|row| TicketRecord {
            kind: idx.get(row, "TYPE"),
            property: idx.get(row, "PROPERTY_NAME"),
            name: idx.get(row, "NAME"),
            scope: idx.get(row, "TICKET_SCOPE"),
            scope_file_url: non_blank(idx.get(row, "TICKET_SCOPE_FILE_URL")),
            scope_file_name: non_blank(idx.get(row, "TICKET_SCOPE_MASTER_FILE_NAME")),
            due_date: idx
                .get(row, "ASSET_TICKET_DUE_DATE")
                .as_deref()
                .and_then(parse_due_date),
            maps_url: non_blank(idx.get(row, "GOOGLE_MAPS_URL")),
            confirmed_amount: idx.get(row, "CONFIRMED_TICKET_AMOUNT"),
            vendor_logo_url: non_blank(idx.get(row, "VENDOR_LOGO_URL")),
            vendor_name: idx.get(row, "VENDOR_NAME"),
            payment_model: idx
                .get(row, "PRICING_AND_PAYMENT_MODEL")
                .map(|m| PaymentModel::parse(&m)),
            bid_url: non_blank(idx.get(row, "URL")),
            vendor_key: idx.get(row, "VENDOR_URL_NAME"),
            pricing_label: idx.get(row, "URL_TEXT"),
        })
        .collect())
}

pub fn shape_row(rec: &TicketRecord) -> TicketRow {
    let file = rec.scope_file_url.as_deref().map(|url| {
        let label = rec.scope_file_name.as_deref().unwrap_or(url);
        Link::new(url, label)
    });

    let directions = rec
        .maps_url
        .as_deref()
        .map(|url| Link::new(url, DIRECTIONS_LABEL));

    let pricing = rec.bid_url.as_deref().map(|url| {
        Link::new(url, rec.pricing_label.as_deref().unwrap_or(""))
    });

    TicketRow {
        kind: rec.kind.clone(),
        property: rec.property.clone(),
        name: rec.name.clone(),
        scope: rec.scope.clone(),
        due_date: rec.due_date,
        file,
        directions,
        pricing,
    }
}

pub fn shape(records: &[TicketRecord]) -> Vec<TicketRow> {
    records.iter().map(shape_row).collect()
}
