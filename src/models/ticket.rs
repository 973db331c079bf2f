use crate::models::payment_model::PaymentModel;
use crate::utils::date::format_date;
use crate::utils::html;
use chrono::NaiveDate;
use serde::Serialize;

/// Header labels of the rendered table, in display order.
pub const DISPLAY_COLUMNS: [&str; 8] = [
    "Type",
    "Property",
    "Name",
    "Scope",
    "Due Date",
    "File URL",
    "Directions",
    "Pricing",
];

pub const DIRECTIONS_LABEL: &str = "Get Directions";

/// One open ticket as returned by the warehouse, with derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRecord {
    pub kind: Option<String>,
    pub property: Option<String>,
    pub name: Option<String>,
    pub scope: Option<String>,
    pub scope_file_url: Option<String>,
    pub scope_file_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub maps_url: Option<String>,
    pub confirmed_amount: Option<String>,
    pub vendor_logo_url: Option<String>,
    pub vendor_name: Option<String>,
    pub payment_model: Option<PaymentModel>,
    /// Bid-submission URL (`<base> || TICKET_ID`).
    pub bid_url: Option<String>,
    pub vendor_key: Option<String>,
    /// Pricing label computed by the query.
    pub pricing_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    pub label: String,
}

impl Link {
    pub fn new(href: &str, label: &str) -> Self {
        Self {
            href: href.to_string(),
            label: label.to_string(),
        }
    }

    pub fn to_html(&self) -> String {
        html::anchor(&self.href, &self.label)
    }
}

/// A display-ready ticket: the eight table columns, links resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRow {
    pub kind: Option<String>,
    pub property: Option<String>,
    pub name: Option<String>,
    pub scope: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub file: Option<Link>,
    pub directions: Option<Link>,
    pub pricing: Option<Link>,
}

fn text(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

fn link_html(l: &Option<Link>) -> String {
    l.as_ref().map(Link::to_html).unwrap_or_default()
}

fn link_label(l: &Option<Link>) -> String {
    l.as_ref().map(|l| l.label.clone()).unwrap_or_default()
}

impl TicketRow {
    pub fn due_date_text(&self) -> String {
        self.due_date.as_ref().map(format_date).unwrap_or_default()
    }

    /// Cells as HTML fragments: text escaped, links as anchors.
    pub fn html_cells(&self) -> [String; 8] {
        [
            html::escape(&text(&self.kind)),
            html::escape(&text(&self.property)),
            html::escape(&text(&self.name)),
            html::escape(&text(&self.scope)),
            self.due_date_text(),
            link_html(&self.file),
            link_html(&self.directions),
            link_html(&self.pricing),
        ]
    }

    /// Cells as plain text for terminal output: links show their label.
    pub fn text_cells(&self) -> Vec<String> {
        vec![
            text(&self.kind),
            text(&self.property),
            text(&self.name),
            text(&self.scope),
            self.due_date_text(),
            link_label(&self.file),
            link_label(&self.directions),
            link_label(&self.pricing),
        ]
    }
}

/// Flat shape for CSV / JSON export.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TicketExport {
    pub r#type: String,
    pub property: String,
    pub name: String,
    pub scope: String,
    pub due_date: String,
    pub file_name: String,
    pub file_url: String,
    pub directions_url: String,
    pub pricing_label: String,
    pub pricing_url: String,
}

impl From<&TicketRow> for TicketExport {
    fn from(row: &TicketRow) -> Self {
        let href = |l: &Option<Link>| l.as_ref().map(|l| l.href.clone()).unwrap_or_default();
        Self {
            r#type: text(&row.kind),
            property: text(&row.property),
            name: text(&row.name),
            scope: text(&row.scope),
            due_date: row.due_date_text(),
            file_name: link_label(&row.file),
            file_url: href(&row.file),
            directions_url: href(&row.directions),
            pricing_label: link_label(&row.pricing),
            pricing_url: href(&row.pricing),
        }
    }
}
