//! SQL for the ticket listing. Every value that is not a fixed literal is a
//! `?` placeholder with its value in `bindings`, in placeholder order.

use crate::config::{DashboardSettings, VendorMatch};
use crate::errors::{AppError, AppResult};
use crate::models::payment_model::{PaymentModel, PricingLabel};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Snowflake,
    Sqlite,
}

impl Dialect {
    fn due_date_expr(&self) -> &'static str {
        match self {
            Dialect::Snowflake => "CAST(ASSET_TICKET_DUE_DATE AS DATE)",
            Dialect::Sqlite => "date(ASSET_TICKET_DUE_DATE)",
        }
    }

    fn amount_text_expr(&self) -> &'static str {
        match self {
            Dialect::Snowflake => "CAST(CONFIRMED_TICKET_AMOUNT AS VARCHAR)",
            Dialect::Sqlite => "CAST(CONFIRMED_TICKET_AMOUNT AS TEXT)",
        }
    }

    /// SQL twin of `normalize_vendor_key`. The SQLite side is a Rust function
    /// registered on the connection.
    pub fn vendor_key_expr(&self) -> &'static str {
        match self {
            Dialect::Snowflake => {
                "TRIM(REGEXP_REPLACE(LOWER(VENDOR_NAME), '[^a-z0-9]+', '-'), '-')"
            }
            Dialect::Sqlite => "VENDOR_KEY(VENDOR_NAME)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketQuery {
    pub sql: String,
    pub bindings: Vec<String>,
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// `CASE` producing the pricing label, generated from [`PaymentModel`] so the
/// query and `PaymentModel::pricing_label` cannot drift apart.
pub fn pricing_case_expr(dialect: Dialect) -> String {
    let mut sql = String::from("CASE");
    for model in PaymentModel::KNOWN {
        let then = match model.label_rule() {
            PricingLabel::ConfirmedAmount => dialect.amount_text_expr().to_string(),
            PricingLabel::Literal(s) => quote_literal(s),
            PricingLabel::Empty => "''".to_string(),
        };
        sql.push_str(&format!(
            "\n            WHEN PRICING_AND_PAYMENT_MODEL = {} THEN {}",
            quote_literal(model.as_str()),
            then
        ));
    }
    sql.push_str("\n            ELSE ''\n        END");
    sql
}

fn table_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*){0,2}$")
            .expect("table name pattern is a valid regex")
    })
}

/// Table names cannot be bound, so they must be plain (optionally qualified) identifiers.
pub fn validate_table_name(table: &str) -> AppResult<()> {
    if table_name_re().is_match(table) {
        Ok(())
    } else {
        Err(AppError::Config(format!("invalid table name: {table:?}")))
    }
}

pub fn build_ticket_query(
    table: &str,
    settings: &DashboardSettings,
    vendor_key: Option<&str>,
    dialect: Dialect,
) -> AppResult<TicketQuery> {
    validate_table_name(table)?;

    let mut bindings = vec![settings.bid_base_url.clone()];

    let mut sql = format!(
        "SELECT
        TYPE,
        PROPERTY_NAME,
        SUBJECT AS NAME,
        TICKET_SCOPE,
        TICKET_SCOPE_FILE_URL,
        TICKET_SCOPE_MASTER_FILE_NAME,
        {due} AS ASSET_TICKET_DUE_DATE,
        GOOGLE_MAPS_URL,
        CONFIRMED_TICKET_AMOUNT,
        VENDOR_LOGO_URL,
        VENDOR_NAME,
        PRICING_AND_PAYMENT_MODEL,
        ? || TICKET_ID AS URL,
        {key} AS VENDOR_URL_NAME,
        {case} AS URL_TEXT
    FROM {table}",
        due = dialect.due_date_expr(),
        key = dialect.vendor_key_expr(),
        case = pricing_case_expr(dialect),
    );

    let mut predicates = Vec::new();

    if !settings.excluded_statuses.is_empty() {
        let marks = vec!["?"; settings.excluded_statuses.len()].join(", ");
        predicates.push(format!("STATUS NOT IN ({marks})"));
        bindings.extend(settings.excluded_statuses.iter().cloned());
    }

    if settings.require_due_date {
        predicates.push("ASSET_TICKET_DUE_DATE IS NOT NULL".to_string());
    }

    if let Some(key) = vendor_key {
        let lhs = match settings.vendor_match {
            VendorMatch::Normalized => dialect.vendor_key_expr(),
            VendorMatch::Exact => "VENDOR_NAME",
        };
        predicates.push(format!("{lhs} = ?"));
        bindings.push(key.to_string());
    }

    if !predicates.is_empty() {
        sql.push_str("\n    WHERE ");
        sql.push_str(&predicates.join("\n      AND "));
    }

    Ok(TicketQuery { sql, bindings })
}
