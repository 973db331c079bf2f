//! The page pipeline: request → query → rows → dashboard model.
//! Rendering lives in `export`.

use crate::config::{Config, DashboardSettings};
use crate::core::filters::{FilterOptions, FilterSelection};
use crate::core::params::PageRequest;
use crate::core::query::build_ticket_query;
use crate::core::shaper::{records_from, shape};
use crate::errors::AppResult;
use crate::models::ticket::{TicketRecord, TicketRow};
use crate::warehouse::{Warehouse, connect};
use tracing::{info, warn};

/// Header branding for a vendor-filtered page, read from the first matching row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorHeader {
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub vendor_key: Option<String>,
    pub vendor: Option<VendorHeader>,
    /// Every row the query returned, in query order.
    pub rows: Vec<TicketRow>,
    pub options: FilterOptions,
    pub selection: FilterSelection,
    /// `rows` narrowed by `selection`.
    pub visible: Vec<TicketRow>,
}

impl Dashboard {
    pub fn open_count(&self) -> usize {
        self.rows.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

fn vendor_header(key: Option<&str>, records: &[TicketRecord]) -> Option<VendorHeader> {
    let key = key?;
    let first = records.first()?;
    Some(VendorHeader {
        name: first.vendor_name.clone().unwrap_or_else(|| key.to_string()),
        logo_url: first.vendor_logo_url.clone(),
    })
}

/// Run the query for `request` on an open warehouse and build the page model.
pub fn load_dashboard(
    warehouse: &mut dyn Warehouse,
    table: &str,
    settings: &DashboardSettings,
    request: &PageRequest,
) -> AppResult<Dashboard> {
    let query = build_ticket_query(
        table,
        settings,
        request.vendor_key.as_deref(),
        warehouse.dialect(),
    )?;

    let result = warehouse.query(&query)?;
    let records = records_from(&result)?;
    let rows = shape(&records);

    let options = FilterOptions::from_rows(&rows);
    let visible = request.filters.apply(&rows);

    info!(
        vendor = request.vendor_key.as_deref().unwrap_or("*"),
        rows = rows.len(),
        visible = visible.len(),
        "dashboard loaded"
    );

    Ok(Dashboard {
        vendor_key: request.vendor_key.clone(),
        vendor: vendor_header(request.vendor_key.as_deref(), &records),
        rows,
        options,
        selection: request.filters.clone(),
        visible,
    })
}

/// Open a connection, load the dashboard, and close the connection on every path.
pub fn fetch_dashboard(cfg: &Config, request: &PageRequest) -> AppResult<Dashboard> {
    let mut warehouse = connect(cfg)?;
    let result = load_dashboard(
        warehouse.as_mut(),
        cfg.warehouse.table_name(),
        &cfg.dashboard,
        request,
    );

    if let Err(e) = warehouse.close() {
        warn!(error = %e, "failed to close warehouse connection");
    }

    result
}
