use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::params::PageRequest;
use crate::core::pipeline::fetch_dashboard;
use crate::errors::AppResult;
use crate::models::ticket::DISPLAY_COLUMNS;
use crate::ui::messages::{header, toast};
use crate::utils::table::{Column, Table};

/// Wrap widths for the terminal, per display column.
const MAX_WIDTHS: [usize; 8] = [14, 20, 28, 40, 10, 24, 14, 36];

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { url } = cmd {
        let request = PageRequest::from_url(url, cfg.dashboard.vendor_match)?;
        let dashboard = fetch_dashboard(cfg, &request)?;

        let title = match (&dashboard.vendor, &dashboard.vendor_key) {
            (Some(v), _) => format!("{} Tickets", v.name),
            (None, Some(key)) => format!("{} Tickets", key),
            (None, None) => "All Vendor Tickets".to_string(),
        };
        header(format!("{} ({} open)", title, dashboard.open_count()));

        let columns = DISPLAY_COLUMNS
            .iter()
            .zip(MAX_WIDTHS)
            .map(|(h, w)| Column::new(h, w))
            .collect();
        let mut table = Table::new(columns);
        for row in &dashboard.visible {
            table.add_row(row.text_cells());
        }

        print!("{}", table.render());
        toast(dashboard.visible_count());
    }
    Ok(())
}
