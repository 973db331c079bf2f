use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::params::PageRequest;
use crate::core::pipeline::fetch_dashboard;
use crate::errors::AppResult;
use crate::export::{ExportFormat, ensure_writable, export_csv, export_json};
use crate::models::ticket::TicketExport;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        url,
        force,
    } = cmd
    {
        let path = Path::new(file);
        ensure_writable(path, *force)?;

        let request = PageRequest::from_url(url, cfg.dashboard.vendor_match)?;
        let dashboard = fetch_dashboard(cfg, &request)?;
        let tickets: Vec<TicketExport> = dashboard.visible.iter().map(TicketExport::from).collect();

        match format {
            ExportFormat::Csv => export_csv(&tickets, path)?,
            ExportFormat::Json => export_json(&tickets, path)?,
        }
    }
    Ok(())
}
