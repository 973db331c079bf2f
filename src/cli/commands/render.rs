use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::params::PageRequest;
use crate::core::pipeline::fetch_dashboard;
use crate::errors::AppResult;
use crate::export::ensure_writable;
use crate::export::html::{render_error_page, render_page};
use crate::ui::messages::{success, toast};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Render { url, out, force } = cmd {
        if let Some(path) = out {
            ensure_writable(Path::new(path), *force)?;
        }

        let request = PageRequest::from_url(url, cfg.dashboard.vendor_match)?;

        // Connection and query failures still produce a page, with the error inline.
        let (page, outcome) = match fetch_dashboard(cfg, &request) {
            Ok(dashboard) => {
                toast(dashboard.visible_count());
                (render_page(&dashboard, &cfg.page), Ok(()))
            }
            Err(e) if e.is_page_error() => (render_error_page(&e, &cfg.page), Err(e)),
            Err(e) => return Err(e),
        };

        match out {
            Some(path) => {
                fs::write(path, page)?;
                success(format!("Page written to {}", path));
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(page.as_bytes())?;
                stdout.flush()?;
            }
        }

        return outcome;
    }
    Ok(())
}
