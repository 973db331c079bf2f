use crate::cli::parser::Commands;
use crate::config::{Backend, Config};
use crate::core::params::PageRequest;
use crate::core::query::{Dialect, build_ticket_query};
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sql { url } = cmd {
        let request = PageRequest::from_url(url, cfg.dashboard.vendor_match)?;
        let dialect = match cfg.warehouse.backend {
            Backend::Snowflake => Dialect::Snowflake,
            Backend::Sqlite => Dialect::Sqlite,
        };

        let query = build_ticket_query(
            cfg.warehouse.table_name(),
            &cfg.dashboard,
            request.vendor_key.as_deref(),
            dialect,
        )?;

        println!("{};", query.sql);
        println!();
        println!("-- bindings");
        for (i, b) in query.bindings.iter().enumerate() {
            println!("-- {}: {:?}", i + 1, b);
        }
    }
    Ok(())
}
