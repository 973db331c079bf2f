use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::path::expand_tilde;
use crate::warehouse::fixture::{create_fixture, seed_sample};
use std::path::Path;

/// Handle the `init` command
///
/// This initializes:
///  - the configuration file (kept if present, fixture override applied)
///  - the secrets template next to it
///  - with --fixture, a local SQLite warehouse (demo tickets with --sample)
pub fn handle(cli: &Cli, config_path: &Path) -> AppResult<()> {
    let sample = matches!(cli.command, Commands::Init { sample: true });
    if sample && cli.fixture.is_none() {
        return Err(AppError::Config("--sample requires --fixture <path>".into()));
    }

    info("Initializing vendortickets…");
    let cfg = Config::init_all(config_path, cli.fixture.as_deref())?;
    success(format!("Config file : {}", config_path.display()));
    success(format!("Secrets file: {}", cfg.secrets_path().display()));

    if let Some(fixture) = &cli.fixture {
        let path = expand_tilde(fixture);
        let conn = create_fixture(&path)?;
        success(format!("Fixture warehouse: {}", path.display()));

        if sample {
            let n = seed_sample(&conn)?;
            success(format!("Inserted {} sample tickets", n));
        }
    } else {
        warning(format!(
            "Fill in the warehouse credentials in {} before rendering.",
            cfg.secrets_path().display()
        ));
    }

    Ok(())
}
