use crate::config::AuthStrategy;
use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for vendortickets
/// Renders open vendor tickets from the warehouse as a filterable HTML dashboard
#[derive(Parser)]
#[command(
    name = "vendortickets",
    version = env!("CARGO_PKG_VERSION"),
    about = "Vendor tickets dashboard: query open tickets from the warehouse and render them as a filterable HTML page",
    long_about = None
)]
pub struct Cli {
    /// Use this configuration file instead of ~/.vendortickets/vendortickets.conf
    #[arg(global = true, long = "config")]
    pub config: Option<String>,

    /// Query a local SQLite fixture warehouse instead of the configured one
    #[arg(global = true, long = "fixture")]
    pub fixture: Option<String>,

    /// Override the configured authentication strategy
    #[arg(global = true, long = "auth", value_enum)]
    pub auth: Option<AuthStrategy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the configuration file and secrets template (optionally a fixture warehouse)
    Init {
        /// Fill the fixture warehouse (--fixture) with demo tickets
        #[arg(long = "sample")]
        sample: bool,
    },

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check the configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Render the dashboard page as HTML
    Render {
        /// Page URL or path; the vendor comes from the last path segment or ?vendor=,
        /// filters from repeated ?type=, ?property=, ?due=YYYY-MM-DD
        #[arg(long = "url", default_value = "/")]
        url: String,

        /// Write the page to this file instead of stdout
        #[arg(long = "out", short = 'o')]
        out: Option<String>,

        /// Overwrite --out without asking
        #[arg(long = "force")]
        force: bool,
    },

    /// Print the visible tickets as a table in the terminal
    List {
        #[arg(long = "url", default_value = "/")]
        url: String,
    },

    /// Export the visible tickets to CSV or JSON
    Export {
        /// Export format: csv | json
        #[arg(long, value_enum)]
        format: ExportFormat,

        /// Output file path
        #[arg(long)]
        file: String,

        #[arg(long = "url", default_value = "/")]
        url: String,

        /// Overwrite the output file without asking
        #[arg(long = "force")]
        force: bool,
    },

    /// Print the SQL statement and bindings for a page URL without connecting
    Sql {
        #[arg(long = "url", default_value = "/")]
        url: String,
    },
}
