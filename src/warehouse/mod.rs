//! Warehouse connections: one per run, opened by [`connect`] and released by
//! [`Warehouse::close`] (or on drop).

pub mod fixture;
pub mod snowflake;
pub mod sqlite;
pub mod sso;

use crate::config::secrets::WarehouseSecrets;
use crate::config::{AuthStrategy, Backend, Config};
use crate::core::query::{Dialect, TicketQuery};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use crate::utils::path::expand_tilde;
use secrecy::SecretString;
use tracing::{debug, info};

/// Raw rows: every value as text, `None` for SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

pub trait Warehouse {
    fn dialect(&self) -> Dialect;

    /// Run one read-only statement with positional bindings.
    fn query(&mut self, query: &TicketQuery) -> AppResult<ResultSet>;

    /// Release the connection. Further queries fail.
    fn close(&mut self) -> AppResult<()>;
}

/// What the login exchange sends, after applying the strategy's fallbacks.
#[derive(Debug)]
pub enum Credentials<'a> {
    Password(&'a SecretString),
    OAuth(&'a SecretString),
    ExternalBrowser,
}

impl Credentials<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::Password(_) => "password",
            Credentials::OAuth(_) => "oauth",
            Credentials::ExternalBrowser => "externalbrowser",
        }
    }
}

pub fn resolve_credentials(
    strategy: AuthStrategy,
    secrets: &WarehouseSecrets,
) -> AppResult<Credentials<'_>> {
    let password = || {
        secrets
            .password
            .as_ref()
            .map(Credentials::Password)
            .ok_or_else(|| AppError::Connection("no password configured".into()))
    };

    match strategy {
        AuthStrategy::LocalSso => Ok(Credentials::ExternalBrowser),
        AuthStrategy::CloudOauth => match &secrets.token {
            Some(token) => Ok(Credentials::OAuth(token)),
            None => {
                warning("No OAuth token configured, falling back to password login.");
                password()
            }
        },
        AuthStrategy::CloudPassword => password(),
    }
}

/// Open the configured warehouse. Every failure is reported as a connection error.
pub fn connect(cfg: &Config) -> AppResult<Box<dyn Warehouse>> {
    let as_connection = |e: AppError| match e {
        AppError::Connection(_) => e,
        other => AppError::Connection(other.to_string()),
    };

    match cfg.warehouse.backend {
        Backend::Sqlite => {
            let path = cfg.warehouse.sqlite_path.as_deref().ok_or_else(|| {
                AppError::Connection("warehouse.sqlite_path is not set".into())
            })?;
            let path = expand_tilde(path);
            debug!(path = %path.display(), "opening fixture warehouse");
            let wh = sqlite::SqliteWarehouse::open(&path).map_err(as_connection)?;
            Ok(Box::new(wh))
        }
        Backend::Snowflake => {
            let secrets = WarehouseSecrets::load(&cfg.secrets_path()).map_err(as_connection)?;
            let creds = resolve_credentials(cfg.warehouse.auth, &secrets)?;
            info!(
                strategy = cfg.warehouse.auth.as_str(),
                credentials = creds.kind(),
                account = %secrets.account,
                "connecting to snowflake"
            );
            let session = snowflake::SnowflakeSession::login(&cfg.warehouse, &secrets, creds)
                .map_err(as_connection)?;
            Ok(Box::new(session))
        }
    }
}
