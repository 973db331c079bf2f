use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod secrets;

/// Table name used by the SQLite fixture warehouse, whatever `warehouse.table` says.
pub const FIXTURE_TABLE: &str = "TICKETS";

/// Status codes of closed or cancelled tickets.
pub const DEFAULT_EXCLUDED_STATUSES: [&str; 4] =
    ["184338463", "230160731", "230030964", "184367022"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    Snowflake,
    Sqlite,
}

/// How the tool authenticates to the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AuthStrategy {
    /// Interactive browser single sign-on.
    LocalSso,
    /// OAuth token, falling back to password when no token is configured.
    CloudOauth,
    /// Plain username/password.
    CloudPassword,
}

impl AuthStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStrategy::LocalSso => "local-sso",
            AuthStrategy::CloudOauth => "cloud-oauth",
            AuthStrategy::CloudPassword => "cloud-password",
        }
    }
}

/// How the vendor key from the URL is compared against `VENDOR_NAME`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VendorMatch {
    /// Both sides normalized to lowercase-hyphenated keys.
    Normalized,
    /// Raw key compared with the vendor name as stored.
    Exact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub backend: Backend,
    pub auth: AuthStrategy,
    pub table: String,
    /// Fixture database used by the `sqlite` backend.
    pub sqlite_path: Option<String>,
    /// Overrides `<account>.snowflakecomputing.com`.
    pub host: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Snowflake,
            auth: AuthStrategy::LocalSso,
            table: "PRODUCTION.COMPANY.TICKETS".to_string(),
            sqlite_path: None,
            host: None,
            timeout_secs: None,
        }
    }
}

impl WarehouseConfig {
    pub fn table_name(&self) -> &str {
        match self.backend {
            Backend::Snowflake => &self.table,
            Backend::Sqlite => FIXTURE_TABLE,
        }
    }
}

/// Settings that shape the query and the rows, independent of any rendering surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub require_due_date: bool,
    pub vendor_match: VendorMatch,
    pub excluded_statuses: Vec<String>,
    pub bid_base_url: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            require_due_date: true,
            vendor_match: VendorMatch::Normalized,
            excluded_statuses: DEFAULT_EXCLUDED_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bid_base_url: "https://welcome.bcstonehomes.com/vendor-bids?ticket_id=".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub title: String,
    pub icon: String,
    pub company_name: String,
    pub company_logo_url: String,
    pub link_color: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            title: "Vendor Tickets Dashboard".to_string(),
            icon: "📋".to_string(),
            company_name: "BC Stone Homes".to_string(),
            company_logo_url:
                "https://i.ibb.co/Y4ZXb53Y/BC-Stone-Homes-Your-Land-or-Ours-Logo-1.png".to_string(),
            link_color: "#0099D6".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_secrets_file")]
    pub secrets_file: String,
    #[serde(default)]
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub page: PageSettings,
}

fn default_secrets_file() -> String {
    Config::config_dir()
        .join("secrets.yml")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secrets_file: default_secrets_file(),
            warehouse: WarehouseConfig::default(),
            dashboard: DashboardSettings::default(),
            page: PageSettings::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vendortickets")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("vendortickets.conf")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Point the warehouse at a local fixture database.
    pub fn use_fixture(&mut self, fixture: &str) {
        self.warehouse.backend = Backend::Sqlite;
        self.warehouse.sqlite_path = Some(fixture.to_string());
    }

    pub fn secrets_path(&self) -> PathBuf {
        expand_tilde(&self.secrets_file)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// List the keys present in the defaults but missing from the file at `path`,
    /// as dotted paths (`warehouse.auth`, `page.title`, ...).
    pub fn missing_keys(path: &Path) -> AppResult<Vec<String>> {
        let content = fs::read_to_string(path)?;
        let on_disk: Value = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let defaults = serde_yaml::to_value(Self::default())
            .map_err(|e| AppError::Config(e.to_string()))?;

        let mut missing = Vec::new();
        collect_missing(&defaults, &on_disk, "", &mut missing);
        Ok(missing)
    }

    /// Write the config file (and a secrets template next to it) unless they exist.
    /// Returns the config actually written or found.
    pub fn init_all(path: &Path, fixture: Option<&str>) -> AppResult<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            let mut cfg = Self::default();
            if let Some(dir) = path.parent() {
                cfg.secrets_file = dir.join("secrets.yml").to_string_lossy().to_string();
            }
            cfg
        };

        if let Some(f) = fixture {
            config.use_fixture(f);
        }

        let mut file = fs::File::create(path)?;
        file.write_all(config.to_yaml()?.as_bytes())?;

        let secrets = config.secrets_path();
        if !secrets.exists() {
            if let Some(dir) = secrets.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(&secrets, secrets::TEMPLATE)?;
        }

        Ok(config)
    }
}

fn collect_missing(defaults: &Value, actual: &Value, prefix: &str, out: &mut Vec<String>) {
    let Some(def_map) = defaults.as_mapping() else {
        return;
    };
    let act_map = actual.as_mapping();

    for (k, v) in def_map {
        let Some(key) = k.as_str() else { continue };
        let dotted = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };

        match act_map.and_then(|m| m.get(k)) {
            None => out.push(dotted),
            Some(child) => collect_missing(v, child, &dotted, out),
        }
    }
}
