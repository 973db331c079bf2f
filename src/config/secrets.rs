//! Warehouse credentials, read from a YAML secrets file kept outside the
//! main configuration.

use crate::errors::{AppError, AppResult};
use secrecy::SecretString;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

pub const PASSWORD_ENV: &str = "VENDORTICKETS_SNOWFLAKE_PASSWORD";
pub const TOKEN_ENV: &str = "VENDORTICKETS_SNOWFLAKE_TOKEN";

pub const TEMPLATE: &str = r#"# Warehouse credentials for vendortickets.
# password / token may also be supplied through
# VENDORTICKETS_SNOWFLAKE_PASSWORD / VENDORTICKETS_SNOWFLAKE_TOKEN.
snowflake:
  account: ""
  user: ""
  password: ""
  token: ""
  role: ""
  warehouse: ""
  database: ""
  schema: ""
"#;

#[derive(Deserialize)]
struct SecretsFile {
    snowflake: RawSecrets,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawSecrets {
    account: String,
    user: String,
    password: String,
    token: String,
    role: String,
    warehouse: String,
    database: String,
    schema: String,
}

#[derive(Debug)]
pub struct WarehouseSecrets {
    pub account: String,
    pub user: String,
    pub password: Option<SecretString>,
    pub token: Option<SecretString>,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

fn secret(file_value: String, env_key: &str) -> Option<SecretString> {
    env::var(env_key)
        .ok()
        .and_then(non_empty)
        .or_else(|| non_empty(file_value))
        .map(SecretString::from)
}

impl WarehouseSecrets {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Secrets(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        let file: SecretsFile =
            serde_yaml::from_str(content).map_err(|e| AppError::Secrets(e.to_string()))?;
        let raw = file.snowflake;

        let account = non_empty(raw.account)
            .ok_or_else(|| AppError::Secrets("snowflake.account is required".into()))?;
        let user = non_empty(raw.user)
            .ok_or_else(|| AppError::Secrets("snowflake.user is required".into()))?;

        Ok(Self {
            account,
            user,
            password: secret(raw.password, PASSWORD_ENV),
            token: secret(raw.token, TOKEN_ENV),
            role: non_empty(raw.role),
            warehouse: non_empty(raw.warehouse),
            database: non_empty(raw.database),
            schema: non_empty(raw.schema),
        })
    }
}
