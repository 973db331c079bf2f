//! Snowflake over its REST session protocol: login, query with bindings,
//! result chunk download, session delete.

use crate::config::WarehouseConfig;
use crate::config::secrets::WarehouseSecrets;
use crate::core::query::{Dialect, TicketQuery};
use crate::errors::{AppError, AppResult};
use crate::warehouse::sso;
use crate::warehouse::{Credentials, ResultSet, Warehouse};
use flate2::read::GzDecoder;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const CLIENT_APP_ID: &str = env!("CARGO_PKG_NAME");
pub const CLIENT_APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Response codes for a statement that is still running.
const QUERY_IN_PROGRESS: &str = "333333";
const QUERY_IN_PROGRESS_ASYNC: &str = "333334";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Response envelope shared by every session endpoint.
#[derive(Deserialize, Debug)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub code: Option<String>,
}

impl<T> Envelope<T> {
    /// Payload of a successful response; failures become `err(message)`.
    pub(crate) fn into_data(self, what: &str, err: fn(String) -> AppError) -> AppResult<T> {
        if !self.success {
            return Err(err(format!(
                "{what} failed: {} (code {})",
                self.message.unwrap_or_else(|| "no message".into()),
                self.code.unwrap_or_else(|| "?".into())
            )));
        }
        self.data
            .ok_or_else(|| err(format!("{what} returned no data")))
    }

    fn in_progress(&self) -> bool {
        matches!(
            self.code.as_deref(),
            Some(QUERY_IN_PROGRESS | QUERY_IN_PROGRESS_ASYNC)
        )
    }
}

#[derive(Serialize)]
pub(crate) struct Wrapped<T> {
    pub data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct LoginData<'a> {
    client_app_id: &'a str,
    client_app_version: &'a str,
    account_name: &'a str,
    login_name: &'a str,
    authenticator: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proof_key: Option<&'a str>,
    session_parameters: BTreeMap<&'a str, &'a str>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    sql_text: &'a str,
    async_exec: bool,
    sequence_id: u64,
    query_submission_time: i64,
    bindings: BTreeMap<String, Binding<'a>>,
}

#[derive(Serialize)]
struct Binding<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pending {
    get_result_url: String,
}

#[derive(Deserialize)]
struct RowType {
    name: String,
}

#[derive(Deserialize)]
struct Chunk {
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    rowtype: Vec<RowType>,
    #[serde(default)]
    rowset: Vec<Vec<Option<String>>>,
    #[serde(default)]
    chunks: Vec<Chunk>,
    #[serde(default)]
    chunk_headers: HashMap<String, String>,
    qrmk: Option<String>,
    query_result_format: Option<String>,
}

/// Account locator part of an identifier such as `xy12345.us-east-1`.
pub fn account_name(account: &str) -> &str {
    account.split('.').next().unwrap_or(account)
}

pub fn base_url(cfg: &WarehouseConfig, secrets: &WarehouseSecrets) -> String {
    match &cfg.host {
        Some(h) if h.starts_with("http://") || h.starts_with("https://") => {
            h.trim_end_matches('/').to_string()
        }
        Some(h) => format!("https://{}", h.trim_end_matches('/')),
        None => format!("https://{}.snowflakecomputing.com", secrets.account),
    }
}

/// Positional bindings keyed `"1"`, `"2"`, ... as the query endpoint expects.
fn bindings_map(values: &[String]) -> BTreeMap<String, Binding<'_>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            (
                (i + 1).to_string(),
                Binding {
                    kind: "TEXT",
                    value: v,
                },
            )
        })
        .collect()
}

/// Chunk bodies are usually gzip, whether or not the response says so.
pub(crate) fn decode_chunk(body: &[u8]) -> AppResult<String> {
    if body.starts_with(&GZIP_MAGIC) {
        let mut text = String::new();
        GzDecoder::new(body)
            .read_to_string(&mut text)
            .map_err(|e| AppError::Query(format!("cannot inflate result chunk: {e}")))?;
        Ok(text)
    } else {
        String::from_utf8(body.to_vec())
            .map_err(|e| AppError::Query(format!("result chunk is not UTF-8: {e}")))
    }
}

/// Chunk payloads are comma-separated row arrays without the enclosing brackets.
pub(crate) fn parse_chunk(body: &str) -> AppResult<Vec<Vec<Option<String>>>> {
    serde_json::from_str(&format!("[{body}]"))
        .map_err(|e| AppError::Query(format!("malformed result chunk: {e}")))
}

/// Query responses are decoded by hand so a malformed body is a query failure.
fn read_envelope(resp: Response) -> AppResult<Envelope<Value>> {
    let body = resp.error_for_status()?.text()?;
    serde_json::from_str(&body)
        .map_err(|e| AppError::Query(format!("malformed query response: {e}")))
}

fn decode<T: DeserializeOwned>(data: Value) -> AppResult<T> {
    serde_json::from_value(data)
        .map_err(|e| AppError::Query(format!("unexpected query response: {e}")))
}

pub(crate) fn json_headers(rb: RequestBuilder) -> RequestBuilder {
    rb.header(ACCEPT, "application/json")
        .header(CONTENT_TYPE, "application/json")
        .header(USER_AGENT, format!("{CLIENT_APP_ID}/{CLIENT_APP_VERSION}"))
}

pub struct SnowflakeSession {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
    sequence: u64,
}

impl SnowflakeSession {
    pub fn login(
        cfg: &WarehouseConfig,
        secrets: &WarehouseSecrets,
        creds: Credentials<'_>,
    ) -> AppResult<Self> {
        // No timeout unless one is configured.
        let client = Client::builder()
            .timeout(cfg.timeout_secs.map(Duration::from_secs))
            .build()?;
        let base_url = base_url(cfg, secrets);
        let account = account_name(&secrets.account);

        let grant = match creds {
            Credentials::ExternalBrowser => Some(sso::browser_login(
                &client,
                &base_url,
                account,
                &secrets.user,
            )?),
            _ => None,
        };

        let (authenticator, password, token, proof_key) = match (&creds, &grant) {
            (Credentials::Password(p), _) => ("SNOWFLAKE", Some(p.expose_secret()), None, None),
            (Credentials::OAuth(t), _) => ("OAUTH", None, Some(t.expose_secret()), None),
            (Credentials::ExternalBrowser, Some(g)) => (
                "EXTERNALBROWSER",
                None,
                Some(g.token.expose_secret()),
                Some(g.proof_key.as_str()),
            ),
            (Credentials::ExternalBrowser, None) => {
                return Err(AppError::Connection("single sign-on returned no token".into()));
            }
        };

        let mut session_parameters = BTreeMap::new();
        session_parameters.insert("QUERY_RESULT_FORMAT", "JSON");

        let body = Wrapped {
            data: LoginData {
                client_app_id: CLIENT_APP_ID,
                client_app_version: CLIENT_APP_VERSION,
                account_name: account,
                login_name: &secrets.user,
                authenticator,
                password,
                token,
                proof_key,
                session_parameters,
            },
        };

        let mut url = Url::parse(&format!("{base_url}/session/v1/login-request"))
            .map_err(|e| AppError::Connection(e.to_string()))?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("request_id", &uuid::Uuid::new_v4().to_string());
            if let Some(w) = &secrets.warehouse {
                q.append_pair("warehouse", w);
            }
            if let Some(d) = &secrets.database {
                q.append_pair("databaseName", d);
            }
            if let Some(s) = &secrets.schema {
                q.append_pair("schemaName", s);
            }
            if let Some(r) = &secrets.role {
                q.append_pair("roleName", r);
            }
        }

        debug!(authenticator, "sending login request");
        let resp: Envelope<LoginResponse> = json_headers(client.post(url))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        let login = resp.into_data("login", AppError::Connection)?;

        Ok(Self {
            client,
            base_url,
            token: Some(SecretString::from(login.token)),
            sequence: 0,
        })
    }

    fn authorized(&self, rb: RequestBuilder) -> AppResult<RequestBuilder> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| AppError::Query("session already closed".into()))?;
        Ok(json_headers(rb).header(
            AUTHORIZATION,
            format!("Snowflake Token=\"{}\"", token.expose_secret()),
        ))
    }

    /// Result URLs come back relative to the account host.
    fn result_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Submit the statement and wait for its result, polling while it runs.
    fn execute(&self, body: &QueryRequest<'_>) -> AppResult<QueryData> {
        let url = format!(
            "{}/queries/v1/query-request?requestId={}",
            self.base_url,
            uuid::Uuid::new_v4()
        );
        let mut resp = read_envelope(self.authorized(self.client.post(&url))?.json(body).send()?)?;

        while resp.in_progress() {
            let pending: Pending = decode(
                resp.data
                    .take()
                    .ok_or_else(|| AppError::Query("running query has no result URL".into()))?,
            )?;
            debug!(url = %pending.get_result_url, "query still running");
            thread::sleep(POLL_INTERVAL);

            let url = self.result_url(&pending.get_result_url);
            resp = read_envelope(self.authorized(self.client.get(&url))?.send()?)?;
        }

        decode(resp.into_data("query", AppError::Query)?)
    }

    fn fetch_chunk(&self, chunk: &Chunk, data: &QueryData) -> AppResult<Vec<Vec<Option<String>>>> {
        let mut rb = self.client.get(&chunk.url);
        if data.chunk_headers.is_empty() {
            if let Some(key) = &data.qrmk {
                rb = rb
                    .header("x-amz-server-side-encryption-customer-algorithm", "AES256")
                    .header("x-amz-server-side-encryption-customer-key", key);
            }
        } else {
            for (k, v) in &data.chunk_headers {
                rb = rb.header(k.as_str(), v.as_str());
            }
        }
        let body = rb.send()?.error_for_status()?.bytes()?;
        parse_chunk(&decode_chunk(&body)?)
    }

    /// Every failure past login, transport included, surfaces as a query error.
    fn run(&mut self, query: &TicketQuery) -> AppResult<ResultSet> {
        self.sequence += 1;
        let body = QueryRequest {
            sql_text: &query.sql,
            async_exec: false,
            sequence_id: self.sequence,
            query_submission_time: chrono::Utc::now().timestamp_millis(),
            bindings: bindings_map(&query.bindings),
        };
        let data = self.execute(&body)?;

        if let Some(fmt) = &data.query_result_format
            && !fmt.eq_ignore_ascii_case("json")
        {
            return Err(AppError::Query(format!("unsupported result format: {fmt}")));
        }

        let columns = data.rowtype.iter().map(|c| c.name.clone()).collect();
        let mut rows = data.rowset.clone();
        for chunk in &data.chunks {
            rows.extend(self.fetch_chunk(chunk, &data)?);
        }
        debug!(rows = rows.len(), chunks = data.chunks.len(), "query complete");

        Ok(ResultSet { columns, rows })
    }
}

impl Warehouse for SnowflakeSession {
    fn dialect(&self) -> Dialect {
        Dialect::Snowflake
    }

    fn query(&mut self, query: &TicketQuery) -> AppResult<ResultSet> {
        self.run(query).map_err(|e| match e {
            AppError::Query(_) => e,
            other => AppError::Query(other.to_string()),
        })
    }

    fn close(&mut self) -> AppResult<()> {
        if self.token.is_none() {
            return Ok(());
        }
        let url = format!("{}/session?delete=true", self.base_url);
        let result = self
            .authorized(self.client.post(&url))
            .and_then(|rb| Ok(rb.send()?.error_for_status()?));
        self.token = None;
        result.map(|_| ())
    }
}

impl Drop for SnowflakeSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close snowflake session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn test_parse_chunk() {
        assert!(parse_chunk("").expect("empty").is_empty());
        assert!(parse_chunk("\n").expect("blank").is_empty());

        let rows = parse_chunk(r#"["a",null],[null,"2024-06-01"]"#).expect("rows");
        assert_eq!(
            rows,
            vec![
                vec![Some("a".to_string()), None],
                vec![None, Some("2024-06-01".to_string())]
            ]
        );

        assert!(matches!(parse_chunk(r#"["a""#), Err(AppError::Query(_))));
    }

    #[test]
    fn test_decode_chunk_plain_and_gzip() {
        let text = r#"["x1","Roofing"]"#;
        assert_eq!(decode_chunk(text.as_bytes()).expect("plain"), text);

        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(text.as_bytes()).unwrap();
        let gz = enc.finish().unwrap();
        assert_eq!(decode_chunk(&gz).expect("gzip"), text);

        // magic bytes followed by garbage
        assert!(matches!(
            decode_chunk(&[0x1f, 0x8b, 0, 1, 2]),
            Err(AppError::Query(_))
        ));
    }

    #[test]
    fn test_bindings_are_positional() {
        let values = vec!["base".to_string(), "acme".to_string()];
        let json = serde_json::to_value(bindings_map(&values)).unwrap();
        assert_eq!(json["1"]["type"], "TEXT");
        assert_eq!(json["1"]["value"], "base");
        assert_eq!(json["2"]["value"], "acme");
        assert!(json.get("0").is_none());
    }

    #[test]
    fn test_envelope_failure_uses_given_category() {
        let env: Envelope<Value> =
            serde_json::from_str(r#"{"success":false,"message":"boom","code":"002003"}"#).unwrap();
        match env.into_data("query", AppError::Query) {
            Err(AppError::Query(m)) => assert!(m.contains("boom") && m.contains("002003")),
            other => panic!("expected query error, got {other:?}"),
        }

        let env: Envelope<Value> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(
            env.into_data("login", AppError::Connection),
            Err(AppError::Connection(_))
        ));
    }

    #[test]
    fn test_in_progress_codes() {
        for (code, running) in [("333333", true), ("333334", true), ("000000", false)] {
            let env: Envelope<Value> =
                serde_json::from_str(&format!(r#"{{"success":true,"code":"{code}"}}"#)).unwrap();
            assert_eq!(env.in_progress(), running, "{code}");
        }
    }
}
