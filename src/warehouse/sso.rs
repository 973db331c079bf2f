//! Browser single sign-on: ask the warehouse for an SSO URL, open it, and
//! wait on a loopback port for the redirect that carries the token.

use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, warning};
use crate::warehouse::snowflake::{CLIENT_APP_ID, CLIENT_APP_VERSION, Envelope, Wrapped, json_headers};
use reqwest::blocking::Client;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use tracing::debug;
use url::Url;

pub struct SsoGrant {
    pub token: SecretString,
    pub proof_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthenticatorRequest<'a> {
    client_app_id: &'a str,
    client_app_version: &'a str,
    account_name: &'a str,
    login_name: &'a str,
    authenticator: &'a str,
    browser_mode_redirect_port: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticatorResponse {
    sso_url: String,
    proof_key: String,
}

/// Largest redirect body accepted from the browser.
const MAX_REDIRECT_BODY: usize = 64 * 1024;

const CLOSE_PAGE: &str = "<!DOCTYPE html><html><head><title>Signed in</title></head>\
<body>Your identity was confirmed. You can close this window and return to the terminal.</body></html>";

pub fn browser_login(
    client: &Client,
    base_url: &str,
    account: &str,
    user: &str,
) -> AppResult<SsoGrant> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();

    let body = Wrapped {
        data: AuthenticatorRequest {
            client_app_id: CLIENT_APP_ID,
            client_app_version: CLIENT_APP_VERSION,
            account_name: account,
            login_name: user,
            authenticator: "EXTERNALBROWSER",
            browser_mode_redirect_port: port.to_string(),
        },
    };

    let url = format!(
        "{base_url}/session/authenticator-request?request_id={}",
        uuid::Uuid::new_v4()
    );
    let resp: Envelope<AuthenticatorResponse> = json_headers(client.post(url))
        .json(&body)
        .send()?
        .error_for_status()?
        .json()?;
    let auth = resp.into_data("authenticator request", AppError::Connection)?;

    info(format!(
        "Opening a browser for single sign-on. If it does not open, visit:\n{}",
        auth.sso_url
    ));
    open_browser(&auth.sso_url);

    debug!(port, "waiting for sso redirect");
    let (mut stream, _) = listener.accept()?;
    let request = read_request(&mut stream)?;
    respond(&mut stream)?;

    let token = extract_token(&request)
        .ok_or_else(|| AppError::Connection("single sign-on redirect carried no token".into()))?;

    Ok(SsoGrant {
        token: SecretString::from(token),
        proof_key: auth.proof_key,
    })
}

fn open_browser(url: &str) {
    if let Err(e) = open::that(url) {
        debug!(error = %e, "browser launch failed");
        warning("Could not launch a browser automatically.");
    }
}

/// Read the request line, headers and (if announced) the body.
fn read_request<R: Read>(stream: R) -> AppResult<String> {
    let mut reader = BufReader::new(stream);
    let mut request = String::new();
    let mut content_length = 0usize;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.trim().eq_ignore_ascii_case("content-length")
        {
            content_length = value.trim().parse().unwrap_or(0);
        }
        let end_of_headers = line == "\r\n" || line == "\n";
        request.push_str(&line);
        if end_of_headers {
            break;
        }
    }

    if content_length > MAX_REDIRECT_BODY {
        return Err(AppError::Connection(format!(
            "single sign-on redirect body too large ({content_length} bytes)"
        )));
    }

    if content_length > 0 {
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body)?;
        request.push_str(&String::from_utf8_lossy(&body));
    }

    Ok(request)
}

fn respond(stream: &mut TcpStream) -> AppResult<()> {
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        CLOSE_PAGE.len(),
        CLOSE_PAGE
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()?;
    Ok(())
}

/// Token from the redirect: the `token` query parameter of the request line,
/// or a `token` field of a form-encoded body.
pub fn extract_token(request: &str) -> Option<String> {
    let first_line = request.lines().next()?;
    let target = first_line.split_whitespace().nth(1)?;

    let from_query = Url::parse("http://localhost/")
        .ok()?
        .join(target)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "token")
                .map(|(_, v)| v.into_owned())
        });

    from_query
        .or_else(|| {
            let body = request
                .split_once("\r\n\r\n")
                .or_else(|| request.split_once("\n\n"))
                .map(|(_, b)| b)?;
            url::form_urlencoded::parse(body.trim().as_bytes())
                .find(|(k, _)| k == "token")
                .map(|(_, v)| v.into_owned())
        })
        .filter(|t| !t.is_empty())
}
