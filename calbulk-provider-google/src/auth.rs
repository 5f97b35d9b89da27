//! OAuth installed-app flow with a loopback redirect.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;

use anyhow::{Context, Result};
use google_calendar::Client;
use tracing::info;

use crate::app_config;
use crate::session::SessionData;
use crate::userinfo::{self, USERINFO_URL};

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/userinfo.email",
];

const REDIRECT_PORT: u16 = 8085;

pub fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

/// Run the consent flow in the browser and return the new session for the
/// account that signed in. The caller decides whether to keep it.
pub async fn authenticate() -> Result<SessionData> {
    let creds = app_config::load()?;

    let mut client = Client::new(
        creds.client_id,
        creds.client_secret,
        redirect_uri(),
        String::new(),
        String::new(),
    );

    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();
    let auth_url = client.user_consent_url(&scopes);

    eprintln!("\nOpen this URL in your browser to authenticate:\n");
    eprintln!("{}\n", auth_url);

    if open::that(&auth_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let (code, state) = tokio::task::spawn_blocking(wait_for_callback)
        .await
        .context("OAuth callback listener stopped unexpectedly")??;

    info!("received authorization code, exchanging for tokens");

    let tokens = client
        .get_access_token(&code, &state)
        .await
        .context("Failed to exchange code for tokens")?;

    let http = reqwest::Client::new();
    let email = userinfo::fetch_email(&http, USERINFO_URL, &tokens.access_token).await?;

    Ok(SessionData::from_tokens(&email, &tokens))
}

/// Accept one request on the redirect port and pull `code` and `state` from it.
fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", REDIRECT_PORT))
        .with_context(|| format!("Failed to bind to port {}", REDIRECT_PORT))?;

    eprintln!("Waiting for OAuth callback on port {}...", REDIRECT_PORT);

    let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let params = parse_callback(&request_line);

    let body = match &params {
        Ok(_) => "<h1>Signed in to calbulk</h1><p>You can close this window.</p>",
        Err(_) => "<h1>Sign-in failed</h1><p>Return to the terminal for details.</p>",
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>{body}</body></html>"
    );

    stream.write_all(response.as_bytes())?;
    stream.flush()?;

    params
}

/// Parse `GET /callback?code=..&state=.. HTTP/1.1`.
fn parse_callback(request_line: &str) -> Result<(String, String)> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .context("Invalid request")?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        anyhow::bail!("Authorization was not granted: {error}");
    }

    let code = param("code").context("No code in callback")?;
    let state = param("state").context("No state in callback")?;

    Ok((code, state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code_and_state() {
        let (code, state) =
            parse_callback("GET /callback?state=xyz&code=4%2F0Abc HTTP/1.1\r\n").unwrap();

        assert_eq!(code, "4/0Abc");
        assert_eq!(state, "xyz");
    }

    #[test]
    fn denied_consent_is_an_error() {
        let err = parse_callback("GET /callback?error=access_denied HTTP/1.1").unwrap_err();

        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn missing_code_is_an_error() {
        assert!(parse_callback("GET /callback?state=xyz HTTP/1.1").is_err());
        assert!(parse_callback("").is_err());
    }
}
