//! Which account a token belongs to.

use anyhow::{Context, Result};
use serde::Deserialize;

pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo?alt=json";

#[derive(Deserialize)]
struct UserInfo {
    email: String,
}

/// Email address of the account `access_token` was issued for.
pub async fn fetch_email(http: &reqwest::Client, url: &str, access_token: &str) -> Result<String> {
    let response = http
        .get(url)
        .bearer_auth(access_token)
        .send()
        .await
        .context("Failed to reach the Google user info endpoint")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Failed to look up account email: HTTP {status}: {body}");
    }

    let info: UserInfo = response
        .json()
        .await
        .context("Failed to parse user info response")?;

    Ok(info.email)
}
