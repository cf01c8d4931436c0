use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderValue};
use reqwest::{Client, StatusCode};

use crate::environment::Endpoint;
use crate::error::{DarajaError, Result};
use crate::models::AccessToken;

/// Request a fresh bearer token with HTTP Basic auth.
///
/// Any status other than 200, or a body that is not `{access_token, expires_in}`,
/// is an [`DarajaError::Auth`]. Nothing is cached.
pub async fn fetch_access_token(
    http: &Client,
    app_key: &str,
    app_secret: &str,
    base_url: &str,
) -> Result<AccessToken> {
    let url = Endpoint::OAuth.url(base_url);
    tracing::debug!(%url, "Requesting gateway access token");

    let res = http
        .get(&url)
        .basic_auth(app_key, Some(app_secret))
        .header(ACCEPT, HeaderValue::from_static("application/json"))
        .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
        .send()
        .await?;

    let status = res.status();
    let body = res.text().await?;
    if status != StatusCode::OK {
        tracing::debug!(%status, "Gateway refused access token request");
        return Err(DarajaError::Auth {
            status: Some(status),
            body,
        });
    }

    serde_json::from_str::<AccessToken>(&body).map_err(|e| DarajaError::Auth {
        status: Some(status),
        body: format!("invalid token payload: {e}"),
    })
}
