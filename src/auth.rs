//! Exchange a username and password for a bearer token
use crate::error::{Result, StacError};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

pub async fn request_token(
    http: &reqwest::Client,
    auth_url: &Url,
    username: &str,
    password: &SecretString,
) -> Result<SecretString> {
    let params = [
        ("grant_type", "password"),
        ("username", username),
        ("password", password.expose_secret()),
    ];
    info!("Requesting token from {}", auth_url);
    let response = http.post(auth_url.clone()).form(&params).send().await?;
    let status = response.status();
    debug!(status = status.as_u16(), "Token service responded");
    if matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    ) {
        return Err(StacError::unavailable(format!(
            "authorization service returned HTTP {}",
            status
        )));
    }

    let text = response.text().await?;
    parse_token_response(&text).map_err(|err| match err {
        StacError::InvalidResponse(_) if status.is_client_error() => StacError::Authentication {
            message: format!("authorization service returned HTTP {}", status),
        },
        err => err,
    })
}

pub fn parse_token_response(text: &str) -> Result<SecretString> {
    let body: Value = serde_json::from_str(text).map_err(|_| {
        StacError::InvalidResponse(
            "Error requesting token. Response from authorization service is not JSON.".to_string(),
        )
    })?;

    let token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty());
    if let Some(token) = token {
        info!("Token successfully received.");
        return Ok(SecretString::from(token.to_owned()));
    }

    let error = body
        .get("Error")
        .or_else(|| body.get("error_description"))
        .or_else(|| body.get("error"));
    if let Some(error) = error {
        let message = error
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string());
        return Err(StacError::Authentication { message });
    }

    Err(StacError::Authentication {
        message: format!("Unexpected response from authorization service: {}", body),
    })
}
