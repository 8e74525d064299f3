//! Turns every response of the catalog service into JSON content or a typed error
use crate::error::{Result, StacError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::debug;

const JSON_CONTENT_TYPES: [&str; 2] = ["application/json", "application/hal+json"];
const DEFAULT_ERROR_MESSAGE: &str = "Error in catalog request.";

/// `target` names the item or catalog the request addressed, reported back on a 404.
pub async fn handle_response(response: Response, target: Option<&str>) -> Result<Option<Value>> {
    let status = response.status();
    debug!(status = status.as_u16(), "HTTP Status: {}", status);

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response.text().await?;

    interpret(status, content_type.as_deref(), &body, target)
}

pub fn interpret(
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
    target: Option<&str>,
) -> Result<Option<Value>> {
    // Credentials, missing ids and gateway outages are decided by status alone;
    // the body only contributes a message when it happens to be readable.
    if !status.is_success() {
        let readable = if is_json(content_type) {
            serde_json::from_str::<Value>(body).ok()
        } else {
            None
        };
        let message = error_message(readable.as_ref());

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = target {
                return Err(StacError::NotFound { id: id.to_string() });
            }
        }
        if is_unauthorized(status) {
            return Err(StacError::Authentication {
                message: message.unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }
        if is_unavailable(status) {
            return Err(StacError::unavailable(
                message.unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }
    }

    // A misconfigured gateway answers with HTML, which is never a valid catalog response.
    if !is_json(content_type) {
        return Err(StacError::InvalidResponse(format!(
            "STAC server response content-type is not JSON: {}",
            content_type.unwrap_or("<none>")
        )));
    }

    let content = if body.trim().is_empty() {
        None
    } else {
        let value: Value = serde_json::from_str(body).map_err(|_| {
            StacError::InvalidResponse("STAC server response body is invalid JSON".to_string())
        })?;
        Some(value)
    };

    if status.is_success() {
        return Ok(content);
    }

    let message =
        error_message(content.as_ref()).unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
    let request_id = content
        .as_ref()
        .and_then(|c| c.get("request-id"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    if status.is_client_error() || status.is_server_error() {
        return Err(StacError::Service {
            status: status.as_u16(),
            message,
            request_id,
        });
    }
    Err(StacError::Service {
        status: status.as_u16(),
        message: format!("Unsupported HTTP status {} returned.", status.as_u16()),
        request_id,
    })
}

fn error_message(content: Option<&Value>) -> Option<String> {
    content?.get("Message")?.as_str().map(str::to_owned)
}

fn is_json(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let essence = content_type.split(';').next().unwrap_or("").trim();
    JSON_CONTENT_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(essence))
}

fn is_unauthorized(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

fn is_unavailable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const JSON: Option<&str> = Some("application/json");

    #[test]
    fn test_success_with_body() {
        let content = interpret(StatusCode::OK, JSON, r#"{"id": "wv"}"#, None).unwrap();
        assert_eq!(content, Some(json!({"id": "wv"})));
    }

    #[test]
    fn test_success_without_body() {
        assert_eq!(interpret(StatusCode::OK, JSON, "", None).unwrap(), None);
    }

    #[test]
    fn test_content_type_with_charset() {
        let content_type = Some("application/hal+json; charset=utf-8");
        assert!(interpret(StatusCode::OK, content_type, "[]", None).is_ok());
    }

    #[test]
    fn test_html_rejected() {
        let err = interpret(StatusCode::OK, Some("text/html"), "<html/>", None).unwrap_err();
        assert!(matches!(err, StacError::InvalidResponse(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = interpret(StatusCode::OK, JSON, "{nope", None).unwrap_err();
        assert!(matches!(err, StacError::InvalidResponse(_)));
    }

    #[test]
    fn test_unauthorized() {
        let body = r#"{"Message": "Unauthorized"}"#;
        let err = interpret(StatusCode::UNAUTHORIZED, JSON, body, Some("abc")).unwrap_err();
        match err {
            StacError::Authentication { message } => assert_eq!(message, "Unauthorized"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_forbidden_without_json() {
        let err = interpret(StatusCode::FORBIDDEN, Some("text/plain"), "denied", None).unwrap_err();
        assert!(matches!(err, StacError::Authentication { .. }));
    }

    #[test]
    fn test_unauthorized_with_unreadable_json() {
        let err = interpret(StatusCode::UNAUTHORIZED, JSON, "Unauthorized", Some("abc")).unwrap_err();
        assert!(matches!(err, StacError::Authentication { message } if message == "HTTP 401 Unauthorized"));
    }

    #[test]
    fn test_not_found_without_json() {
        let err = interpret(StatusCode::NOT_FOUND, Some("text/plain"), "missing", Some("nope")).unwrap_err();
        assert!(matches!(err, StacError::NotFound { id } if id == "nope"));
    }

    #[test]
    fn test_unavailable_with_unreadable_json() {
        let err = interpret(StatusCode::SERVICE_UNAVAILABLE, JSON, "<<garbage", None).unwrap_err();
        assert!(matches!(err, StacError::ServiceUnavailable { .. }));
    }

    #[test]
    fn test_not_found_without_target_is_service_error() {
        let err = interpret(StatusCode::NOT_FOUND, JSON, "{}", None).unwrap_err();
        assert!(matches!(err, StacError::Service { status: 404, .. }));
    }

    #[test]
    fn test_not_found_carries_target() {
        let err = interpret(StatusCode::NOT_FOUND, JSON, "{}", Some("wv")).unwrap_err();
        assert!(matches!(err, StacError::NotFound { id } if id == "wv"));
    }

    #[test]
    fn test_service_error_fields() {
        let body = r#"{"Message": "bad geometry", "request-id": "r-1"}"#;
        let err = interpret(StatusCode::BAD_REQUEST, JSON, body, None).unwrap_err();
        match err {
            StacError::Service {
                status,
                message,
                request_id,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad geometry");
                assert_eq!(request_id.as_deref(), Some("r-1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_default_error_message() {
        let err = interpret(StatusCode::INTERNAL_SERVER_ERROR, JSON, "", None).unwrap_err();
        assert!(matches!(err, StacError::Service { message, .. } if message == DEFAULT_ERROR_MESSAGE));
    }

    #[test]
    fn test_gateway_errors_are_unavailable() {
        let err = interpret(StatusCode::SERVICE_UNAVAILABLE, Some("text/html"), "", None).unwrap_err();
        assert!(matches!(err, StacError::ServiceUnavailable { .. }));
        let err = interpret(StatusCode::GATEWAY_TIMEOUT, JSON, "{}", None).unwrap_err();
        assert!(matches!(err, StacError::ServiceUnavailable { .. }));
    }

    #[test]
    fn test_unsupported_status() {
        let err = interpret(StatusCode::MULTIPLE_CHOICES, JSON, "{}", None).unwrap_err();
        assert!(matches!(err, StacError::Service { status: 300, .. }));
    }
}
