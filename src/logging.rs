//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the response body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged at the `debug` level.
///
/// Password fields in JSON request bodies are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    if headers.method.eq(&axum::http::Method::POST)
        && headers.headers.get(CONTENT_TYPE) == Some(&"application/json".parse().unwrap())
    {
        let display_text = redact_json_string_field(&body_text, "password");
        log_request(&headers, &display_text);
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&headers, &body_text);

    Response::from_parts(headers, body_text.into())
}

/// Replace the string value of `field_name` in the JSON text `body` with
/// asterisks.
///
/// This works on the raw text rather than parsed JSON so that invalid JSON
/// can still be logged. Escaped quotes inside the value are not handled, so
/// part of such a value may be logged.
fn redact_json_string_field(body: &str, field_name: &str) -> String {
    let key = format!("\"{field_name}\"");
    let key_start = match body.find(&key) {
        Some(position) => position,
        None => return body.to_string(),
    };

    let after_key = &body[key_start + key.len()..];
    let colon_offset = match after_key.find(':') {
        Some(position) => position,
        None => return body.to_string(),
    };
    let value_start = match after_key[colon_offset..].find('"') {
        Some(position) => colon_offset + position + 1,
        None => return body.to_string(),
    };
    let value_end = match after_key[value_start..].find('"') {
        Some(position) => value_start + position,
        None => return body.to_string(),
    };

    let mut redacted = String::with_capacity(body.len());
    redacted.push_str(&body[..key_start + key.len() + value_start]);
    redacted.push_str("********");
    redacted.push_str(&after_key[value_end..]);

    redacted
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod redaction_tests {
    use super::redact_json_string_field;

    #[test]
    fn redacts_password_value() {
        let body = r#"{"email": "foo@bar.baz", "password": "hunter2"}"#;

        let redacted = redact_json_string_field(body, "password");

        assert_eq!(
            redacted,
            r#"{"email": "foo@bar.baz", "password": "********"}"#
        );
    }

    #[test]
    fn redacts_password_when_not_last_field() {
        let body = r#"{"password": "hunter2", "email": "foo@bar.baz"}"#;

        let redacted = redact_json_string_field(body, "password");

        assert_eq!(
            redacted,
            r#"{"password": "********", "email": "foo@bar.baz"}"#
        );
    }

    #[test]
    fn leaves_body_without_password_unchanged() {
        let body = r#"{"amount": 50.0, "kind": "income"}"#;

        let redacted = redact_json_string_field(body, "password");

        assert_eq!(redacted, body);
    }

    #[test]
    fn leaves_invalid_json_unchanged() {
        let body = "not json at all";

        let redacted = redact_json_string_field(body, "password");

        assert_eq!(redacted, body);
    }
}
