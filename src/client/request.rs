//! Request plumbing shared by every HTTP client of the crate: headers,
//! response validation and `{status, data}` envelope decoding.

use http::header::{HeaderMap, HeaderValue, USER_AGENT as USER_AGENT_HEADER};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::{parse_resource_usage_header, ApiError, ErrorDetails};
use crate::utils::constants::{API_VERSION, API_VERSION_HEADER, RESOURCE_USAGE_HEADER, USER_AGENT};

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<Value>,
}

pub(crate) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));
    headers
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Map a response to the error taxonomy: 410, then 429, then any other failure status.
pub(crate) fn validate_response(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), ApiError> {
    if status == StatusCode::GONE {
        return Err(ApiError::VersionMismatch {
            used: API_VERSION.to_owned(),
            newest: header_str(headers, API_VERSION_HEADER).map(str::to_owned),
        });
    }

    let details = || serde_json::from_slice::<ErrorDetails>(body).ok();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::RateLimitExceeded {
            details: details(),
            limits: parse_resource_usage_header(header_str(headers, RESOURCE_USAGE_HEADER)),
        });
    }

    if status.is_client_error() || status.is_server_error() {
        let details = details();
        let message = details
            .as_ref()
            .and_then(|d| d.message.clone())
            .unwrap_or_else(|| "Unexpected error".to_owned());
        return Err(ApiError::Request {
            status,
            message,
            details,
        });
    }

    if let Some(current) = header_str(headers, API_VERSION_HEADER) {
        if current != API_VERSION {
            warn!(
                "Used api version ({}) is outdated, use newest version ({}) by updating the SDK.",
                API_VERSION, current
            );
        }
    }
    Ok(())
}

/// Extract and deserialize the `data` member of the response envelope.
pub(crate) fn decode_data<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidResponse(format!("response is not a JSON envelope: {}", e)))?;
    let data = envelope
        .data
        .ok_or_else(|| ApiError::InvalidResponse("missing 'data' in response".to_owned()))?;
    serde_json::from_value(data).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

pub(crate) fn handle_response<T: DeserializeOwned>(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<T, ApiError> {
    validate_response(status, headers, body)?;
    decode_data(body)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn gone_maps_to_version_mismatch() {
        let mut headers = HeaderMap::new();
        headers.insert("x-current-api-version", HeaderValue::from_static("v6"));

        let err = validate_response(StatusCode::GONE, &headers, b"").unwrap_err();
        match &err {
            ApiError::VersionMismatch { used, newest } => {
                assert_eq!(used, "v5");
                assert_eq!(newest.as_deref(), Some("v6"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("(v6)"));
    }

    #[test]
    fn too_many_requests_carries_limits() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-resource-usage",
            HeaderValue::from_static("WORKER_TIME-3600=11.78/10000000"),
        );
        let payload = body(json!({"appCode": "RATE_LIMIT", "message": "slow down"}));

        let err = validate_response(StatusCode::TOO_MANY_REQUESTS, &headers, &payload).unwrap_err();
        assert!(err.is_request_error());
        match err {
            ApiError::RateLimitExceeded { details, limits } => {
                assert_eq!(details.unwrap().app_code.as_deref(), Some("RATE_LIMIT"));
                assert_eq!(limits["WORKER_TIME"]["3600"]["10000000"], 11.78);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn error_status_uses_body_message_or_fallback() {
        let headers = HeaderMap::new();
        let payload = body(json!({"message": "Advertiser not found", "errors": {"hash": "bad"}}));

        let err = validate_response(StatusCode::NOT_FOUND, &headers, &payload).unwrap_err();
        assert_eq!(err.to_string(), "Advertiser not found");
        assert!(err.details().unwrap().errors.is_some());

        let err = validate_response(StatusCode::BAD_GATEWAY, &headers, b"<html>").unwrap_err();
        assert_eq!(err.to_string(), "Unexpected error");
        assert!(err.details().is_none());
    }

    #[test]
    fn envelope_without_data_is_invalid() {
        let err = decode_data::<Value>(&body(json!({"status": "ok"}))).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));

        let err = decode_data::<Value>(b"not json").unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));

        let data: Vec<u32> = decode_data(&body(json!({"status": "ok", "data": [1, 2]}))).unwrap();
        assert_eq!(data, vec![1, 2]);
    }

    #[test]
    fn joins_base_url_and_path() {
        assert_eq!(join_url("http://h/v5/", "/user/info"), "http://h/v5/user/info");
        assert_eq!(join_url("http://h/v5", "user/info"), "http://h/v5/user/info");
    }
}
