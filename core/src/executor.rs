//! Request building and response interpretation.
//!
//! # Design
//! The executor is split around the transport call: `build_request` turns
//! merged options into an `HttpRequest`, and `parse_response` turns the
//! transport's `HttpResponse` into either a JSON value or an `ApiError`.
//! Both halves are pure; `JsonClient` performs the I/O in between.

use serde_json::Value;

use crate::error::{ApiError, BaseError, EnrichedError, EnvelopeError, ResponseMeta};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::{RequestOptions, REQUEST_ID_HEADER};

const UNKNOWN_REASON: &str = "Unknown";

/// Overlay the method (and, for a non-null `body`, the serialized body plus
/// a JSON content type) on `options`.
///
/// The overlay goes through `RequestOptions::merge`, so it also picks up the
/// active `request_id`.
pub fn build_request(
    method: HttpMethod,
    url: &str,
    body: Option<&Value>,
    options: &RequestOptions,
    request_id: Option<&str>,
) -> Result<HttpRequest, serde_json::Error> {
    let mut overlay = RequestOptions::new().with_method(method.clone());
    if let Some(body) = body.filter(|body| !body.is_null()) {
        overlay = overlay
            .with_body(serde_json::to_string(body)?)
            .with_header("content-type", "application/json");
    }

    let merged = options.merge(Some(&overlay), request_id);
    Ok(HttpRequest {
        method: merged.method.unwrap_or(method),
        url: url.to_string(),
        headers: merged.headers,
        body: merged.body,
        extensions: merged.extensions,
    })
}

/// Interpret a response body according to its status.
///
/// A 2xx response yields the parsed body, or `Value::Null` when the body is
/// empty. Anything else yields an `ApiError`; the raw body is always kept in
/// the error's `meta.data` unless the server replaced `meta` itself.
pub fn parse_response(
    method: &HttpMethod,
    url: &str,
    response: HttpResponse,
) -> Result<Value, ApiError> {
    let status = response.status;
    let reason = if response.status_text.is_empty() {
        UNKNOWN_REASON
    } else {
        response.status_text.as_str()
    };
    let meta = ResponseMeta {
        http_status: status,
        method: method.as_str().to_string(),
        url: url.to_string(),
        request_id: response.header(REQUEST_ID_HEADER).unwrap_or_default().to_string(),
        data: String::new(),
    };

    if response.is_success() {
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&response.body).map_err(|_| {
            ApiError::Base(BaseError {
                message: "invalid json".to_string(),
                code: "invalid_json".to_string(),
                status_code: status,
                meta: ResponseMeta {
                    data: response.body.clone(),
                    ..meta.clone()
                },
            })
        });
    }

    let base = BaseError {
        message: format!("HTTP {status}: {reason}"),
        code: normalize_reason(reason),
        status_code: status,
        meta: ResponseMeta {
            data: response.body.clone(),
            ..meta
        },
    };
    Err(enrich(base, &response.body))
}

/// Fold a JSON error body into the base error when it has a usable shape.
fn enrich(base: BaseError, body: &str) -> ApiError {
    let Ok(Value::Object(payload)) = serde_json::from_str::<Value>(body) else {
        return ApiError::Base(base);
    };

    let code = match payload.get("code") {
        Some(Value::String(code)) => code.clone(),
        _ => {
            return ApiError::Envelope(EnvelopeError {
                message: base.message,
                code: base.code,
                status_code: base.status_code,
                meta: payload,
            })
        }
    };
    ApiError::Enriched(EnrichedError::new(base, code, payload))
}

/// Lowercase a reason phrase and turn each whitespace run into `_`.
pub fn normalize_reason(reason: &str) -> String {
    let mut code = String::with_capacity(reason.len());
    let mut in_space = false;
    for c in reason.chars() {
        if c.is_whitespace() {
            if !in_space {
                code.push('_');
            }
            in_space = true;
        } else {
            code.extend(c.to_lowercase());
            in_space = false;
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "http://localhost:3000/things";

    fn response(status: u16, status_text: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: vec![("Request-Id".to_string(), "req-42".to_string())],
            body: body.to_string(),
        }
    }

    fn parse(resp: HttpResponse) -> Result<Value, ApiError> {
        parse_response(&HttpMethod::Get, URL, resp)
    }

    #[test]
    fn build_request_without_body_sets_only_method() {
        let options = crate::options::default_options();
        let req = build_request(HttpMethod::Get, URL, None, &options, None).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, URL);
        assert!(req.body.is_none());
        assert!(!req.headers.contains_key("content-type"));
        assert_eq!(req.headers["accept"], "application/json");
    }

    #[test]
    fn build_request_treats_json_null_as_no_body() {
        let options = RequestOptions::new();
        let req = build_request(HttpMethod::Post, URL, Some(&Value::Null), &options, None).unwrap();
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_request_serializes_body_and_sets_content_type() {
        let options = RequestOptions::new().with_header("Content-Type", "text/plain");
        let body = json!({"title": "Buy milk", "tags": ["home"]});
        let req = build_request(HttpMethod::Post, URL, Some(&body), &options, None).unwrap();

        assert_eq!(req.headers["content-type"], "application/json");
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn build_request_method_argument_wins_over_options() {
        let options = RequestOptions::new().with_method(HttpMethod::Delete);
        let req = build_request(HttpMethod::Put, URL, None, &options, Some("trace-9")).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.headers["request-id"], "trace-9");
    }

    #[test]
    fn success_returns_parsed_json() {
        let value = parse(response(200, "OK", r#"{"a":[1,2,{"b":null}]}"#)).unwrap();
        assert_eq!(value, json!({"a": [1, 2, {"b": null}]}));
    }

    #[test]
    fn success_with_scalar_body() {
        assert_eq!(parse(response(201, "Created", "42")).unwrap(), json!(42));
    }

    #[test]
    fn empty_success_body_is_null() {
        assert_eq!(parse(response(204, "No Content", "")).unwrap(), Value::Null);
    }

    #[test]
    fn invalid_json_success_keeps_raw_body() {
        let err = parse(response(200, "OK", "{oops")).unwrap_err();
        assert_eq!(err.code(), "invalid_json");
        assert_eq!(err.message(), "invalid json");
        assert_eq!(err.status_code(), 200);
        assert_eq!(err.meta()["data"], "{oops");
        assert_eq!(err.meta()["requestID"], "req-42");
        assert_eq!(err.meta()["url"], URL);
    }

    #[test]
    fn non_json_failure_uses_reason_phrase() {
        let err = parse(response(404, "Not Found", "oops")).unwrap_err();
        assert!(matches!(err, ApiError::Base(_)));
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.message(), "HTTP 404: Not Found");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.meta()["data"], "oops");
        assert_eq!(err.meta()["method"], "GET");
        assert_eq!(err.meta()["httpStatus"], 404);
    }

    #[test]
    fn coded_failure_body_is_promoted() {
        let body = r#"{"code":"quota_exceeded","message":"over limit","extra":1}"#;
        let err = parse(response(429, "Too Many Requests", body)).unwrap_err();
        assert!(matches!(err, ApiError::Enriched(_)));
        assert_eq!(err.code(), "quota_exceeded");
        assert_eq!(err.message(), "over limit");
        assert_eq!(err.field("extra"), Some(&json!(1)));
        assert_eq!(err.meta()["data"], body);
    }

    #[test]
    fn uncoded_object_body_replaces_meta() {
        let err = parse(response(400, "Bad Request", r#"{"foo":"bar"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Envelope(_)));
        assert_eq!(err.code(), "bad_request");
        assert_eq!(err.meta(), json!({"foo": "bar"}));
    }

    #[test]
    fn non_string_code_replaces_meta_without_promotion() {
        let body = r#"{"code":409,"message":"taken"}"#;
        let err = parse(response(409, "Conflict", body)).unwrap_err();
        assert!(matches!(err, ApiError::Envelope(_)));
        assert_eq!(err.code(), "conflict");
        assert_eq!(err.message(), "HTTP 409: Conflict");
        assert_eq!(err.meta(), json!({"code": 409, "message": "taken"}));
        assert_eq!(err.field("message"), None);
    }

    #[test]
    fn meta_method_uses_canonical_verb_spelling() {
        let method = HttpMethod::from("get");
        let err = parse_response(&method, URL, response(404, "Not Found", "")).unwrap_err();
        assert_eq!(err.meta()["method"], "GET");

        let custom = HttpMethod::from("purge");
        let err = parse_response(&custom, URL, response(404, "Not Found", "")).unwrap_err();
        assert_eq!(err.meta()["method"], "purge");
    }

    #[test]
    fn non_object_json_failure_keeps_base_error() {
        for body in ["[1,2]", "3", "null", r#""text""#, "true"] {
            let err = parse(response(500, "Internal Server Error", body)).unwrap_err();
            assert!(matches!(err, ApiError::Base(_)), "body {body}");
            assert_eq!(err.code(), "internal_server_error");
            assert_eq!(err.meta()["data"], body);
        }
    }

    #[test]
    fn redirects_are_failures() {
        let err = parse(response(304, "Not Modified", "")).unwrap_err();
        assert_eq!(err.code(), "not_modified");
    }

    #[test]
    fn missing_reason_phrase_falls_back_to_unknown() {
        let err = parse(response(599, "", "")).unwrap_err();
        assert_eq!(err.code(), "unknown");
        assert_eq!(err.message(), "HTTP 599: Unknown");
    }

    #[test]
    fn missing_request_id_header_is_empty() {
        let mut resp = response(502, "Bad Gateway", "");
        resp.headers.clear();
        let err = parse(resp).unwrap_err();
        assert_eq!(err.meta()["requestID"], "");
    }

    #[test]
    fn normalize_reason_collapses_whitespace() {
        assert_eq!(normalize_reason("Not Found"), "not_found");
        assert_eq!(
            normalize_reason("Request  Header\tFields Too Large"),
            "request_header_fields_too_large"
        );
        assert_eq!(normalize_reason(" I'm a teapot "), "_i'm_a_teapot_");
        assert_eq!(normalize_reason("OK"), "ok");
    }
}
