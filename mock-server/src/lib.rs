use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use uuid::Uuid;

pub const REQUEST_ID: HeaderName = HeaderName::from_static("request-id");

/// What the server saw, as returned by the echo route.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/empty", any(empty))
        .route("/invalid-json", any(invalid_json))
        .fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// The caller's `request-id`, or a fresh one.
fn request_id(headers: &HeaderMap) -> HeaderValue {
    headers
        .get(&REQUEST_ID)
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok())
        .unwrap_or_else(|| HeaderValue::from_static("unknown"))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    tracing::debug!(%method, %uri, "echo");
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    let echo = Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect(),
        body,
    };
    ([(REQUEST_ID, request_id(&headers))], Json(echo)).into_response()
}

async fn status(
    Path(code): Path<u16>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let body = query.get("body").cloned().unwrap_or_default();
    Ok((status, [(REQUEST_ID, request_id(&headers))], body).into_response())
}

async fn empty(headers: HeaderMap) -> Response {
    ([(REQUEST_ID, request_id(&headers))], "").into_response()
}

async fn invalid_json(headers: HeaderMap) -> Response {
    ([(REQUEST_ID, request_id(&headers))], "{\"unterminated\": ").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            path: "/things".to_string(),
            query: None,
            headers: BTreeMap::new(),
            body: Value::Null,
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["path"], "/things");
        assert!(json["query"].is_null());
        assert!(json["body"].is_null());
    }

    #[test]
    fn request_id_is_echoed_when_present() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID, HeaderValue::from_static("abc"));
        assert_eq!(request_id(&headers), "abc");
    }

    #[test]
    fn request_id_is_generated_when_absent() {
        let id = request_id(&HeaderMap::new());
        let id = id.to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok(), "not a uuid: {id}");
    }
}
