//! HTTP transport types handed across the `Transport` boundary.
//!
//! # Design
//! Requests and responses are plain data. The client merges options into an
//! `HttpRequest`, the transport performs the round-trip and answers with an
//! `HttpResponse` whose body has already been read as text, and the response
//! is interpreted without touching the network again. This keeps request
//! building and response interpretation deterministic and easy to test.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP method for a request.
///
/// Standard verbs get their own variant; anything else is carried verbatim
/// in `Other` and passed to the transport unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other(method) => method,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = match s.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            _ => HttpMethod::Other(s.to_string()),
        };
        Ok(method)
    }
}

impl From<String> for HttpMethod {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(method) => method,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(s: &str) -> Self {
        HttpMethod::from(s.to_string())
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// A fully merged HTTP request, ready for a `Transport`.
///
/// Header names are lowercase. `extensions` carries transport-specific
/// passthrough fields from `RequestOptions` that the client itself does not
/// interpret.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub extensions: Map<String, Value>,
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` after the body has been read in full.
/// `status_text` is the reason phrase and may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; the first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            status_text: String::new(),
            headers: vec![("Request-ID".to_string(), "abc".to_string())],
            body: String::new(),
        }
    }

    #[test]
    fn standard_methods_parse_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!(HttpMethod::from("DELETE"), HttpMethod::Delete);
    }

    #[test]
    fn unknown_methods_are_kept_verbatim() {
        let method = HttpMethod::from("purge");
        assert_eq!(method, HttpMethod::Other("purge".to_string()));
        assert_eq!(method.as_str(), "purge");
    }

    #[test]
    fn method_serializes_as_string() {
        let json = serde_json::to_value(HttpMethod::Put).unwrap();
        assert_eq!(json, "PUT");
        let back: HttpMethod = serde_json::from_value(json).unwrap();
        assert_eq!(back, HttpMethod::Put);
    }

    #[test]
    fn success_covers_only_2xx() {
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(response(299).is_success());
        assert!(!response(199).is_success());
        assert!(!response(304).is_success());
        assert!(!response(404).is_success());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = response(200);
        assert_eq!(resp.header("request-id"), Some("abc"));
        assert_eq!(resp.header("REQUEST-ID"), Some("abc"));
        assert_eq!(resp.header("content-type"), None);
    }
}
