//! Request body parsing and media-type based payload selection

use axum::http::{header, HeaderMap};
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Payload format implied by a `Content-Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Xml,
}

impl BodyFormat {
    /// `application/json`, `application/xml`, `text/xml` and any `+json`/`+xml` type
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = media_type_essence(content_type).to_ascii_lowercase();
        if essence == "application/json" || essence.ends_with("+json") {
            Some(Self::Json)
        } else if essence == "application/xml" || essence == "text/xml" || essence.ends_with("+xml")
        {
            Some(Self::Xml)
        } else {
            None
        }
    }
}

fn media_type_essence(value: &str) -> &str {
    value.split(';').next().unwrap_or("").trim()
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

/// Selects a handler branch by comparing one request header to media types
///
/// Matching is case-insensitive and ignores media type parameters such as
/// `charset`.
#[derive(Debug, Clone, Copy)]
pub struct MediaTypeConstraint {
    header: &'static str,
    media_types: &'static [&'static str],
}

impl MediaTypeConstraint {
    pub const fn new(header: &'static str, media_types: &'static [&'static str]) -> Self {
        Self {
            header,
            media_types,
        }
    }

    pub fn matches(&self, headers: &HeaderMap) -> bool {
        let Some(value) = headers.get(self.header).and_then(|v| v.to_str().ok()) else {
            return false;
        };
        let essence = media_type_essence(value);
        self.media_types
            .iter()
            .any(|media_type| essence.eq_ignore_ascii_case(media_type))
    }
}

/// Deserialize a JSON or XML body according to its `Content-Type`
///
/// Unsupported or missing content types answer 415, an empty or unreadable
/// body 400.
pub fn parse_body<T: DeserializeOwned>(headers: &HeaderMap, body: &Bytes) -> Result<T> {
    let content_type = content_type(headers).unwrap_or("");
    let format = BodyFormat::from_content_type(content_type).ok_or_else(|| {
        tracing::warn!(content_type = %content_type, "Unsupported request body type");
        Error::UnsupportedMediaType(content_type.to_string())
    })?;

    if body.iter().all(u8::is_ascii_whitespace) {
        tracing::warn!("Request body is missing");
        return Err(Error::BadRequest("A request body is required".to_string()));
    }

    match format {
        BodyFormat::Json => serde_json::from_slice(body).map_err(|e| {
            tracing::warn!("Unreadable JSON body: {}", e);
            Error::BadRequest(format!("Invalid JSON body: {}", e))
        }),
        BodyFormat::Xml => {
            let text = std::str::from_utf8(body)
                .map_err(|e| Error::BadRequest(format!("XML body is not UTF-8: {}", e)))?;
            quick_xml::de::from_str(text).map_err(|e| {
                tracing::warn!("Unreadable XML body: {}", e);
                Error::BadRequest(format!("Invalid XML body: {}", e))
            })
        }
    }
}

/// Deserialize a JSON-only body, such as a JSON Patch document
pub fn parse_json_body<T: DeserializeOwned>(headers: &HeaderMap, body: &Bytes) -> Result<T> {
    let content_type = content_type(headers).unwrap_or("");
    match BodyFormat::from_content_type(content_type) {
        Some(BodyFormat::Json) => parse_body(headers, body),
        _ => Err(Error::UnsupportedMediaType(content_type.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        title: String,
    }

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    const AUTHOR_FULL: MediaTypeConstraint = MediaTypeConstraint::new(
        "content-type",
        &["application/vnd.marvin.author.full+json"],
    );

    #[test]
    fn test_constraint_is_case_insensitive() {
        assert!(AUTHOR_FULL.matches(&headers("application/VND.marvin.author.full+json")));
        assert!(AUTHOR_FULL.matches(&headers(
            "application/vnd.marvin.author.full+json; charset=utf-8"
        )));
        assert!(!AUTHOR_FULL.matches(&headers("application/json")));
        assert!(!AUTHOR_FULL.matches(&HeaderMap::new()));
    }

    #[test]
    fn test_parse_json_and_vendor_json() {
        let body = Bytes::from_static(br#"{"title":"It"}"#);
        let parsed: Payload = parse_body(&headers("application/json"), &body).unwrap();
        assert_eq!(parsed.title, "It");
        let parsed: Payload =
            parse_body(&headers("application/vnd.marvin.author.full+json"), &body).unwrap();
        assert_eq!(parsed.title, "It");
    }

    #[test]
    fn test_parse_xml() {
        let body = Bytes::from_static(b"<Payload><title>It</title></Payload>");
        let parsed: Payload = parse_body(&headers("application/xml"), &body).unwrap();
        assert_eq!(parsed.title, "It");
    }

    #[test]
    fn test_empty_body_is_400() {
        let result: Result<Payload> = parse_body(&headers("application/json"), &Bytes::new());
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_unknown_content_type_is_415() {
        let body = Bytes::from_static(b"title=It");
        let result: Result<Payload> = parse_body(&headers("text/plain"), &body);
        assert!(matches!(result, Err(Error::UnsupportedMediaType(_))));
        let result: Result<Payload> = parse_body(&HeaderMap::new(), &body);
        assert!(matches!(result, Err(Error::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_json_only_rejects_xml() {
        let body = Bytes::from_static(b"<Payload><title>It</title></Payload>");
        let result: Result<Payload> = parse_json_body(&headers("application/xml"), &body);
        assert!(matches!(result, Err(Error::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_malformed_json_is_400() {
        let body = Bytes::from_static(b"{not json");
        let result: Result<Payload> = parse_body(&headers("application/json"), &body);
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }
}
