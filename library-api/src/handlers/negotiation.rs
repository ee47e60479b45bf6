//! Output content negotiation
//!
//! The `Accept` header picks one [`OutputFormat`] per request. Each format
//! has a [`Renderer`]: the plain ones emit bare objects and arrays, the
//! hypermedia one attaches links and wraps collections in `{value, links}`.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderName, HeaderValue},
};
use serde::Serialize;
use serde_json::{json, Value};

use super::links::LinkDto;
use crate::error::{Error, Result};
use crate::repository::PageInfo;
use crate::responses::Representation;
use crate::shaping::ShapedEntity;

pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const XML_MEDIA_TYPE: &str = "application/xml";
pub const HATEOAS_MEDIA_TYPE: &str = "application/vnd.marvin.hateoas+json";

/// Pagination metadata header of collection responses
pub const X_PAGINATION: HeaderName = HeaderName::from_static("x-pagination");

/// Representation selected from the `Accept` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Xml,
    Hypermedia,
}

impl OutputFormat {
    fn from_media_range(range: &str) -> Option<Self> {
        let essence = range.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(HATEOAS_MEDIA_TYPE) {
            Some(Self::Hypermedia)
        } else if essence.eq_ignore_ascii_case(JSON_MEDIA_TYPE)
            || essence == "*/*"
            || essence.eq_ignore_ascii_case("application/*")
        {
            Some(Self::Json)
        } else if essence.eq_ignore_ascii_case(XML_MEDIA_TYPE)
            || essence.eq_ignore_ascii_case("text/xml")
        {
            Some(Self::Xml)
        } else {
            None
        }
    }

    /// First supported media range of an `Accept` value
    ///
    /// A missing or blank header means JSON.
    pub fn from_accept(accept: Option<&str>) -> Result<Self> {
        let Some(accept) = accept.map(str::trim).filter(|a| !a.is_empty()) else {
            return Ok(Self::Json);
        };

        accept
            .split(',')
            .find_map(Self::from_media_range)
            .ok_or_else(|| Error::NotAcceptable(accept.to_string()))
    }

    pub fn renderer(self) -> &'static dyn Renderer {
        match self {
            Self::Json => &PlainJson,
            Self::Xml => &PlainXml,
            Self::Hypermedia => &Hypermedia,
        }
    }
}

/// Extractor for the negotiated [`OutputFormat`]; rejects with 406
#[derive(Debug, Clone, Copy)]
pub struct Negotiated(pub OutputFormat);

impl<S: Send + Sync> FromRequestParts<S> for Negotiated {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok());
        let format = OutputFormat::from_accept(accept).inspect_err(|_| {
            tracing::warn!(accept = ?accept, "No acceptable representation");
        })?;
        Ok(Self(format))
    }
}

/// A shaped resource together with its links
#[derive(Debug, Clone, Default)]
pub struct LinkedResource {
    pub fields: ShapedEntity,
    pub links: Vec<LinkDto>,
}

impl LinkedResource {
    pub fn new(fields: ShapedEntity) -> Self {
        Self {
            fields,
            links: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_links(mut self, links: Vec<LinkDto>) -> Self {
        self.links = links;
        self
    }
}

/// Per-format response construction
pub trait Renderer: Send + Sync {
    /// Whether link building is worth doing for this format
    fn wants_links(&self) -> bool;

    /// Single resource; `root` names the XML element
    fn item(&self, resource: LinkedResource, root: &str) -> Result<Representation>;

    /// Resource collection with collection-level links
    fn collection(
        &self,
        resources: Vec<LinkedResource>,
        links: Vec<LinkDto>,
        root: &str,
    ) -> Result<Representation>;

    /// `X-Pagination` payload
    fn pagination(&self, info: PageInfo, previous: Option<String>, next: Option<String>) -> Value {
        json!({
            "totalCount": info.total_count,
            "pageSize": info.page_size,
            "currentPage": info.current_page,
            "totalPages": info.total_pages,
            "previousPageLink": previous,
            "nextPageLink": next,
        })
    }
}

/// `X-Pagination` header value for `metadata`
pub fn pagination_header(metadata: &Value) -> Result<HeaderValue> {
    Ok(HeaderValue::from_str(&serde_json::to_string(metadata)?)?)
}

/// Serialize `value` as JSON tagged with `media_type`
pub fn json_representation<T: Serialize>(
    media_type: &'static str,
    value: &T,
) -> Result<Representation> {
    Ok(Representation::new(media_type, serde_json::to_vec(value)?))
}

fn xml_body<T: Serialize>(root: &str, value: &T) -> Result<Representation> {
    let body = quick_xml::se::to_string_with_root(root, value)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    Ok(Representation::new(XML_MEDIA_TYPE, body))
}

/// Bare JSON objects and arrays
#[derive(Debug, Clone, Copy)]
pub struct PlainJson;

impl Renderer for PlainJson {
    fn wants_links(&self) -> bool {
        false
    }

    fn item(&self, resource: LinkedResource, _root: &str) -> Result<Representation> {
        json_representation(JSON_MEDIA_TYPE, &resource.fields)
    }

    fn collection(
        &self,
        resources: Vec<LinkedResource>,
        _links: Vec<LinkDto>,
        _root: &str,
    ) -> Result<Representation> {
        let items: Vec<ShapedEntity> = resources.into_iter().map(|r| r.fields).collect();
        json_representation(JSON_MEDIA_TYPE, &items)
    }
}

/// XML documents, `<Root>` for items and `<ArrayOfRoot>` for collections
#[derive(Debug, Clone, Copy)]
pub struct PlainXml;

impl Renderer for PlainXml {
    fn wants_links(&self) -> bool {
        false
    }

    fn item(&self, resource: LinkedResource, root: &str) -> Result<Representation> {
        xml_body(root, &resource.fields)
    }

    fn collection(
        &self,
        resources: Vec<LinkedResource>,
        _links: Vec<LinkDto>,
        root: &str,
    ) -> Result<Representation> {
        // Each item becomes one repeated <root> child element
        let items: Vec<Value> = resources
            .into_iter()
            .map(|r| Value::Object(r.fields))
            .collect();
        let mut wrapper = serde_json::Map::new();
        wrapper.insert(root.to_string(), Value::Array(items));
        xml_body(&format!("ArrayOf{}", root), &wrapper)
    }
}

/// JSON with a `links` entry on every resource
#[derive(Debug, Clone, Copy)]
pub struct Hypermedia;

impl Hypermedia {
    fn linked(resource: LinkedResource) -> Result<ShapedEntity> {
        let mut fields = resource.fields;
        fields.insert("links".to_string(), serde_json::to_value(resource.links)?);
        Ok(fields)
    }
}

impl Renderer for Hypermedia {
    fn wants_links(&self) -> bool {
        true
    }

    fn item(&self, resource: LinkedResource, _root: &str) -> Result<Representation> {
        json_representation(HATEOAS_MEDIA_TYPE, &Self::linked(resource)?)
    }

    fn collection(
        &self,
        resources: Vec<LinkedResource>,
        links: Vec<LinkDto>,
        _root: &str,
    ) -> Result<Representation> {
        let value = resources
            .into_iter()
            .map(Self::linked)
            .collect::<Result<Vec<_>>>()?;
        json_representation(HATEOAS_MEDIA_TYPE, &json!({ "value": value, "links": links }))
    }

    // Page links travel in the body
    fn pagination(&self, info: PageInfo, _previous: Option<String>, _next: Option<String>) -> Value {
        json!({
            "totalCount": info.total_count,
            "pageSize": info.page_size,
            "currentPage": info.current_page,
            "totalPages": info.total_pages,
        })
    }
}
