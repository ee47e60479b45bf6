//! API entry point

use axum::{http::StatusCode, response::IntoResponse, response::Response};

use super::links::LinkBuilder;
use super::negotiation::{json_representation, Negotiated, OutputFormat, HATEOAS_MEDIA_TYPE};
use crate::error::Result;

/// `GET /api`
///
/// Hypermedia clients get the top-level links, everyone else 204.
pub async fn get_root(Negotiated(format): Negotiated, links: LinkBuilder) -> Result<Response> {
    if format != OutputFormat::Hypermedia {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let representation = json_representation(HATEOAS_MEDIA_TYPE, &links.root_links())?;
    Ok(representation.into_response())
}
