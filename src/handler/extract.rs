//! Request extraction module
//!
//! Validates the method and pulls one address (GET query string) or a list of
//! addresses (POST JSON body) out of a request, sanitizing each.
//!
//! The two paths fail differently on purpose. A single address that cannot be
//! sanitized fails the request with 400. Inside a batch the same condition
//! only blanks that position, so the output stays aligned with the input.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::{Method, Request, Uri};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use url::form_urlencoded;

use crate::http::{HttpError, HttpResult, E_INSUFFICIENT_QUERY, E_INVALID_QUERY};
use crate::postal::Sanitizer;

/// One address as submitted by a client
///
/// Decoding is lenient: a `null` element, a missing field and a `null`
/// address all give an empty address, and the `address` key matches in any
/// letter case. When several keys match, the last one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub address: String,
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QueryVisitor)
    }
}

struct QueryVisitor;

impl<'de> Visitor<'de> for QueryVisitor {
    type Value = Query;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with an address field, or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Query, E> {
        Ok(Query::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Query, E> {
        Ok(Query::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Query, A::Error> {
        let mut query = Query::default();
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("address") {
                query.address = map.next_value::<Option<String>>()?.unwrap_or_default();
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(query)
    }
}

/// Extract and sanitize the `address` query parameter of a GET request
pub fn get_address<B>(req: &Request<B>, sanitizer: &dyn Sanitizer) -> HttpResult<String> {
    is_valid_method(req.method(), &[Method::GET])?;
    let query = parse_request(req.uri())?;
    parse_query(&query, sanitizer)
}

/// Extract and sanitize every address in a POST body
///
/// The returned list has one entry per body element. Entries that fail
/// sanitization are empty strings; only a bad method or an unreadable body
/// fails the whole call.
pub async fn get_address_list<B>(
    req: Request<B>,
    sanitizer: &dyn Sanitizer,
    max_body_size: usize,
) -> HttpResult<Vec<String>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    is_valid_method(req.method(), &[Method::POST])?;
    let queries = parse_multi_request(req.into_body(), max_body_size).await?;

    Ok(queries
        .iter()
        .map(|q| parse_query(q, sanitizer).unwrap_or_default())
        .collect())
}

/// Read the whole body and decode it as a JSON array of [`Query`]
pub async fn parse_multi_request<B>(body: B, max_body_size: usize) -> HttpResult<Vec<Query>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = Limited::new(body, max_body_size)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                HttpError::payload_too_large()
            } else {
                HttpError::bad_request(e.to_string())
            }
        })?
        .to_bytes();

    // A literal `null` body is an empty batch
    serde_json::from_slice::<Option<Vec<Query>>>(&bytes)
        .map(Option::unwrap_or_default)
        .map_err(|e| HttpError::bad_request(e.to_string()))
}

/// Read the `address` parameter, trimming surrounding spaces
pub fn parse_request(uri: &Uri) -> HttpResult<Query> {
    let address = query_param(uri, "address").unwrap_or_default();
    let address = address.trim_matches(' ');

    if address.is_empty() {
        return Err(HttpError::bad_request(E_INSUFFICIENT_QUERY));
    }

    Ok(Query {
        address: address.to_string(),
    })
}

/// Sanitize a query, rejecting anything that cleans down to nothing
pub fn parse_query(query: &Query, sanitizer: &dyn Sanitizer) -> HttpResult<String> {
    let q = sanitizer
        .sanitize(&query.address)
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if q.is_empty() {
        return Err(HttpError::bad_request(E_INVALID_QUERY));
    }

    Ok(q)
}

/// Succeeds iff `method` is one of `allowed`
pub fn is_valid_method(method: &Method, allowed: &[Method]) -> HttpResult<()> {
    if allowed.contains(method) {
        Ok(())
    } else {
        Err(HttpError::method_not_allowed())
    }
}

/// First value of a query-string parameter, percent-decoded
pub fn query_param(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
