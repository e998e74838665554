//! Address parsing handlers
//!
//! `ParserHandler` serves one address from the query string,
//! `MultiParserHandler` a JSON array of addresses from a POST body. Parsing
//! runs on the blocking pool since the engine call is synchronous and may be
//! slow; batch entries are parsed one after another, in input order.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};
use std::sync::Arc;
use std::time::Instant;

use super::extract;
use super::format::{format_parsed, FormattedResult, OutputFormat};
use crate::http::{write_error, write_response, HttpError};
use crate::logger::StatusLogger;
use crate::postal::{AddressParser, ParsedComponent, Sanitizer};

/// GET `?address=...[&format=keys]`
pub struct ParserHandler {
    parser: Arc<dyn AddressParser>,
    sanitizer: Arc<dyn Sanitizer>,
    logger: Arc<dyn StatusLogger>,
}

impl ParserHandler {
    pub fn new(
        parser: Arc<dyn AddressParser>,
        sanitizer: Arc<dyn Sanitizer>,
        logger: Arc<dyn StatusLogger>,
    ) -> Self {
        Self {
            parser,
            sanitizer,
            logger,
        }
    }

    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        let address = match extract::get_address(&req, self.sanitizer.as_ref()) {
            Ok(address) => address,
            Err(e) => return write_error(&e),
        };

        let t1 = Instant::now();
        let format = OutputFormat::from_param(extract::query_param(req.uri(), "format").as_deref());

        let parser = Arc::clone(&self.parser);
        let input = address.clone();
        let rsp = match tokio::task::spawn_blocking(move || parser.parse_address(&input)).await {
            Ok(parsed) => match format {
                OutputFormat::Keys => write_response(&format_parsed(&parsed)),
                OutputFormat::Components => write_response(&parsed),
            },
            Err(e) => write_error(&HttpError::internal(e.to_string())),
        };

        self.logger
            .status(&format!("parse '{address}' {:?}", t1.elapsed()));
        rsp
    }
}

/// POST `[{"address": ...}, ...]`, always answered in grouped form
pub struct MultiParserHandler {
    parser: Arc<dyn AddressParser>,
    sanitizer: Arc<dyn Sanitizer>,
    logger: Arc<dyn StatusLogger>,
    max_body_size: usize,
}

impl MultiParserHandler {
    pub fn new(
        parser: Arc<dyn AddressParser>,
        sanitizer: Arc<dyn Sanitizer>,
        logger: Arc<dyn StatusLogger>,
        max_body_size: usize,
    ) -> Self {
        Self {
            parser,
            sanitizer,
            logger,
            max_body_size,
        }
    }

    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let addresses =
            match extract::get_address_list(req, self.sanitizer.as_ref(), self.max_body_size).await {
                Ok(addresses) => addresses,
                Err(e) => return write_error(&e),
            };

        let t1 = Instant::now();

        let parser = Arc::clone(&self.parser);
        let input = addresses.clone();
        let rsp = match tokio::task::spawn_blocking(move || parse_batch(parser.as_ref(), &input)).await
        {
            Ok(formatted) => write_response(&formatted),
            Err(e) => write_error(&HttpError::internal(e.to_string())),
        };

        self.logger
            .status(&format!("parse '{addresses:?}' {:?}", t1.elapsed()));
        rsp
    }
}

/// Parse and group every address in order
///
/// Empty entries are placeholders for addresses that failed extraction: they
/// are never handed to the engine and come back as `{}`.
pub fn parse_batch(parser: &dyn AddressParser, addresses: &[String]) -> Vec<FormattedResult> {
    let parsed_addresses: Vec<Vec<ParsedComponent>> = addresses
        .iter()
        .map(|a| {
            if a.is_empty() {
                Vec::new()
            } else {
                parser.parse_address(a)
            }
        })
        .collect();

    parsed_addresses
        .iter()
        .map(|p| {
            if p.is_empty() {
                FormattedResult::new()
            } else {
                format_parsed(p)
            }
        })
        .collect()
}
