//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body size check, path dispatch
//! and access logging.

use crate::config::AppState;
use crate::http::{self, HttpError};
use crate::logger::AccessLogEntry;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let entry = state.logger.access_log_enabled().then(|| {
        AccessLogEntry::from_request(
            remote_addr,
            req.method(),
            req.uri(),
            req.version(),
            req.headers(),
        )
    });

    let response = match check_body_size(&req, &state) {
        Some(err) => http::write_error(&err),
        None => route_request(req, &state).await,
    };
    let response = http::with_server_name(response, &state.config.http.server_name);

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time = started.elapsed();
        state.logger.access(&entry);
    }

    Ok(response)
}

/// Validate Content-Length header against the configured body limit
fn check_body_size<B>(req: &Request<B>, state: &AppState) -> Option<HttpError> {
    let max_body_size = state.config.http.max_body_size;
    let content_length = req.headers().get(hyper::header::CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            state
                .logger
                .warn("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                state.logger.warn(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(HttpError::payload_too_large())
            }
            Err(_) => {
                state.logger.warn(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Route request by exact path match
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let routes = &state.config.routes;
    let path = req.uri().path();

    if path == routes.parse_path {
        return state.parser.handle(req).await;
    }

    if path == routes.multi_parse_path {
        return state.multi_parser.handle(req).await;
    }

    if routes.health_enabled && path == routes.health_path {
        return match *req.method() {
            Method::GET | Method::HEAD => http::build_health_response("ok"),
            _ => http::write_error(&HttpError::method_not_allowed()),
        };
    }

    state.logger.debug(&format!("No route for {path}"));
    http::write_error(&HttpError::not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logger::{LogLevel, LogWriter, Logger};
    use crate::testing::FakeParser;
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_LENGTH, SERVER};
    use hyper::StatusCode;

    fn state() -> Arc<AppState> {
        let config = Config::defaults().unwrap();
        let logger = Arc::new(Logger::new(LogLevel::Error, LogWriter::console()));
        Arc::new(AppState::new(config, logger, Arc::new(FakeParser::chicago())))
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn send(req: Request<Full<Bytes>>) -> (StatusCode, String) {
        let resp = handle_request(req, state(), None).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_routes_single_parse() {
        let (status, body) = send(request(Method::GET, "/parse?address=Chicago&format=keys", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"city":["Chicago","Loop"],"street":["Main"]}"#);
    }

    #[tokio::test]
    async fn test_routes_multi_parse() {
        let (status, body) = send(request(
            Method::POST,
            "/parse/multi",
            r#"[{"address":"Chicago"},{"address":""}]"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"[{"city":["Chicago","Loop"],"street":["Main"]},{}]"#);
    }

    #[tokio::test]
    async fn test_method_checks_per_endpoint() {
        let (status, _) = send(request(Method::POST, "/parse?address=Chicago", "")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = send(request(Method::GET, "/parse/multi", "")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        // no CORS preflight handling: OPTIONS is just another wrong method
        let (status, _) = send(request(Method::OPTIONS, "/parse?address=Chicago", "")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_and_not_found() {
        let (status, body) = send(request(Method::GET, "/healthz", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");

        let (status, _) = send(request(Method::GET, "/nowhere", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_declared_body_too_large() {
        let mut req = request(Method::POST, "/parse/multi", "[]");
        req.headers_mut()
            .insert(CONTENT_LENGTH, "99999999".parse().unwrap());
        let (status, _) = send(req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_server_header() {
        let resp = handle_request(request(Method::GET, "/healthz", ""), state(), None)
            .await
            .unwrap();
        assert_eq!(resp.headers()[SERVER], "postal-httpd");
    }
}
