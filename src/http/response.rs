//! HTTP response building module
//!
//! JSON success payloads and plain-text errors. Serialization happens before
//! any header is set, so a failed encode never leaves a half-built response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, SERVER, X_CONTENT_TYPE_OPTIONS,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::error::HttpError;

/// Serialize `payload` as JSON and wrap it in a 200 response with open CORS.
///
/// A serialization failure is turned into a plain-text 500.
pub fn write_response<T: Serialize + ?Sized>(payload: &T) -> Response<Full<Bytes>> {
    let encoded = match serde_json::to_vec(payload) {
        Ok(bytes) => bytes,
        Err(e) => return write_error(&HttpError::internal(e.to_string())),
    };

    Response::builder()
        .header(CONTENT_TYPE, "application/json")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Full::new(Bytes::from(encoded)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Write an error as plain text with its own status code
pub fn write_error(err: &HttpError) -> Response<Full<Bytes>> {
    let body = format!("{}\n", err.message);
    Response::builder()
        .status(err.status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| {
            let mut resp = Response::new(Full::new(Bytes::new()));
            *resp.status_mut() = err.status;
            resp
        })
}

/// Build health check response
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain")
        .header("Cache-Control", "no-cache, no-store")
        .body(Full::new(Bytes::from(status.to_string())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from(status.to_string()))))
}

/// Stamp the `Server` header on an outgoing response
pub fn with_server_name(mut resp: Response<Full<Bytes>>, server_name: &str) -> Response<Full<Bytes>> {
    if server_name.is_empty() {
        return resp;
    }
    if let Ok(value) = HeaderValue::from_str(server_name) {
        resp.headers_mut().insert(SERVER, value);
    }
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde::ser::Error as _;
    use serde::Serializer;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot encode this payload"))
        }
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_write_response_sets_json_and_cors() {
        let resp = write_response(&vec!["a", "b"]);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(body_string(resp).await, r#"["a","b"]"#);
    }

    #[tokio::test]
    async fn test_serialization_failure_is_plain_500() {
        let resp = write_response(&Unserializable);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(resp.headers()[CONTENT_TYPE], "application/json");
        assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(body_string(resp).await, "cannot encode this payload\n");
    }

    #[tokio::test]
    async fn test_write_error_uses_status_and_message() {
        let resp = write_error(&HttpError::bad_request("E_INVALID_QUERY"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(body_string(resp).await, "E_INVALID_QUERY\n");
    }

    #[test]
    fn test_with_server_name() {
        let resp = with_server_name(build_health_response("ok"), "postal-httpd");
        assert_eq!(resp.headers()[SERVER], "postal-httpd");

        let resp = with_server_name(build_health_response("ok"), "");
        assert!(resp.headers().get(SERVER).is_none());
    }
}
