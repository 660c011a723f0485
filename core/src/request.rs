//! Builders seeded from existing requests.
//!
//! Two request shapes are supported: `http::Request<B>` as seen by axum,
//! hyper and friends on the server side, and the plain-data [`HttpRequest`]
//! used by transports. Both map method, URL, every header value and the
//! body onto a [`CurlBuilder`].

use http::header::HOST;
use http::Request;

use crate::builder::CurlBuilder;
use crate::http::HttpRequest;

impl CurlBuilder {
    /// Build a command for `request`.
    pub fn from_request<B: AsRef<[u8]>>(request: &Request<B>) -> Self {
        let mut builder = Self::new();
        builder.set_request(request);
        builder
    }

    /// Copy method, URL, headers and body from `request` into this builder.
    /// Secrets already marked are kept.
    ///
    /// A multi-valued header contributes one pair per value. Header names
    /// come out lower-case since `http::HeaderMap` stores them that way.
    pub fn set_request<B: AsRef<[u8]>>(&mut self, request: &Request<B>) -> &mut Self {
        let headers = request.headers().iter().map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        });
        let body: &[u8] = request.body().as_ref();
        self.set_method(request.method().as_str())
            .set_url(absolute_url(request))
            .set_header_pairs(headers)
            .set_body(body)
    }

    /// Build a command for a plain-data request.
    pub fn from_http_request(request: &HttpRequest) -> Self {
        let mut builder = Self::new();
        builder
            .set_method(request.method.as_str())
            .set_url(request.url.as_str())
            .set_header_pairs(request.headers.iter().cloned());
        if let Some(body) = &request.body {
            builder.set_body(body.as_slice());
        }
        builder
    }
}

/// The request URI as an absolute URL.
///
/// Server-side requests usually carry only a path; when a `Host` header is
/// present the URL is rebuilt as `http://<host><path>`.
fn absolute_url<B>(request: &Request<B>) -> String {
    let uri = request.uri();
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok());
    match (host, uri.path_and_query()) {
        (Some(host), Some(path)) => format!("http://{host}{path}"),
        (Some(host), None) => format!("http://{host}/"),
        (None, _) => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn get_request_with_header() {
        let request = Request::builder()
            .method("GET")
            .uri("http://test.com")
            .header("Content-Type", "text/html")
            .body(Vec::new())
            .unwrap();
        assert_eq!(
            CurlBuilder::from_request(&request).render(),
            "curl -X GET -H 'content-type: text/html' 'http://test.com/'"
        );
    }

    #[test]
    fn post_request_with_json_bytes() {
        let request = Request::builder()
            .method("POST")
            .uri("http://test.com/items")
            .body(r#"{"bar":"foo","name":"test","slice":[1,2,3]}"#)
            .unwrap();
        assert_eq!(
            CurlBuilder::from_request(&request).render(),
            r#"curl -X POST -d '{"bar":"foo","name":"test","slice":[1,2,3]}' 'http://test.com/items'"#
        );
    }

    #[test]
    fn origin_form_uri_uses_host_header() {
        let request = Request::builder()
            .uri("/search?q=1")
            .header(HOST, "example.org:8080")
            .body("")
            .unwrap();
        assert_eq!(
            CurlBuilder::from_request(&request).render(),
            "curl -X GET -H 'host: example.org:8080' 'http://example.org:8080/search?q=1'"
        );
    }

    #[test]
    fn origin_form_uri_without_host() {
        let request = Request::builder().uri("/only/path").body("").unwrap();
        assert_eq!(
            CurlBuilder::from_request(&request).render(),
            "curl -X GET '/only/path'"
        );
    }

    #[test]
    fn multi_valued_headers_keep_every_value() {
        let request = Request::builder()
            .uri("https://test.com/")
            .header("accept", "text/html")
            .header("accept", "application/json")
            .body("")
            .unwrap();
        assert_eq!(
            CurlBuilder::from_request(&request).render(),
            "curl -k -X GET -H 'accept: text/html application/json' 'https://test.com/'"
        );
    }

    #[test]
    fn secrets_survive_set_request() {
        let request = Request::builder()
            .uri("http://test.com/")
            .header("authorization", "Bearer abc")
            .body("")
            .unwrap();
        let mut builder = CurlBuilder::new();
        builder.set_secret(["authorization"]).set_request(&request);
        assert_eq!(
            builder.render(),
            "curl -X GET -H 'authorization: **********' 'http://test.com/'"
        );
    }

    #[test]
    fn secret_names_ignore_header_case() {
        let request = Request::builder()
            .uri("http://test.com/")
            .header("Authorization", "Bearer abc")
            .body("")
            .unwrap();
        let mut builder = CurlBuilder::new();
        builder.set_secret(["Authorization"]).set_request(&request);
        assert_eq!(
            builder.render(),
            "curl -X GET -H 'authorization: **********' 'http://test.com/'"
        );
    }

    #[test]
    fn plain_request_maps_every_field() {
        let request = HttpRequest::new("DELETE", "https://api.test/v1/items/7")
            .with_header("X-Request-Id", "42")
            .with_body("gone");
        assert_eq!(
            CurlBuilder::from_http_request(&request).render(),
            "curl -k -X DELETE -d 'gone' -H 'X-Request-Id: 42' 'https://api.test/v1/items/7'"
        );
    }
}
