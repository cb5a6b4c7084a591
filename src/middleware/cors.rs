//! CORS gate applied in front of every route.
//!
//! - Origin exactly in the allow-list: echo it back together with the fixed
//!   method and header lists.
//! - `OPTIONS`: answer immediately with an empty body and whatever headers
//!   were computed, without reaching the router.
//! - Anything else passes through; unknown origins are not rejected, only
//!   left without CORS headers.
//!
//! The gate wraps the finished router rather than its routes, so a preflight
//! answer never passes through route machinery that would add `allow` or
//! `content-length` to it.

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, header},
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use std::{convert::Infallible, sync::Arc};
use tower::{Layer, Service};

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Origins permitted to receive CORS headers. Matching is exact and
/// case-sensitive.
#[derive(Clone, Debug)]
pub struct AllowList {
    origins: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.origins.iter().any(|allowed| allowed == origin)
    }
}

/// Headers to attach for a request carrying `origin`.
pub fn cors_headers(origin: Option<&HeaderValue>, allow_list: &AllowList) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let Some(origin) = origin else {
        return headers;
    };
    let Ok(value) = origin.to_str() else {
        return headers;
    };
    if allow_list.contains(value) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
    }
    headers
}

pub async fn cors_gate(
    State(allow_list): State<Arc<AllowList>>,
    request: Request,
    next: Next,
) -> Response {
    let headers = cors_headers(request.headers().get(header::ORIGIN), &allow_list);

    if request.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.headers_mut() = headers;
        return response;
    }

    let mut response = next.run(request).await;
    response.headers_mut().extend(headers);
    response
}

/// Put the gate in front of `router` as an outer service.
pub fn with_cors_gate(
    router: Router,
    allow_list: Arc<AllowList>,
) -> impl Service<Request, Response = Response, Error = Infallible, Future = impl Send>
+ Clone
+ Send
+ 'static {
    from_fn_with_state(allow_list, cors_gate).layer(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ALLOWED_ORIGINS;
    use axum::{body::to_bytes, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn app() -> impl Service<Request, Response = Response, Error = Infallible, Future = impl Send>
    {
        with_cors_gate(
            Router::new().route("/ping", get(|| async { "pong" })),
            Arc::new(AllowList::new(ALLOWED_ORIGINS)),
        )
    }

    fn request(method: Method, origin: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().method(method).uri("/ping");
        if let Some(origin) = origin {
            builder = builder.header(header::ORIGIN, origin);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_of(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn every_allowed_origin_gets_headers() {
        let list = AllowList::new(ALLOWED_ORIGINS);
        for origin in ALLOWED_ORIGINS {
            let headers = cors_headers(Some(&HeaderValue::from_static(origin)), &list);
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], origin);
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
        }
    }

    #[test]
    fn matching_is_exact() {
        let list = AllowList::new(ALLOWED_ORIGINS);
        for origin in [
            "HTTPS://HECTACONSULTING.COM",
            "https://hectaconsulting.com/",
            "https://blog.hectaconsulting.com",
            "http://localhost:3001",
            "null",
        ] {
            let headers = cors_headers(Some(&HeaderValue::from_static(origin)), &list);
            assert!(headers.is_empty(), "{origin} should not match");
        }
        assert!(cors_headers(None, &list).is_empty());
    }

    #[tokio::test]
    async fn allowed_origin_get_is_annotated_and_routed() {
        let response = app()
            .oneshot(request(Method::GET, Some("http://localhost:3000")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(body_of(response).await, b"pong");
    }

    #[tokio::test]
    async fn unknown_origin_get_still_proceeds() {
        let response = app()
            .oneshot(request(Method::GET, Some("https://evil.example")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
        assert_eq!(body_of(response).await, b"pong");
    }

    #[tokio::test]
    async fn missing_origin_leaves_response_untouched() {
        let response = app().oneshot(request(Method::GET, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .is_none()
        );
    }

    #[tokio::test]
    async fn preflight_from_allowed_origin_is_empty_with_headers() {
        let response = app()
            .oneshot(request(
                Method::OPTIONS,
                Some("https://www.hectaconsulting.com"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://www.hectaconsulting.com"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn preflight_from_unknown_origin_is_empty_without_headers() {
        let response = app()
            .oneshot(request(Method::OPTIONS, Some("https://evil.example")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().is_empty());
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn preflight_on_get_only_route_carries_only_cors_headers() {
        let response = app()
            .oneshot(request(Method::OPTIONS, Some("http://localhost:3000")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut names: Vec<_> = response.headers().keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            [
                "access-control-allow-headers",
                "access-control-allow-methods",
                "access-control-allow-origin",
            ]
        );
    }
}
