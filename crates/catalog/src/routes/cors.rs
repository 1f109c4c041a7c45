//! CORS policy for the catalog API.
//!
//! Configured origins get credentialed CORS with any method and header
//! mirrored back. A lone `*` allows any origin without credentials, since
//! browsers reject a wildcard origin on credentialed responses.

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tracing::warn;

use crate::config::Config;

/// Build the CORS layer for `config.cors_allowed_origins`.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allows_any() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    fn config(origins: &[&str]) -> Config {
        Config {
            port: 8000,
            database_url: "postgres://localhost/washu".to_string(),
            database_max_connections: 10,
            database_acquire_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(10),
            cors_allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
        }
    }

    fn app(config: &Config) -> Router {
        Router::new()
            .route("/health", get(|| async { "ok" }))
            .layer(cors_layer(config))
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/health")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-requested-with")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn configured_origin_gets_credentialed_preflight() {
        let app = app(&config(&["http://localhost:3000"]));

        let response = app.oneshot(preflight("http://localhost:3000")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "DELETE");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "x-requested-with");
    }

    #[tokio::test]
    async fn unlisted_origin_is_not_echoed() {
        let app = app(&config(&["http://localhost:3000"]));

        let response = app.oneshot(preflight("https://evil.example")).await.unwrap();
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn wildcard_allows_any_origin_without_credentials() {
        let app = app(&config(&["*"]));

        let response = app.oneshot(preflight("https://any.example")).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }
}
