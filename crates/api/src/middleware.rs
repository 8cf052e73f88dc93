//! Response hardening: security headers, HTTPS redirects, CORS and JSON error bodies.

use crate::handlers::error_response;
use account_models::{AccountError, SecurityConfig};
use axum::{
    body::Body,
    http::{
        header::{
            HeaderValue, ALLOW, CONTENT_SECURITY_POLICY, CONTENT_TYPE, HOST, LOCATION,
            REFERRER_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
            X_XSS_PROTECTION,
        },
        HeaderMap, Request, StatusCode,
    },
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const HSTS: &str = "max-age=31536000; includeSubDomains";

#[derive(Debug)]
struct SecurityPolicy {
    force_https: bool,
    content_security_policy: HeaderValue,
}

/// Tower layer that adds browser security headers to every response and,
/// when `force_https` is set, redirects plain-HTTP requests.
#[derive(Clone, Debug)]
pub struct SecurityHeadersLayer {
    policy: Arc<SecurityPolicy>,
}

impl SecurityHeadersLayer {
    pub fn new(config: &SecurityConfig) -> Result<Self, AccountError> {
        let content_security_policy = HeaderValue::from_str(&config.content_security_policy)
            .map_err(|e| AccountError::ConfigError {
                reason: format!("invalid content_security_policy: {e}"),
            })?;
        Ok(Self {
            policy: Arc::new(SecurityPolicy {
                force_https: config.force_https,
                content_security_policy,
            }),
        })
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeaders {
            inner,
            policy: self.policy.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SecurityHeaders<S> {
    inner: S,
    policy: Arc<SecurityPolicy>,
}

impl<S> Service<Request<Body>> for SecurityHeaders<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let policy = self.policy.clone();
        let https = is_https(&req);

        if policy.force_https && !https {
            let mut response = redirect_to_https(&req);
            apply_security_headers(response.headers_mut(), &policy, false);
            return Box::pin(async move { Ok::<_, S::Error>(response) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move {
            let mut response = inner.call(req).await?;
            apply_security_headers(response.headers_mut(), &policy, https);
            Ok(response)
        })
    }
}

fn apply_security_headers(headers: &mut HeaderMap, policy: &SecurityPolicy, https: bool) {
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        CONTENT_SECURITY_POLICY,
        policy.content_security_policy.clone(),
    );
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    // Browsers ignore HSTS over plain HTTP
    if https {
        headers.insert(STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
    }
}

/// The scheme the client used, as reported by a TLS-terminating proxy.
fn is_https<B>(req: &Request<B>) -> bool {
    if let Some(proto) = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
    {
        return proto
            .split(',')
            .next()
            .map(|p| p.trim().eq_ignore_ascii_case("https"))
            .unwrap_or(false);
    }
    req.uri().scheme_str() == Some("https")
}

fn redirect_to_https<B>(req: &Request<B>) -> Response {
    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()));
    let path = req
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/");

    let location = host.and_then(|host| HeaderValue::from_str(&format!("https://{host}{path}")).ok());
    match location {
        Some(location) => {
            let mut response = StatusCode::FOUND.into_response();
            response.headers_mut().insert(LOCATION, location);
            response
        }
        None => error_response(&AccountError::DataValidation {
            reason: "A valid Host header is required for HTTPS redirects".to_string(),
        })
        .into_response(),
    }
}

/// Builds the CORS layer; `"*"` anywhere in the list allows every origin.
pub fn cors_layer(config: &SecurityConfig) -> Result<CorsLayer, AccountError> {
    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors_allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|e| AccountError::ConfigError {
                reason: format!("invalid CORS origin {o}: {e}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Gives the bodiless 405 and 413 responses produced by axum itself the
/// same JSON error shape as handler errors.
pub async fn json_error_bodies(response: Response) -> Response {
    let already_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    if already_json {
        return response;
    }

    let error = match response.status() {
        StatusCode::METHOD_NOT_ALLOWED => AccountError::MethodNotAllowed,
        StatusCode::PAYLOAD_TOO_LARGE => AccountError::PayloadTooLarge,
        _ => return response,
    };

    let allow = response.headers().get(ALLOW).cloned();
    let mut json = error_response(&error).into_response();
    if let Some(allow) = allow {
        json.headers_mut().insert(ALLOW, allow);
    }
    json
}
