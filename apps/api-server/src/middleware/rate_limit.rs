//! Rate limiting middleware.

use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use throttle_core::RateLimiterConfig;
use throttle_core::ports::RateLimiter;

use crate::middleware::error::AppError;
use crate::observability::RequestId;

/// Header carrying an explicit client identifier.
pub static CLIENT_ID_HEADER: &str = "X-Client-Id";

/// Resolve the key a request is rate limited under.
///
/// An explicit `X-Client-Id` header wins, then the real remote address.
/// The header is taken as-is, so it must be set by a trusted proxy that
/// strips any client-supplied value; otherwise a client can pick a fresh
/// key per request and never be limited.
pub fn client_key(req: &ServiceRequest) -> String {
    if let Some(id) = req
        .headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return id.to_string();
    }

    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    max_tokens: u32,
    retry_after_secs: u64,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>, config: &RateLimiterConfig) -> Self {
        // A denied client is guaranteed a fresh token after one refill interval.
        let refill = config.refill_interval();
        let retry_after_secs = refill.as_secs() + u64::from(refill.subsec_nanos() > 0);

        Self {
            limiter,
            max_tokens: config.max_tokens(),
            retry_after_secs,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service,
            limiter: self.limiter.clone(),
            max_tokens: self.max_tokens,
            retry_after_secs: self.retry_after_secs,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: S,
    limiter: Arc<dyn RateLimiter>,
    max_tokens: u32,
    retry_after_secs: u64,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = client_key(&req);

        if !self.limiter.is_limit_reached(&key) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            });
        }

        // Rate limited - return 429 immediately
        tracing::warn!(client = %key, "Rate limit exceeded");

        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.as_str().to_owned());
        let mut response = AppError::TooManyRequests {
            retry_after_secs: self.retry_after_secs,
        }
        .to_response(request_id.as_deref());
        response.headers_mut().insert(
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderValue::from(self.max_tokens),
        );

        let (http_req, _payload) = req.into_parts();
        let srv_response = ServiceResponse::new(http_req, response);

        Box::pin(async move { Ok(srv_response.map_into_right_body()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};
    use std::time::Duration;
    use throttle_infra::TokenBucketLimiter;

    fn request(client: &str) -> test::TestRequest {
        test::TestRequest::get()
            .uri("/")
            .insert_header((CLIENT_ID_HEADER, client.to_string()))
    }

    #[actix_web::test]
    async fn test_denies_after_capacity_per_client() {
        let config = RateLimiterConfig::new(2, Duration::from_millis(1500)).unwrap();
        let limiter: Arc<dyn RateLimiter> = Arc::new(TokenBucketLimiter::new(config.clone()));
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter, &config))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        for _ in 0..2 {
            let resp = test::call_service(&app, request("client-a").to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let resp = test::call_service(&app, request("client-a").to_request()).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get("Retry-After").unwrap(), "2");
        assert_eq!(resp.headers().get("X-RateLimit-Limit").unwrap(), "2");

        let resp = test::call_service(&app, request("client-b").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_client_key_prefers_header_over_peer() {
        let peer = "10.0.0.1:4321".parse().unwrap();

        let req = request("user-42").peer_addr(peer).to_srv_request();
        assert_eq!(client_key(&req), "user-42");

        let req = request("").peer_addr(peer).to_srv_request();
        assert!(client_key(&req).starts_with("10.0.0.1"));
    }
}
