//! HTTP handlers and route configuration.

mod health;

pub use health::not_found;

use actix_web::web;

use crate::middleware::{LoadShedMiddleware, RateLimitMiddleware};
use crate::state::AppState;

/// Configure all application routes.
///
/// `/api` stays reachable under overload; `/` sits behind the shedder and
/// then the rate limiter.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/status", web::get().to(health::throttle_status)),
    )
    .service(
        web::resource("/")
            .route(web::get().to(health::index))
            .wrap(RateLimitMiddleware::new(
                state.rate_limiter.clone(),
                &state.rate_limit,
            ))
            .wrap(LoadShedMiddleware::new(state.load_shedder.clone())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use throttle_core::RateLimiterConfig;
    use throttle_core::ports::LoadShedder;
    use throttle_infra::TokenBucketLimiter;

    struct Switch(AtomicBool);

    impl LoadShedder for Switch {
        fn is_overloaded(&self) -> bool {
            self.0.load(Ordering::Relaxed)
        }
    }

    fn state(switch: Arc<Switch>) -> AppState {
        let config = RateLimiterConfig::new(1, Duration::from_secs(60)).unwrap();
        AppState::new(
            Arc::new(TokenBucketLimiter::new(config.clone())),
            switch,
            config,
        )
    }

    fn get(uri: &str) -> actix_web::test::TestRequest {
        test::TestRequest::get()
            .uri(uri)
            .insert_header(("X-Client-Id", "client-a"))
    }

    #[actix_web::test]
    async fn test_root_is_limited_but_api_is_not() {
        let state = state(Arc::new(Switch(AtomicBool::new(false))));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let resp = test::call_service(&app, get("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = test::call_service(&app, get("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let resp = test::call_service(&app, get("/api/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value =
            test::call_and_read_body_json(&app, get("/api/status").to_request()).await;
        assert_eq!(body["data"]["tracked_clients"], 1);
        assert_eq!(body["data"]["overloaded"], false);
        assert_eq!(body["data"]["max_tokens"], 1);
        assert_eq!(body["data"]["refill_interval_ms"], 60_000);
    }

    #[actix_web::test]
    async fn test_overload_is_checked_before_spending_tokens() {
        let switch = Arc::new(Switch(AtomicBool::new(true)));
        let state = state(switch.clone());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state)),
        )
        .await;

        let resp = test::call_service(&app, get("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        switch.0.store(false, Ordering::Relaxed);
        let resp = test::call_service(&app, get("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_unknown_route_is_problem_json() {
        let state = state(Arc::new(Switch(AtomicBool::new(false))));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(|cfg| configure_routes(cfg, &state))
                .default_service(web::to(not_found)),
        )
        .await;

        let resp = test::call_service(&app, get("/missing").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["title"], "Not Found");
        assert_eq!(body["detail"], "No route for /missing");
    }
}
