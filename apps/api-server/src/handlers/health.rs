//! Health and status endpoints.

use actix_web::{HttpRequest, HttpResponse, web};
use throttle_shared::ApiResponse;
use throttle_shared::dto::{HealthResponse, ThrottleStatus};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    };

    HttpResponse::Ok().json(response)
}

/// Overload-prevention status.
///
/// GET /api/status
pub async fn throttle_status(state: web::Data<AppState>) -> HttpResponse {
    let status = ThrottleStatus {
        overloaded: state.load_shedder.is_overloaded(),
        tracked_clients: state.rate_limiter.tracked_keys(),
        max_tokens: state.rate_limit.max_tokens(),
        refill_interval_ms: state.rate_limit.refill_interval().as_millis() as u64,
    };

    HttpResponse::Ok().json(ApiResponse::ok(status))
}

/// Guarded root endpoint.
///
/// GET /
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// Fallback for unknown routes.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!("No route for {}", req.path())))
}
