//! Load shedding middleware.

use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use throttle_core::ports::LoadShedder;

use crate::middleware::error::AppError;
use crate::observability::RequestId;

/// Rejects every request with 503 while the shedder reports overload.
pub struct LoadShedMiddleware {
    shedder: Arc<dyn LoadShedder>,
}

impl LoadShedMiddleware {
    pub fn new(shedder: Arc<dyn LoadShedder>) -> Self {
        Self { shedder }
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoadShedMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = LoadShedMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoadShedMiddlewareService {
            service,
            shedder: self.shedder.clone(),
        }))
    }
}

pub struct LoadShedMiddlewareService<S> {
    service: S,
    shedder: Arc<dyn LoadShedder>,
}

impl<S, B> Service<ServiceRequest> for LoadShedMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !self.shedder.is_overloaded() {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            });
        }

        tracing::debug!(path = %req.path(), "Shedding request");

        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.as_str().to_owned());
        let response = AppError::ServiceUnavailable.to_response(request_id.as_deref());

        let (http_req, _payload) = req.into_parts();
        let srv_response = ServiceResponse::new(http_req, response);

        Box::pin(async move { Ok(srv_response.map_into_right_body()) })
    }
}
