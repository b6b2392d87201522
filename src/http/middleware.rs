/// Request tracing middleware
///
/// Assigns each request an id (reusing the configured header when the
/// client sent one) and logs method, path, status and duration on
/// completion. The id is echoed back in the response headers.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    time::Instant,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct RequestTrace {
    header_name: String,
}

impl RequestTrace {
    pub fn new(header_name: String) -> Self {
        Self { header_name }
    }
}

#[derive(Clone)]
pub struct RequestIdValue(pub String);

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware {
            service: Rc::new(service),
            header_name: self.header_name.clone(),
        }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: Rc<S>,
    header_name: String,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();

        let request_id = req
            .headers()
            .get(&self.header_name)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        req.extensions_mut().insert(RequestIdValue(request_id.clone()));

        let service = self.service.clone();
        let header_name = self.header_name.clone();

        Box::pin(async move {
            let mut res = service.call(req).await?;

            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(header_name.as_bytes()),
                HeaderValue::from_str(&request_id),
            ) {
                res.headers_mut().insert(name, value);
            }

            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %res.status().as_u16(),
                duration_ms = %started.elapsed().as_millis(),
                "HTTP request"
            );

            Ok(res)
        })
    }
}
