//! Auth interceptor as a `tower` layer
//!
//! Wraps any HTTP service: adds the bearer header on the way out and turns
//! 401/403 responses into a uniform `SessionExpired` error on the way back.
//! Built without a context it forwards requests untouched.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::{Request, Response};
use tower::{BoxError, Layer, Service};

use crate::context::SessionContext;

/// Layer producing [`AuthService`]
#[derive(Clone, Debug)]
pub struct AuthLayer {
    context: Option<SessionContext>,
}

impl AuthLayer {
    pub fn new(context: SessionContext) -> Self {
        Self {
            context: Some(context),
        }
    }

    /// No-op variant for callers that cannot supply collaborators
    pub fn passthrough() -> Self {
        Self { context: None }
    }

    pub fn from_context(context: Option<SessionContext>) -> Self {
        match context {
            Some(context) => Self::new(context),
            None => {
                tracing::debug!("No session context available, auth interceptor disabled");
                Self::passthrough()
            }
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.context.is_none()
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            context: self.context.clone(),
        }
    }
}

/// Service applying the auth interceptor rules
#[derive(Clone, Debug)]
pub struct AuthService<S> {
    inner: S,
    context: Option<SessionContext>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let Some(context) = self.context.clone() else {
            let future = self.inner.call(request);
            return Box::pin(async move { future.await.map_err(Into::into) });
        };

        context.authorize(request.headers_mut());
        let future = self.inner.call(request);

        Box::pin(async move {
            let response = future.await.map_err(Into::into)?;
            context.check_status(response.status())?;
            Ok(response)
        })
    }
}
