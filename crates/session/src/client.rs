//! Marketplace API client
//!
//! Every request goes through the same interceptor rules as [`AuthLayer`]:
//! bearer header out, `SessionExpired` back on 401/403.
//!
//! [`AuthLayer`]: crate::interceptor::AuthLayer

use reqwest::{Method, Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::error::SessionError;

/// HTTP client for the marketplace API
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    context: Option<SessionContext>,
}

impl ApiClient {
    pub fn new(config: &SessionConfig, context: SessionContext) -> Self {
        Self::with_client(reqwest::Client::new(), config, Some(context))
    }

    /// Client without session handling
    pub fn passthrough(config: &SessionConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config, None)
    }

    pub fn with_client(
        http: reqwest::Client,
        config: &SessionConfig,
        context: Option<SessionContext>,
    ) -> Self {
        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            context,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request to an API path
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Send a request through the interceptor.
    ///
    /// Non-auth error statuses come back as responses, untouched.
    pub async fn send(&self, mut request: Request) -> Result<Response, SessionError> {
        if let Some(context) = &self.context {
            context.authorize(request.headers_mut());
        }

        let method = request.method().clone();
        let url = request.url().clone();
        let response = self.http.execute(request).await.map_err(|e| {
            tracing::debug!(error = %e, %method, %url, "API request failed");
            SessionError::Http(e)
        })?;

        if let Some(context) = &self.context {
            context.check_status(response.status())?;
        }

        tracing::debug!(%method, %url, status = response.status().as_u16(), "API request completed");
        Ok(response)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        let request = self.request(Method::GET, path).build()?;
        self.read_json(self.send(request).await?).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, SessionError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body).build()?;
        self.read_json(self.send(request).await?).await
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, SessionError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(SessionError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}
