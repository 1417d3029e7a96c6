use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{multipart::Form, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::client::error::{ApiError, ApiResult};
use crate::config::VaultConfig;
use crate::session::SessionHandle;

/// Shared HTTP layer for every Recipe Vault service.
///
/// Applies the base URL and timeout, attaches `Authorization: Bearer <token>` while the
/// session holds a credential, and normalizes every failure into [`ApiError`]. A 401 on
/// any request expires the session.
#[derive(Clone)]
pub struct RecipeVaultClient {
    base_url: String,
    client: Client,
    session: SessionHandle,
    upload_timeout: Duration,
}

impl RecipeVaultClient {
    pub fn new(config: &VaultConfig, session: SessionHandle) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("recipe-vault-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
            session,
            upload_timeout: config.upload_timeout,
        })
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let builder = self.client.request(method, url);

        match self.session.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        method: &Method,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> ApiResult<Response> {
        tracing::debug!("Making {} request to {}", method, endpoint);

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Network error during {} {}: {}", method, endpoint, e);
            ApiError::network(&e)
        })?;

        let status = response.status();
        tracing::debug!("{} {} response status: {}", method, endpoint, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_response(status, &body);

        if error.is_unauthorized() {
            self.session.expire();
        }

        if error.is_not_found() {
            tracing::debug!("{} {} not found", method, endpoint);
        } else {
            tracing::error!(
                "{} {} failed with status {}: {}",
                method,
                endpoint,
                status,
                error.message
            );
        }
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse response body: {}", e);
            ApiError::invalid_body(status, e)
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let builder = self.request(Method::GET, endpoint);
        let response = self.send(&Method::GET, endpoint, builder).await?;
        Self::decode(response).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, endpoint).json(body);
        let response = self.send(&Method::POST, endpoint, builder).await?;
        Self::decode(response).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, endpoint).json(body);
        let response = self.send(&Method::PUT, endpoint, builder).await?;
        Self::decode(response).await
    }

    /// DELETE, ignoring whatever body the server returns.
    pub async fn delete(&self, endpoint: &str) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, endpoint);
        self.send(&Method::DELETE, endpoint, builder).await?;
        Ok(())
    }

    /// Multipart POST with the longer upload timeout.
    pub async fn upload<T: DeserializeOwned>(&self, endpoint: &str, form: Form) -> ApiResult<T> {
        let builder = self
            .request(Method::POST, endpoint)
            .multipart(form)
            .timeout(self.upload_timeout);
        let response = self.send(&Method::POST, endpoint, builder).await?;
        Self::decode(response).await
    }
}
