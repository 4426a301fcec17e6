//! Request facade with transparent access-token refresh.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::timeout;

use estate_core::auth::RefreshResponse;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::request::{ApiRequest, ApiResponse, Attempt};
use crate::session::SessionManager;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    refresh_timeout: Duration,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig, session: Arc<SessionManager>) -> Result<Self> {
        cfg.validate()?;
        // the refresh-token cookie must ride along with every call
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(cfg.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: cfg.base_url()?,
            refresh_timeout: cfg.refresh_timeout(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Resolve `path` against the base URL. Absolute URLs are rejected.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        if path.contains("://") || path.starts_with("//") {
            return Err(ClientError::InvalidPath(path.to_string()));
        }
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ClientError::InvalidPath(format!("{path}: {e}")))
    }

    /// Send `req`. An expired access token is refreshed once and the request
    /// replayed; every other failure is returned unchanged.
    pub async fn request(&self, req: ApiRequest) -> Result<ApiResponse> {
        let mut attempt = Attempt::First;
        loop {
            let err = match self.send_once(&req, attempt).await {
                Err(err) if err.is_access_token_expired() => err,
                other => return other,
            };

            let Some(next) = attempt.next() else {
                tracing::debug!(
                    method = %req.method,
                    path = %req.path,
                    "replay rejected again; not refreshing twice"
                );
                return Err(err);
            };

            if let Err(refresh_err) = self.refresh().await {
                tracing::warn!(error = %refresh_err, "token refresh failed; terminating session");
                self.session.terminate().await;
                return Err(err);
            }
            attempt = next;
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(ApiRequest::get(path)).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path).await?.json()
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse> {
        self.request(ApiRequest::post(path).json(body)?).await
    }

    pub async fn patch_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse> {
        self.request(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request(ApiRequest::delete(path)).await
    }

    async fn send_once(&self, req: &ApiRequest, attempt: Attempt) -> Result<ApiResponse> {
        let url = self.url_for(&req.path)?;
        tracing::debug!(method = %req.method, %url, attempt = attempt.as_str(), "sending request");
        self.dispatch(req.method.clone(), url, req.headers.clone(), req.body.clone())
            .await?
            .error_for_status()
    }

    /// Mint a new access token for the stored actor kind. Runs outside the
    /// retry path, so a rejected refresh never triggers another refresh.
    async fn refresh(&self) -> Result<()> {
        let actor = self.session.actor().await.ok_or(ClientError::NoSession)?;
        let url = self.url_for(&actor.refresh_path())?;
        tracing::info!(actor = %actor, "access token expired; refreshing");

        let resp = timeout(
            self.refresh_timeout,
            self.dispatch(Method::GET, url, HeaderMap::new(), None),
        )
        .await
        .map_err(|_| ClientError::Timeout)??
        .error_for_status()?;

        let RefreshResponse { access_token } = resp.json()?;
        self.session.set_access_token(access_token).await?;
        tracing::info!(actor = %actor, "access token refreshed");
        Ok(())
    }

    async fn dispatch(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<ApiResponse> {
        let mut builder = self.http.request(method, url).headers(headers);
        if let Some(token) = self.session.access_token().await {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        Ok(ApiResponse { status, headers, body })
    }
}
