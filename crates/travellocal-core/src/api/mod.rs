//! Remote resource client for the Travellocal backend.
//!
//! Builds URLs from the compiled base, attaches the bearer token read from
//! the session on every call, and turns non-2xx responses into
//! user-presentable errors.

pub mod envelope;
pub mod query;

#[cfg(test)]
pub(crate) mod loopback;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::{CredentialStore, Session};

pub use envelope::{ensure_status, unwrap_detail, unwrap_list};
pub use query::{QueryParams, QueryValue};

/// How a request uses the stored access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Never send a token.
    Anonymous,
    /// Send the token when one is stored.
    Optional,
    /// Refuse to send the request without a token.
    Required,
}

#[derive(Clone)]
pub struct ApiClient<S: CredentialStore> {
    config: ClientConfig,
    client: reqwest::Client,
    session: Session<S>,
}

impl<S: CredentialStore> std::fmt::Debug for ApiClient<S> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.config.base_url())
            .finish_non_exhaustive()
    }
}

impl<S: CredentialStore> ApiClient<S> {
    pub fn new(config: ClientConfig, session: Session<S>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            client,
            session,
        })
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub const fn session(&self) -> &Session<S> {
        &self.session
    }

    pub async fn get(&self, path: &str, params: &QueryParams, auth: Auth) -> Result<Value> {
        self.send(Method::GET, path, params, None, auth, None).await
    }

    /// `GET <base>/api/<resource>/<id>` bounded by the detail timeout.
    pub async fn get_detail(&self, resource: &str, id: i64, auth: Auth) -> Result<Value> {
        let path = format!("/api/{}/{id}", resource.trim_matches('/'));
        let timeout = self.config.detail_timeout;
        self.send(
            Method::GET,
            &path,
            &QueryParams::new(),
            None,
            auth,
            Some(timeout),
        )
        .await
    }

    pub async fn post(&self, path: &str, body: &Value, auth: Auth) -> Result<Value> {
        self.send(Method::POST, path, &QueryParams::new(), Some(body), auth, None)
            .await
    }

    pub async fn delete(&self, path: &str, params: &QueryParams, auth: Auth) -> Result<Value> {
        self.send(Method::DELETE, path, params, None, auth, None)
            .await
    }

    fn bearer_token(&self, auth: Auth) -> Result<Option<String>> {
        match auth {
            Auth::Anonymous => Ok(None),
            Auth::Optional => self.session.access_token(),
            Auth::Required => self
                .session
                .access_token()?
                .map(Some)
                .ok_or(Error::AuthRequired),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &QueryParams,
        body: Option<&Value>,
        auth: Auth,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let token = self.bearer_token(auth)?;
        let url = params.append_to(&self.config.endpoint(path));
        tracing::debug!(%method, %url, authenticated = token.is_some(), "sending request");

        let mut request = self
            .client
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let effective_timeout = timeout.unwrap_or(self.config.request_timeout);
        execute(request, effective_timeout).await
    }
}

async fn execute(request: RequestBuilder, timeout: Duration) -> Result<Value> {
    let response = request
        .send()
        .await
        .map_err(|error| map_transport_error(error, timeout))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|error| map_transport_error(error, timeout))?;

    if status == StatusCode::UNAUTHORIZED {
        tracing::debug!("server refused the access token");
        return Err(Error::AuthRequired);
    }
    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: envelope::parse_api_error(status, &body),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

fn map_transport_error(error: reqwest::Error, timeout: Duration) -> Error {
    if error.is_timeout() {
        Error::Timeout(timeout)
    } else {
        Error::Network(error)
    }
}
