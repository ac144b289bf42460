//! Payments API client
//!
//! [`ApiClient`] is the raw transport: a method, a path relative to the base
//! URL, query pairs and an optional JSON body in, a JSON value out. Typed
//! resource calls live on [`Api`], split by resource into the sub-modules.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::cli::payload::Payload;
use crate::configuration::ApiSettings;
use crate::error::AppError as Error;
use crate::model::{ListOptions, ListResult};

mod accounts;
mod beneficiaries;
mod billing;
mod cards;
mod reports;
mod transfers;
mod webhooks;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("code: {code}, message: {message}")]
pub struct ErrorJson {
    pub code: String,
    pub message: String,
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    fn base_url(&self) -> &str;

    /// Send one request. `path` is relative to the base URL.
    ///
    /// # Errors
    /// Transport errors, or the API's error body as [`Error::Api`].
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, Error>;

    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, Error> {
        self.send(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, Error> {
        self.send(Method::POST, path, &[], body).await
    }

    async fn delete(&self, path: &str) -> Result<Value, Error> {
        self.send(Method::DELETE, path, &[], None).await
    }
}

pub struct HttpClient {
    base_url: Url,
    client: reqwest::Client,
    api_key: Option<SecretString>,
}

impl HttpClient {
    /// # Errors
    /// Fails if the base URL does not parse or the HTTP client can't be built.
    pub fn new(settings: &ApiSettings) -> Result<Self, Error> {
        let mut base = settings.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| Error::Error(format!("api.base_url {base:?} is not a URL: {e}")))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("pay-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            client,
            api_key: settings.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Error(format!("invalid API path {path:?}: {e}")))
    }

    async fn handle_response(response: Response) -> Result<Value, Error> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            let de = &mut serde_json::Deserializer::from_slice(&bytes);
            return Ok(serde_path_to_error::deserialize(de)?);
        }

        let error = serde_json::from_slice::<ErrorJson>(&bytes).unwrap_or_else(|_| ErrorJson {
            code: status.as_u16().to_string(),
            message: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        });
        tracing::warn!(status = status.as_u16(), code = %error.code, "API returned an error");
        Err(error.into())
    }
}

#[async_trait]
impl ApiClient for HttpClient {
    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    #[tracing::instrument(name = "API request", skip(self, query, body), fields(request_id = tracing::field::Empty))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let api_key = self.api_key.as_ref().ok_or(Error::MissingApiKey)?;
        let url = self.url(path)?;

        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(api_key.expose_secret())
            .header("x-request-id", &request_id);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }
}

/// Typed calls against an [`ApiClient`]
#[derive(Clone, Copy)]
pub struct Api<'a> {
    client: &'a dyn ApiClient,
}

impl<'a> Api<'a> {
    #[must_use]
    pub fn new(client: &'a dyn ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &'a dyn ApiClient {
        self.client
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        options: ListOptions,
        filters: Vec<(String, String)>,
    ) -> Result<ListResult<T>, Error> {
        let mut query = options.query();
        query.extend(filters);
        decode(self.client.get(path, &query).await?)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        decode(self.client.get(path, &[]).await?)
    }

    async fn create<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: Option<&Payload>,
    ) -> Result<T, Error> {
        let body = payload.map(|p| Value::Object(p.clone()));
        decode(self.client.post(path, body.as_ref()).await?)
    }

    async fn remove(&self, path: &str) -> Result<Value, Error> {
        self.client.delete(path).await
    }
}

/// Decode a response body, naming the field that failed.
///
/// # Errors
/// [`Error::Decode`] with the path to the offending field.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    Ok(serde_path_to_error::deserialize(value)?)
}

// -- Tests ---------------------------------------------------------------------
