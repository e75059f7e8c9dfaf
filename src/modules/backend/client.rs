use reqwest::{multipart::Form, Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::config::BackendConfig;
use crate::core::error::{AppError, Result};
use crate::modules::backend::endpoints::BackendEndpoint;
use crate::modules::backend::error_detail::{flatten_error_detail, user_message};
use crate::shared::constants::SUBMIT_FAILED_MESSAGE;

/// Fallback shown when a non-submission request fails without detail
const REQUEST_FAILED_MESSAGE: &str = "The reporting service could not complete the request.";

/// HTTP client for the municipal reporting backend.
///
/// Bodies are passed through as opaque JSON; the backend owns the report model.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn request(
        &self,
        method: Method,
        endpoint: &BackendEndpoint,
        bearer: Option<&str>,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint.path());
        debug!("Backend request: {} {}", method, url);

        let builder = self.client.request(method, url);
        match bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Create a report from a multipart form. The whole form is one request;
    /// nothing is retried.
    pub async fn create_report(&self, form: Form, bearer: Option<&str>) -> Result<Value> {
        let builder = self
            .request(Method::POST, &BackendEndpoint::Reports, bearer)
            .multipart(form);
        let created = Self::execute(builder, SUBMIT_FAILED_MESSAGE)
            .await
            .map_err(Self::submission_error)?;
        info!("Report created on backend");
        Ok(created)
    }

    pub async fn get_json(
        &self,
        endpoint: &BackendEndpoint,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<Value> {
        let builder = self.request(Method::GET, endpoint, bearer).query(query);
        Self::execute(builder, REQUEST_FAILED_MESSAGE).await
    }

    pub async fn send_json(
        &self,
        method: Method,
        endpoint: &BackendEndpoint,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<Value> {
        let builder = self.request(method, endpoint, bearer).json(body);
        Self::execute(builder, REQUEST_FAILED_MESSAGE).await
    }

    pub async fn delete(&self, endpoint: &BackendEndpoint, bearer: Option<&str>) -> Result<Value> {
        let builder = self.request(Method::DELETE, endpoint, bearer);
        Self::execute(builder, REQUEST_FAILED_MESSAGE).await
    }

    /// A failed submission without field detail always shows the generic
    /// retry message, whatever top-level text the backend sent
    fn submission_error(e: AppError) -> AppError {
        match e {
            AppError::Upstream {
                status,
                errors,
                message,
            } if errors.is_empty() && message != SUBMIT_FAILED_MESSAGE => {
                debug!("Backend submission message replaced: {}", message);
                AppError::Upstream {
                    status,
                    message: SUBMIT_FAILED_MESSAGE.to_string(),
                    errors,
                }
            }
            other => other,
        }
    }

    /// The payload of a `{ success, data, ... }` envelope, or the body itself
    pub fn unwrap_data(body: Value) -> Value {
        match body {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        }
    }

    /// Send the request and map any failure to `AppError::Upstream`
    async fn execute(builder: RequestBuilder, fallback: &str) -> Result<Value> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("Backend request failed: {:?}", e);
            AppError::Upstream {
                status: None,
                message: fallback.to_string(),
                errors: Vec::new(),
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::error!("Failed to read backend response: {:?}", e);
            AppError::Upstream {
                status: Some(status.as_u16()),
                message: fallback.to_string(),
                errors: Vec::new(),
            }
        })?;

        // Empty or non-JSON bodies are tolerated; only the status decides success
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            return Ok(body);
        }

        let errors = flatten_error_detail(&body);
        let message = user_message(&body, &errors, fallback);
        Err(AppError::Upstream {
            status: Some(status.as_u16()),
            message,
            errors,
        })
    }
}
