use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::collections::HashMap;

#[derive(Debug, Snafu)]
pub enum HttpError {
    /// The request never produced a response.
    #[snafu(display("HttpError: {message}"))]
    RequestError { message: String },

    /// The server answered with a non-success status.
    #[snafu(display("HttpError: request failed with status {status}: {message}"))]
    StatusError { status: u16, message: String },
}

impl HttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::StatusError { status, .. } => Some(*status),
            HttpError::RequestError { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub body: Vec<u8>,
    pub headers: HashMap<String, String>,
}

/// Implemented by every HTTP transport the node clients can run on.
/// The implementor owns the base URL and any default headers.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(
        &self,
        http_method: HttpMethod,
        path: String,
        query: Option<HashMap<String, String>>,
        body: Option<Vec<u8>>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError>;
}

#[cfg(feature = "default_client")]
pub struct DefaultHttpClient {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "default_client")]
impl DefaultHttpClient {
    pub fn new(base_url: &str) -> Self {
        DefaultHttpClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_header(
        base_url: &str,
        header_name: &str,
        header_value: &str,
    ) -> Result<Self, HttpError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
                HttpError::RequestError {
                    message: format!("Invalid header name '{}': {}", header_name, e),
                }
            })?,
            reqwest::header::HeaderValue::from_str(header_value).map_err(|e| {
                HttpError::RequestError {
                    message: format!("Invalid header value for '{}': {}", header_name, e),
                }
            })?,
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| HttpError::RequestError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(DefaultHttpClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(feature = "default_client")]
#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn request(
        &self,
        method: HttpMethod,
        path: String,
        query: Option<HashMap<String, String>>,
        body: Option<Vec<u8>>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError> {
        let url = format!("{}{}", self.base_url, path);
        let method = reqwest::Method::from_bytes(method.as_str().as_bytes()).map_err(|e| {
            HttpError::RequestError {
                message: e.to_string(),
            }
        })?;

        let mut request_builder = self.client.request(method, &url);

        if let Some(query_params) = query {
            request_builder = request_builder.query(&query_params);
        }

        if let Some(header_params) = headers {
            for (key, value) in header_params {
                request_builder = request_builder.header(key, value);
            }
        }

        if let Some(body_data) = body {
            request_builder = request_builder.body(body_data);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|e| HttpError::RequestError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response text".to_string());
            return Err(HttpError::StatusError {
                status: status.as_u16(),
                message,
            });
        }

        let response_headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::RequestError {
                message: e.to_string(),
            })?
            .to_vec();

        Ok(HttpResponse {
            body,
            headers: response_headers,
        })
    }
}
