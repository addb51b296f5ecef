// src/services/http.rs

//! HTTP collaborator.
//!
//! The synchronizer only needs "send a JSON request, get a JSON response or
//! a failure". That seam is the [`HttpClient`] trait so tests can swap the
//! network out.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;
use crate::utils::http::create_async_client;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
}

/// A successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

impl ApiResponse {
    /// Decode the body into a typed payload.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.data)?)
    }
}

/// Sends JSON requests. Non-2xx answers are errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(&self, method: Method, url: &str, body: Option<&Value>) -> Result<ApiResponse>;

    async fn get(&self, url: &str) -> Result<ApiResponse> {
        self.request(Method::Get, url, None).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::Post, url, Some(body)).await
    }

    async fn put(&self, url: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::Put, url, Some(body)).await
    }

    async fn patch(&self, url: &str, body: &Value) -> Result<ApiResponse> {
        self.request(Method::Patch, url, Some(body)).await
    }
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn request(&self, method: Method, url: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let builder = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Patch => self.client.patch(url),
        };
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };

        log::debug!("{method:?} {url}");
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AppError::transport(url, status.as_u16(), text));
        }

        let data = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok(ApiResponse {
            status: status.as_u16(),
            data,
        })
    }
}
