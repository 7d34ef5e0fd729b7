use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin client for the hosted record store. Collections are exposed as REST
/// resources under `/rest/v1/<collection>` with `field=op.value` filters;
/// every mutation is atomic per document, nothing spans documents.
pub struct RecordStoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RecordStoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.record_store_url.clone(),
            api_key: config.record_store_api_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>, returning: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if returning {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
            );
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let returning = method != Method::GET;
        let url = format!("{}{}", self.base_url, path);
        debug!("Record store request: {} {}", method, url);

        let headers = self.get_headers(auth_token, returning);

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Record store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("Record store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Indexed range query over a collection. `query` is the raw filter
    /// string, e.g. `present=eq.true&limit=200`.
    pub async fn select<T>(
        &self,
        collection: &str,
        query: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", collection, query);
        self.request(Method::GET, &path, auth_token, None).await
    }

    /// Like `select`, but unwraps the first match.
    pub async fn select_first<T>(
        &self,
        collection: &str,
        query: &str,
        auth_token: Option<&str>,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut rows = self.select::<T>(collection, query, auth_token).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// Insert a single document, returning the stored representation.
    pub async fn insert<T>(&self, collection: &str, body: Value, auth_token: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}", collection);
        let mut rows: Vec<T> = self.request(Method::POST, &path, auth_token, Some(body)).await?;
        if rows.is_empty() {
            return Err(anyhow!("Insert into {} returned no representation", collection));
        }
        Ok(rows.remove(0))
    }

    /// Patch every document matching `query`. Returns the patched rows.
    pub async fn patch<T>(
        &self,
        collection: &str,
        query: &str,
        body: Value,
        auth_token: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", collection, query);
        self.request(Method::PATCH, &path, auth_token, Some(body)).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
