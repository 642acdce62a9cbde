/// HTTP catalog backend
///
/// Queries `GET {base}/items?tag=...` and `GET {base}/items?cast=...`. The
/// backend answers with a JSON array of schema-less documents; they are
/// normalized here so the rest of the engine only sees well-formed `Item`s.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::Item,
    services::catalog::CatalogGateway,
};

#[derive(Clone)]
pub struct HttpCatalog {
    http_client: HttpClient,
    api_url: String,
}

impl HttpCatalog {
    pub fn new(api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn query(&self, field: &'static str, value: &str) -> AppResult<Vec<Item>> {
        let url = format!("{}/items", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[(field, value)])
            .send()
            .await
            .map_err(|e| AppError::catalog(value, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                field,
                value = %value,
                status = %status,
                body = %body,
                "Catalog request failed"
            );
            return Err(AppError::catalog(value, format!("status {}", status)));
        }

        let documents: Vec<Value> = response
            .json()
            .await
            .map_err(|e| AppError::catalog(value, e))?;

        let items = normalize_documents(&documents);

        tracing::debug!(
            field,
            value = %value,
            returned = documents.len(),
            kept = items.len(),
            "Catalog query completed"
        );

        Ok(items)
    }
}

/// Converts raw documents into items, dropping the ones without a usable id
pub fn normalize_documents(documents: &[Value]) -> Vec<Item> {
    documents
        .iter()
        .filter_map(|doc| match Item::from_document(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed catalog document");
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl CatalogGateway for HttpCatalog {
    async fn fetch_by_tag(&self, tag: &str) -> AppResult<Vec<Item>> {
        self.query("tag", tag).await
    }

    async fn fetch_by_cast(&self, member: &str) -> AppResult<Vec<Item>> {
        self.query("cast", member).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
