//! `DataStore` over a PostgREST endpoint (Supabase `/rest/v1`).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{validate_identifier, DataStore, Direction, Query, Record, StoreError};

/// Error body PostgREST returns on non-2xx responses.
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

pub struct PostgrestStore {
    client: Client,
    base_url: String,
}

impl PostgrestStore {
    /// `base_url` is the project URL without the `/rest/v1` suffix; `api_key`
    /// is sent both as `apikey` and as the bearer token.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(api_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", api_key))?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to create HTTP client: {}", e)))?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_url(&self, table: &str, query: &Query) -> Result<Url, StoreError> {
        let table = validate_identifier(table)?;
        let mut params: Vec<(&str, String)> = Vec::with_capacity(3);
        params.push(("select", query.select.join(",")));
        if let Some(order) = &query.order_by {
            let direction = match order.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            params.push(("order", format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        Url::parse_with_params(&format!("{}/rest/v1/{}", self.base_url, table), &params)
            .map_err(|e| StoreError::Transport(format!("invalid store url: {}", e)))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value)
        .map_err(|_| StoreError::Transport("api key contains invalid header characters".into()))
}

#[async_trait]
impl DataStore for PostgrestStore {
    async fn query(
        &self,
        schema: &str,
        table: &str,
        query: &Query,
    ) -> Result<Vec<Record>, StoreError> {
        let url = self.request_url(table, query)?;
        debug!(%url, schema, "querying store");

        let response = self
            .client
            .get(url)
            .header("Accept-Profile", schema)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Vec<Record>>().await?);
        }

        let body = response.text().await.map_err(|e| {
            StoreError::Transport(format!("failed to read error body ({}): {}", status, e))
        })?;
        Err(match serde_json::from_str::<PostgrestErrorBody>(&body) {
            Ok(parsed) => StoreError::Api {
                code: parsed.code.unwrap_or_else(|| status.as_u16().to_string()),
                message: parsed
                    .message
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
                details: parsed.details,
                hint: parsed.hint,
            },
            Err(_) => StoreError::Api {
                code: status.as_u16().to_string(),
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    body
                },
                details: None,
                hint: None,
            },
        })
    }
}
