//! HTTP client for the CompareX REST API.
//!
//! Every successful response is wrapped in a `{ data, meta }` envelope; the
//! client unwraps `data` and maps error envelopes to [`ClientError`].

use std::time::Duration;

use comparex_core::{
    Category, ClientConfig, PriceComparison, Product, ProductInput, SortKey,
};
use reqwest::{Client, Method, Response, StatusCode, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Server-side filters for `GET /products`. All fields optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<SortKey>,
}

impl ListParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the CompareX API.
///
/// Use [`ApiClient::new`] with loaded settings or [`ApiClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ClientError::InvalidBaseUrl`] for a malformed API URL.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_base_url(&config.api_url, config.request_timeout_secs)
    }

    /// Creates a client rooted at `base_url` (for example
    /// `http://localhost:5001/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("comparex-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // One trailing slash so Url::join appends instead of replacing the
        // last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("'{base_url}': {e}")))?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn list_products(&self, params: &ListParams) -> Result<Vec<Product>, ClientError> {
        let url = self.endpoint("products")?;
        let request = self.client.get(url).query(&params.query_pairs());
        self.execute(request, "GET products").await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn get_product(&self, id: i64) -> Result<Product, ClientError> {
        let url = self.endpoint(&format!("products/{id}"))?;
        self.execute(self.client.get(url), &format!("GET products/{id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] when the payload fails validation.
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        self.send_json(Method::POST, "products", input).await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id or
    /// [`ClientError::Rejected`] when the payload fails validation.
    pub async fn update_product(
        &self,
        id: i64,
        input: &ProductInput,
    ) -> Result<Product, ClientError> {
        self.send_json(Method::PUT, &format!("products/{id}"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn delete_product(&self, id: i64) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("products/{id}"))?;
        self.execute::<serde_json::Value>(
            self.client.delete(url),
            &format!("DELETE products/{id}"),
        )
        .await?;
        Ok(())
    }

    /// Products for `ids`, in the order the server returns them.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] when `ids` is empty.
    pub async fn compare(&self, ids: &[i64]) -> Result<Vec<Product>, ClientError> {
        let joined = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let url = self.endpoint("compare")?;
        self.execute(self.client.get(url).query(&[("ids", joined)]), "GET compare")
            .await
    }

    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn categories(&self) -> Result<Vec<String>, ClientError> {
        let url = self.endpoint("categories")?;
        self.execute(self.client.get(url), "GET categories").await
    }

    /// # Errors
    ///
    /// See [`ClientError`].
    pub async fn trending(&self) -> Result<Vec<Product>, ClientError> {
        let url = self.endpoint("products/trending")?;
        self.execute(self.client.get(url), "GET products/trending")
            .await
    }

    /// Simulated multi-retailer prices for product `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn price_comparison(&self, id: i64) -> Result<PriceComparison, ClientError> {
        let url = self.endpoint(&format!("products/{id}/price-comparison"))?;
        self.execute(
            self.client.get(url),
            &format!("GET products/{id}/price-comparison"),
        )
        .await
    }

    /// Health status. A degraded server (503) still yields a status body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the server cannot be reached.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.endpoint("health")?;
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return decode_body(response, "GET health").await;
        }
        decode(response, "GET health").await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("cannot join '{path}': {e}")))
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let context = format!("{method} {path}");
        self.execute(self.client.request(method, url).json(body), &context)
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        decode(response, context).await
    }
}

/// Maps non-2xx statuses to errors and unwraps the success envelope.
async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return decode_body(response, context).await;
    }

    let body = response.text().await?;
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map_or_else(|_| body.trim().to_string(), |e| e.error.message);
    tracing::debug!(%status, context, message = %message, "API request rejected");

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(message));
    }
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn decode_body<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, ClientError> {
    let body = response.text().await?;
    serde_json::from_str::<Envelope<T>>(&body)
        .map(|envelope| envelope.data)
        .map_err(|e| ClientError::Deserialize {
            context: context.to_string(),
            source: e,
        })
}
