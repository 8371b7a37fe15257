//! Order-management backend client.
//!
//! Request/response calls authenticate with a bearer-token header; only
//! the push channel passes the credential as a connection parameter.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use driftwood_core::OrderId;

use crate::models::guest::GuestItem;
use crate::models::order::Order;

/// Errors from backend API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client-side configuration problem (bad URL, bad token bytes).
    #[error("API client error: {0}")]
    Config(String),
}

/// Read surface for the authenticated order list.
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Fetch the account's order list.
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// Fetch one order by ID.
    async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError>;
}

/// Account mutation surface consumed by the guest migration service.
///
/// Both calls are idempotent by product ID from the caller's
/// perspective: the backend reconciles a duplicate add as "already
/// present" instead of erroring.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Add one entry to the account cart.
    async fn add_cart_item(&self, item: &GuestItem) -> Result<(), ApiError>;

    /// Add one entry to the account wishlist.
    async fn add_wishlist_item(&self, item: &GuestItem) -> Result<(), ApiError>;
}

/// HTTP client for the order-management backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client authenticated with the account credential.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the token contains bytes invalid
    /// in a header, or `ApiError::Http` if the client fails to build.
    pub fn new(base_url: Url, token: &SecretString) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| ApiError::Config(format!("invalid token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Config(format!("invalid endpoint {path}: {e}")))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl OrdersApi for BackendClient {
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let response = self.client.get(self.endpoint("orders")?).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&format!("orders/{id}"))?)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl AccountApi for BackendClient {
    async fn add_cart_item(&self, item: &GuestItem) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("cart/items")?)
            .json(item)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn add_wishlist_item(&self, item: &GuestItem) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("wishlist/items")?)
            .json(item)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
