use crate::domain::booking::Booking;
use crate::domain::cart::{AddToCart, Cart, CartItemPatch};
use crate::domain::ids::{BookingId, CartItemId, TourId};
use crate::domain::order::{CreateOrderRequest, PendingOrder, VerifyPaymentRequest};
use crate::domain::ports::{BookingApi, CartApi, TourApi};
use crate::domain::tour::{Tour, TourPage, TourQuery};
use crate::error::{Result, StorefrontError};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Connection settings for [`RestClient`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// API root, e.g. `"https://api.example.com/api"`.
    pub base_url: String,
    /// Bearer token of the logged-in user.
    pub token: Option<String>,
    pub timeout: Duration,
}

/// The booking service's REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    config: RestConfig,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl RestClient {
    pub fn new(config: RestConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(%method, %url, "api request");
        let builder = self.http.request(method, url);
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(StorefrontError::Api {
            status: status.as_u16(),
            message: error_message(&text),
        })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let response = Self::send(builder).await?;
        Ok(response.json().await?)
    }
}

/// The `message` of a JSON error body, if the server sent one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
}

#[async_trait]
impl CartApi for RestClient {
    async fn fetch(&self) -> Result<Cart> {
        Self::json(self.request(Method::GET, "/cart")).await
    }

    async fn add(&self, item: AddToCart) -> Result<Cart> {
        Self::json(self.request(Method::POST, "/cart/add").json(&item)).await
    }

    async fn update(&self, item_id: &CartItemId, patch: CartItemPatch) -> Result<Cart> {
        let path = format!("/cart/item/{item_id}");
        Self::json(self.request(Method::PUT, &path).json(&patch)).await
    }

    async fn remove(&self, item_id: &CartItemId) -> Result<Cart> {
        let path = format!("/cart/item/{item_id}");
        Self::json(self.request(Method::DELETE, &path)).await
    }

    async fn clear(&self) -> Result<Cart> {
        Self::json(self.request(Method::DELETE, "/cart/clear")).await
    }
}

#[async_trait]
impl BookingApi for RestClient {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<PendingOrder> {
        Self::json(
            self.request(Method::POST, "/bookings/create-order")
                .json(&request),
        )
        .await
    }

    async fn verify_payment(&self, request: VerifyPaymentRequest) -> Result<()> {
        Self::send(
            self.request(Method::POST, "/bookings/verify-payment")
                .json(&request),
        )
        .await?;
        Ok(())
    }

    async fn my_bookings(&self) -> Result<Vec<Booking>> {
        Self::json(self.request(Method::GET, "/bookings/my-bookings")).await
    }

    async fn booking(&self, id: &BookingId) -> Result<Booking> {
        Self::json(self.request(Method::GET, &format!("/bookings/{id}"))).await
    }

    async fn cancel(&self, id: &BookingId, reason: String) -> Result<Booking> {
        let body = serde_json::json!({ "reason": reason });
        Self::send(
            self.request(Method::PUT, &format!("/bookings/{id}/cancel"))
                .json(&body),
        )
        .await?;
        // The cancel response shape is not stable; read the booking back.
        self.booking(id).await
    }
}

#[async_trait]
impl TourApi for RestClient {
    async fn list(&self, query: TourQuery) -> Result<TourPage> {
        Self::json(
            self.request(Method::GET, "/tours")
                .query(&query.to_query_pairs()),
        )
        .await
    }

    async fn get(&self, id: &TourId) -> Result<Tour> {
        Self::json(self.request(Method::GET, &format!("/tours/{id}"))).await
    }
}
