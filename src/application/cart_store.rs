use crate::domain::cart::{AddToCart, Cart, CartItemPatch, check_travelers};
use crate::domain::ids::{CartItemId, TourId};
use crate::domain::money::Price;
use crate::domain::ports::SharedCartApi;
use crate::domain::tour::Tour;
use crate::error::Result;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Client-side mirror of the user's cart.
///
/// Every mutation is a single round trip. A successful response replaces the mirror
/// wholesale; a failed one leaves it exactly as it was. There is no merging, no optimistic
/// update and no retry.
pub struct CartStore {
    api: SharedCartApi,
    cart: RwLock<Option<Cart>>,
}

impl CartStore {
    /// Creates a store with no cart loaded yet.
    pub fn new(api: SharedCartApi) -> Self {
        Self {
            api,
            cart: RwLock::new(None),
        }
    }

    /// Loads the cart from the server, replacing whatever was mirrored.
    pub async fn fetch(&self) -> Result<Cart> {
        let cart = self
            .api
            .fetch()
            .await
            .map_err(|e| e.into_request_failure("Failed to load cart"))?;
        Ok(self.replace(cart).await)
    }

    pub async fn add_item(
        &self,
        tour_id: TourId,
        travelers: u32,
        start_date: NaiveDate,
    ) -> Result<Cart> {
        let request = AddToCart::new(tour_id, travelers, start_date)?;
        self.send_add(request).await
    }

    /// Adds a tour, refusing party sizes above the tour's group limit before any request.
    pub async fn add_tour(&self, tour: &Tour, travelers: u32, start_date: NaiveDate) -> Result<Cart> {
        check_travelers(travelers, Some(tour.group_size.max))?;
        self.add_item(tour.id.clone(), travelers, start_date).await
    }

    async fn send_add(&self, request: AddToCart) -> Result<Cart> {
        debug!(tour = %request.tour_id, travelers = request.travelers, "adding to cart");
        let cart = self
            .api
            .add(request)
            .await
            .map_err(|e| e.into_request_failure("Failed to add to cart"))?;
        Ok(self.replace(cart).await)
    }

    pub async fn update_item(&self, item_id: &CartItemId, patch: CartItemPatch) -> Result<Cart> {
        if let Some(travelers) = patch.travelers {
            let max = self
                .cart
                .read()
                .await
                .as_ref()
                .and_then(|cart| cart.item(item_id))
                .and_then(|item| item.tour.max_travelers());
            check_travelers(travelers, max)?;
        }

        debug!(item = %item_id, "updating cart item");
        let cart = self
            .api
            .update(item_id, patch)
            .await
            .map_err(|e| e.into_request_failure("Failed to update cart item"))?;
        Ok(self.replace(cart).await)
    }

    pub async fn remove_item(&self, item_id: &CartItemId) -> Result<Cart> {
        debug!(item = %item_id, "removing cart item");
        let cart = self
            .api
            .remove(item_id)
            .await
            .map_err(|e| e.into_request_failure("Failed to remove from cart"))?;
        Ok(self.replace(cart).await)
    }

    pub async fn clear(&self) -> Result<Cart> {
        let cart = self.api.clear().await.map_err(|e| {
            warn!(error = %e, "cart clear failed");
            e.into_request_failure("Failed to clear cart")
        })?;
        Ok(self.replace(cart).await)
    }

    /// Drops the mirror without touching the server, as on logout.
    pub async fn reset(&self) {
        *self.cart.write().await = None;
    }

    /// The last cart the server returned, if any.
    pub async fn snapshot(&self) -> Option<Cart> {
        self.cart.read().await.clone()
    }

    pub async fn item_count(&self) -> usize {
        self.cart
            .read()
            .await
            .as_ref()
            .map_or(0, Cart::item_count)
    }

    pub async fn total(&self) -> Price {
        self.cart
            .read()
            .await
            .as_ref()
            .map_or(Price::ZERO, |cart| cart.total)
    }

    async fn replace(&self, cart: Cart) -> Cart {
        info!(items = cart.item_count(), total = %cart.total, "cart updated");
        *self.cart.write().await = Some(cart.clone());
        cart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartItem;
    use crate::domain::ports::MockCartApi;
    use crate::domain::tour::{GroupSize, TourSummary};
    use crate::error::StorefrontError;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 20).unwrap()
    }

    fn line(id: &str, travelers: u32, unit: Price) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            tour: TourSummary {
                id: TourId::new("t-1"),
                title: "Goa Beach Escape".to_string(),
                price: Some(unit),
                group_size: Some(GroupSize { min: 1, max: 4 }),
            },
            travelers,
            start_date: date(),
            price: unit * travelers,
        }
    }

    fn cart_of(items: Vec<CartItem>) -> Cart {
        let total = items.iter().map(|i| i.price).sum();
        Cart { items, total }
    }

    #[tokio::test]
    async fn test_add_replaces_state_with_server_cart() {
        let server_cart = cart_of(vec![line("l1", 2, Price::new(dec!(10000)))]);
        let returned = server_cart.clone();

        let mut api = MockCartApi::new();
        api.expect_add()
            .withf(|req| req.travelers == 2 && req.tour_id == TourId::new("t-1"))
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let store = CartStore::new(Arc::new(api));
        let cart = store.add_item(TourId::new("t-1"), 2, date()).await.unwrap();

        assert_eq!(cart, server_cart);
        assert_eq!(store.snapshot().await, Some(server_cart));
        assert_eq!(store.item_count().await, 1);
        assert_eq!(store.total().await, Price::new(dec!(20000)));
    }

    #[tokio::test]
    async fn test_failure_keeps_state_and_surfaces_server_message() {
        let initial = cart_of(vec![line("l1", 1, Price::new(dec!(5000)))]);
        let fetched = initial.clone();

        let mut api = MockCartApi::new();
        api.expect_fetch().returning(move || Ok(fetched.clone()));
        api.expect_remove().times(1).returning(|_| {
            Err(StorefrontError::Api {
                status: 404,
                message: Some("Cart item not found".to_string()),
            })
        });
        api.expect_clear().times(1).returning(|| {
            Err(StorefrontError::Api {
                status: 500,
                message: None,
            })
        });

        let store = CartStore::new(Arc::new(api));
        store.fetch().await.unwrap();

        let err = store.remove_item(&CartItemId::new("l1")).await.unwrap_err();
        assert_eq!(err.to_string(), "Cart item not found");
        let err = store.clear().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to clear cart");

        assert_eq!(store.snapshot().await, Some(initial));
    }

    #[tokio::test]
    async fn test_zero_travelers_never_reaches_server() {
        let mut api = MockCartApi::new();
        api.expect_add().times(0);
        api.expect_update().times(0);

        let store = CartStore::new(Arc::new(api));
        let err = store.add_item(TourId::new("t-1"), 0, date()).await;
        assert!(matches!(err, Err(StorefrontError::ValidationError(_))));

        let err = store
            .update_item(&CartItemId::new("l1"), CartItemPatch::travelers(0))
            .await;
        assert!(matches!(err, Err(StorefrontError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_respects_known_group_limit() {
        let initial = cart_of(vec![line("l1", 2, Price::new(dec!(1000)))]);
        let fetched = initial.clone();

        let mut api = MockCartApi::new();
        api.expect_fetch().returning(move || Ok(fetched.clone()));
        api.expect_update()
            .times(1)
            .returning(|_, _| Ok(cart_of(vec![line("l1", 4, Price::new(dec!(1000)))])));

        let store = CartStore::new(Arc::new(api));
        store.fetch().await.unwrap();

        let err = store
            .update_item(&CartItemId::new("l1"), CartItemPatch::travelers(5))
            .await;
        assert!(matches!(err, Err(StorefrontError::ValidationError(_))));

        let cart = store
            .update_item(&CartItemId::new("l1"), CartItemPatch::travelers(4))
            .await
            .unwrap();
        assert_eq!(cart.items[0].travelers, 4);
        assert_eq!(cart.items[0].price, Price::new(dec!(4000)));
    }

    #[tokio::test]
    async fn test_reset_drops_mirror() {
        let mut api = MockCartApi::new();
        api.expect_fetch().returning(|| Ok(Cart::default()));

        let store = CartStore::new(Arc::new(api));
        store.fetch().await.unwrap();
        assert!(store.snapshot().await.is_some());

        store.reset().await;
        assert!(store.snapshot().await.is_none());
        assert_eq!(store.total().await, Price::ZERO);
    }
}
