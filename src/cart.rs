// src/cart.rs
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::errors::AppError;
use crate::gateway::ApiGateway;
use crate::models::{AddItemPayload, Cart, CartItem, CartItemMutation};

#[derive(Serialize)]
struct QuantityPatch {
    quantity: u32,
}

/// Koszyk użytkownika i publikowana liczba sztuk (plakietka w nagłówku).
#[derive(Clone)]
pub struct CartService {
    gateway: ApiGateway,
    count: Arc<watch::Sender<u32>>,
}

impl CartService {
    pub fn new(gateway: ApiGateway) -> Self {
        let (count, _) = watch::channel(0);
        Self {
            gateway,
            count: Arc::new(count),
        }
    }

    pub fn count(&self) -> u32 {
        *self.count.borrow()
    }

    pub fn subscribe_count(&self) -> watch::Receiver<u32> {
        self.count.subscribe()
    }

    pub async fn get_cart(&self) -> Result<Cart, AppError> {
        let cart: Cart = self.gateway.get_json("/cart/").await?;
        let total = cart.total_quantity();
        self.count.send_if_modified(|current| {
            if *current == total {
                return false;
            }
            *current = total;
            true
        });
        tracing::debug!("Koszyk: {} pozycji, {} sztuk", cart.items.len(), total);
        Ok(cart)
    }

    pub async fn add_item(&self, payload: &AddItemPayload) -> Result<CartItemMutation, AppError> {
        if payload.quantity == 0 {
            return Err(AppError::Validation(
                "La quantité doit être au moins 1.".to_string(),
            ));
        }
        let mutation: CartItemMutation = self.gateway.post_json("/cart/items/", payload).await?;
        tracing::info!(
            "Dodano do koszyka produkt {} (wariant {}) x{}",
            payload.product_id,
            payload.variant_id,
            payload.quantity
        );
        self.get_cart().await?;
        Ok(mutation)
    }

    pub async fn update_qty(&self, item_id: i64, quantity: u32) -> Result<CartItemMutation, AppError> {
        if quantity == 0 {
            return Err(AppError::Validation(
                "La quantité doit être au moins 1.".to_string(),
            ));
        }
        let path = format!("/cart/items/{}/", item_id);
        let mutation: CartItemMutation = self
            .gateway
            .patch_json(&path, &QuantityPatch { quantity })
            .await?;
        tracing::info!("Zmieniono ilość pozycji {} na {}", item_id, quantity);
        self.get_cart().await?;
        Ok(mutation)
    }

    pub async fn remove_item(&self, item_id: i64) -> Result<(), AppError> {
        self.gateway.delete(&format!("/cart/items/{}/", item_id)).await?;
        tracing::info!("Usunięto pozycję {} z koszyka", item_id);
        self.get_cart().await?;
        Ok(())
    }
}

/// Strona koszyka z lokalnymi (optymistycznymi) ilościami.
#[derive(Debug, Default)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub loaded: bool,
    pub error_message: Option<String>,
    local_qty: HashMap<i64, u32>,
}

impl CartView {
    pub async fn refresh(&mut self, cart: &CartService) -> Result<(), AppError> {
        match cart.get_cart().await {
            Ok(fresh) => {
                self.apply(fresh);
                Ok(())
            }
            Err(e) => {
                self.error_message = Some(e.user_message());
                self.loaded = true;
                Err(e)
            }
        }
    }

    pub fn apply(&mut self, cart: Cart) {
        self.local_qty = cart
            .items
            .iter()
            .map(|item| (item.id, item.quantity))
            .collect();
        self.items = cart.items;
        self.subtotal = cart.subtotal;
        self.loaded = true;
        self.error_message = None;
    }

    pub fn optimistic_qty(&self, item_id: i64) -> u32 {
        self.local_qty
            .get(&item_id)
            .copied()
            .or_else(|| self.item(item_id).map(|item| item.quantity))
            .unwrap_or(1)
    }

    pub fn incr(&mut self, item_id: i64) -> u32 {
        let qty = self.optimistic_qty(item_id).saturating_add(1);
        self.local_qty.insert(item_id, qty);
        qty
    }

    pub fn decr(&mut self, item_id: i64) -> u32 {
        let qty = self.optimistic_qty(item_id).saturating_sub(1).max(1);
        self.local_qty.insert(item_id, qty);
        qty
    }

    pub fn line_total(&self, item_id: i64) -> f64 {
        self.item(item_id)
            .map(|item| item.unit_price * f64::from(self.optimistic_qty(item_id)))
            .unwrap_or(0.0)
    }

    /// Wysyła lokalną ilość pozycji do backendu.
    pub async fn commit(&mut self, cart: &CartService, item_id: i64) -> Result<(), AppError> {
        let qty = self.optimistic_qty(item_id);
        if let Err(e) = cart.update_qty(item_id, qty).await {
            self.error_message = Some(e.user_message());
            return Err(e);
        }
        self.refresh(cart).await
    }

    pub async fn remove(&mut self, cart: &CartService, item_id: i64) -> Result<(), AppError> {
        if let Err(e) = cart.remove_item(item_id).await {
            self.error_message = Some(e.user_message());
            return Err(e);
        }
        self.refresh(cart).await
    }

    fn item(&self, item_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        Cart {
            id: 1,
            subtotal: 35.0,
            items: vec![CartItem {
                id: 7,
                product_id: "p1".into(),
                variant_id: "v1".into(),
                product_title: "Croquettes".into(),
                unit_price: 17.5,
                quantity: 2,
                total_price: 35.0,
                image_url: None,
                weight: Some(3.0),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn local_quantity_never_drops_below_one() {
        let mut view = CartView::default();
        view.apply(cart());
        assert_eq!(view.optimistic_qty(7), 2);
        assert_eq!(view.decr(7), 1);
        assert_eq!(view.decr(7), 1);
        assert_eq!(view.incr(7), 2);
        assert_eq!(view.incr(7), 3);
        assert!((view.line_total(7) - 52.5).abs() < 1e-9);
    }

    #[test]
    fn apply_resets_local_quantities() {
        let mut view = CartView::default();
        view.apply(cart());
        view.incr(7);
        view.apply(cart());
        assert_eq!(view.optimistic_qty(7), 2);
        assert!(view.loaded);
        assert_eq!(view.line_total(99), 0.0);
    }
}
