// src/delivery.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cart::CartService;
use crate::errors::AppError;
use crate::gateway::ApiGateway;
use crate::models::{Cart, DeliveryOption};

#[derive(Deserialize)]
struct DeliveryOptionsResponse {
    #[serde(default)]
    options: Vec<DeliveryOption>,
}

#[derive(Serialize)]
struct DeliveryChoicePayload<'a> {
    delivery_method: &'a str,
    delivery_price: f64,
}

#[derive(Serialize)]
struct WeightQuery {
    weight: f64,
}

#[derive(Clone)]
pub struct DeliveryService {
    gateway: ApiGateway,
}

impl DeliveryService {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// Dostępne sposoby dostawy dla łącznej wagi koszyka (kg).
    pub async fn options(&self, weight: f64) -> Result<Vec<DeliveryOption>, AppError> {
        let response: DeliveryOptionsResponse = self
            .gateway
            .get_query("/delivery/options/", &WeightQuery { weight })
            .await?;
        tracing::debug!(
            "Opcje dostawy dla {} kg: {}",
            weight,
            response.options.len()
        );
        Ok(response.options)
    }

    /// Zapisuje wybraną dostawę w koszyku; backend zwraca zaktualizowany koszyk.
    pub async fn choose(&self, method: &str, price: f64) -> Result<Cart, AppError> {
        let payload = DeliveryChoicePayload {
            delivery_method: method,
            delivery_price: price,
        };
        let cart: Cart = self.gateway.post_json("/cart/delivery/", &payload).await?;
        tracing::info!("Wybrano dostawę '{}' ({} €)", method, price);
        Ok(cart)
    }
}

/// Podsumowanie pokazywane po potwierdzeniu dostawy.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverySummary {
    pub label: String,
    pub subtotal: f64,
    pub total_weight: f64,
    pub fees: f64,
    pub total: f64,
}

impl fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Livraison choisie : {}", self.label)?;
        writeln!(f, "Sous-total : {:.2} €", self.subtotal)?;
        writeln!(f, "Poids total : {} kg", self.total_weight)?;
        writeln!(f, "Frais de livraison : {:.2} €", self.fees)?;
        write!(f, "Total à payer : {:.2} €", self.total)
    }
}

#[derive(Debug, Default)]
pub struct DeliveryView {
    pub cart: Cart,
    pub total_weight: f64,
    pub options: Vec<DeliveryOption>,
    pub selected: Option<String>,
    pub error_message: Option<String>,
}

impl DeliveryView {
    /// Ładuje koszyk, a potem opcje dostawy dla jego wagi.
    pub async fn load(
        &mut self,
        cart: &CartService,
        delivery: &DeliveryService,
    ) -> Result<(), AppError> {
        let fresh = cart.get_cart().await.inspect_err(|e| {
            tracing::error!("Błąd ładowania koszyka: {:?}", e);
        })?;
        self.total_weight = fresh.total_weight();
        self.cart = fresh;
        self.options = delivery.options(self.total_weight).await.inspect_err(|e| {
            tracing::error!("Błąd ładowania opcji dostawy: {:?}", e);
        })?;
        Ok(())
    }

    pub fn select(&mut self, mode: &str) -> bool {
        if self.options.iter().any(|o| o.mode == mode) {
            self.selected = Some(mode.to_string());
            true
        } else {
            false
        }
    }

    fn selected_option(&self) -> Option<&DeliveryOption> {
        let mode = self.selected.as_deref()?;
        self.options.iter().find(|o| o.mode == mode)
    }

    pub fn selected_fees(&self) -> f64 {
        self.selected_option().map(|o| o.fees).unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.cart.subtotal + self.selected_fees()
    }

    pub fn summary(&self) -> Result<DeliverySummary, AppError> {
        let option = self.selected_option().ok_or_else(|| {
            AppError::Validation("Veuillez sélectionner un mode de livraison !".to_string())
        })?;
        Ok(DeliverySummary {
            label: option.label.clone(),
            subtotal: self.cart.subtotal,
            total_weight: self.total_weight,
            fees: option.fees,
            total: self.total(),
        })
    }

    pub async fn confirm(&mut self, delivery: &DeliveryService) -> Result<DeliverySummary, AppError> {
        let summary = match self.summary() {
            Ok(summary) => summary,
            Err(e) => {
                self.error_message = Some(e.user_message());
                return Err(e);
            }
        };
        let mode = self.selected.clone().unwrap_or_default();
        match delivery.choose(&mode, summary.fees).await {
            Ok(cart) => {
                self.cart = cart;
                self.error_message = None;
                Ok(summary)
            }
            Err(e) => {
                self.error_message = Some(e.user_message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> DeliveryView {
        DeliveryView {
            cart: Cart {
                subtotal: 40.0,
                ..Default::default()
            },
            total_weight: 6.0,
            options: vec![
                DeliveryOption {
                    mode: "relay".into(),
                    label: "Mondial Relay".into(),
                    fees: 4.9,
                },
                DeliveryOption {
                    mode: "home".into(),
                    label: "Colissimo".into(),
                    fees: 8.5,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn total_adds_selected_fees() {
        let mut view = view();
        assert_eq!(view.selected_fees(), 0.0);
        assert_eq!(view.total(), 40.0);
        assert!(!view.select("drone"));
        assert!(view.select("relay"));
        assert!((view.total() - 44.9).abs() < 1e-9);
    }

    #[test]
    fn summary_requires_a_selection() {
        let mut view = view();
        let err = view.summary().unwrap_err();
        assert_eq!(err.user_message(), "Veuillez sélectionner un mode de livraison !");

        view.select("home");
        let summary = view.summary().unwrap();
        assert_eq!(summary.label, "Colissimo");
        assert!(summary.to_string().contains("Total à payer : 48.50 €"));
    }
}
