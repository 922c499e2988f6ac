// src/product_detail.rs
use crate::cart::CartService;
use crate::errors::AppError;
use crate::models::{AddItemPayload, CartItemMutation, Product, Variation};
use crate::products::ProductService;

const EMPTY_DESCRIPTION: &str = "Pas de description détaillée.";
const SECTION_HEADINGS: &[&str] = &["Composition", "Composants Analytiques", "Additifs"];

/// Strona produktu: wybór wariantu (wagi) i ilości.
#[derive(Debug)]
pub struct ProductDetailView {
    pub product: Option<Product>,
    pub quantity: u32,
    pub error_message: Option<String>,
    selected: Option<usize>,
}

impl Default for ProductDetailView {
    fn default() -> Self {
        Self {
            product: None,
            quantity: 1,
            error_message: None,
            selected: None,
        }
    }
}

impl ProductDetailView {
    pub async fn load(&mut self, service: &ProductService, id: &str) -> Result<(), AppError> {
        match service.get(id).await {
            Ok(product) => {
                self.show(product);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Błąd ładowania produktu {}: {:?}", id, e);
                self.error_message = Some("Erreur lors du chargement du produit.".to_string());
                Err(e)
            }
        }
    }

    /// Domyślnie zaznaczony jest pierwszy wariant.
    pub fn show(&mut self, product: Product) {
        self.selected = if product.variations.is_empty() {
            None
        } else {
            Some(0)
        };
        self.product = Some(product);
        self.quantity = 1;
        self.error_message = None;
    }

    /// Wybiera wariant po id, a gdy backend nie nadał id, po SKU.
    pub fn select_variation(&mut self, key: &str) -> bool {
        let Some(product) = &self.product else {
            return false;
        };
        let position = product
            .variations
            .iter()
            .position(|v| v.id.as_deref() == Some(key) || v.sku == key);
        if position.is_some() {
            self.selected = position;
        }
        position.is_some()
    }

    pub fn selected_variation(&self) -> Option<&Variation> {
        let product = self.product.as_ref()?;
        product.variations.get(self.selected?)
    }

    pub fn selected_price(&self) -> Option<f64> {
        self.selected_variation().and_then(|v| v.price)
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }

    pub fn add_item_payload(&self) -> Result<AddItemPayload, AppError> {
        let product = self
            .product
            .as_ref()
            .ok_or_else(|| AppError::Validation("Aucun produit chargé.".to_string()))?;
        let variation = self
            .selected_variation()
            .ok_or_else(|| AppError::Validation("Aucune variation sélectionnée.".to_string()))?;
        let unit_price = variation.price.ok_or_else(|| {
            AppError::Validation("Cette variation n'a pas de prix.".to_string())
        })?;

        Ok(AddItemPayload {
            product_id: product.id.clone(),
            variant_id: variation
                .id
                .clone()
                .unwrap_or_else(|| variation.sku.clone()),
            quantity: self.quantity,
            unit_price,
            product_title: Some(product.title.clone()),
            image_url: Some(product.image_url.clone()).filter(|url| !url.is_empty()),
            weight: variation.weight_kg(),
        })
    }

    pub async fn add_to_cart(&mut self, cart: &CartService) -> Result<CartItemMutation, AppError> {
        let payload = match self.add_item_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Nie można dodać do koszyka: {:?}", e);
                self.error_message = Some(e.user_message());
                return Err(e);
            }
        };
        cart.add_item(&payload).await.inspect_err(|e| {
            self.error_message = Some(e.user_message());
        })
    }
}

/// Pogrubia nagłówki sekcji i łamie linie po kropkach.
pub fn format_description(description: &str) -> String {
    if description.trim().is_empty() {
        return EMPTY_DESCRIPTION.to_string();
    }

    let mut text = description.to_string();
    for heading in SECTION_HEADINGS {
        text = emphasize_heading(&text, heading);
    }

    let mut out = String::with_capacity(text.len() + 32);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if matches!(c, '.' | '|' | '*') {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            out.push_str("<br><br>");
        }
    }
    out
}

// Nagłówek (bez rozróżniania wielkości liter), opcjonalne spacje, dwukropek.
fn emphasize_heading(text: &str, heading: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let needle = heading.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find(&needle) {
        let start = cursor + found;
        let after_heading = start + needle.len();
        let rest = &text[after_heading..];
        let spaces = rest.len() - rest.trim_start().len();
        if rest[spaces..].starts_with(':') {
            out.push_str(&text[cursor..start]);
            out.push_str(&format!("<strong>{} :</strong>", heading));
            cursor = after_heading + spaces + 1;
        } else {
            out.push_str(&text[cursor..after_heading]);
            cursor = after_heading;
        }
    }
    out.push_str(&text[cursor..]);
    out
}
