// src/products.rs
use futures::future::try_join_all;
use reqwest::{Method, multipart};
use serde::Serialize;

use crate::errors::AppError;
use crate::filters::ListingParams;
use crate::gateway::ApiGateway;
use crate::models::{Product, Variation};
use crate::pagination::Paginated;

pub const UNTITLED_PRODUCT: &str = "Produit sans titre";
pub const UNKNOWN_CATEGORY: &str = "Catégorie inconnue";

/// Treść tworzenia/edycji produktu wysyłana do backendu.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ProductDraft {
    pub title: String,
    pub category: String,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal: Option<String>,
    pub description: String,
    pub variations: Vec<Variation>,
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            animal: product.animal.clone(),
            description: product.description.clone(),
            variations: product.variations.clone(),
        }
    }
}

/// Plik obrazka dołączany do formularza multipart.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    fn into_part(self) -> Result<multipart::Part, AppError> {
        multipart::Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .map_err(|e| AppError::Validation(format!("Type d'image invalide : {}", e)))
    }
}

#[derive(Clone)]
pub struct ProductService {
    gateway: ApiGateway,
}

impl ProductService {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// Jedna strona katalogu, z uzupełnionymi pustymi tytułami i kategoriami.
    pub async fn list(&self, params: &ListingParams) -> Result<Paginated<Product>, AppError> {
        let mut page: Paginated<Product> = self.gateway.get_query("/products/", params).await?;
        page.results = normalize_listing(page.results);
        tracing::debug!(
            "Pobrano stronę {} produktów ({} z {})",
            params.current_page(),
            page.results.len(),
            page.count
        );
        Ok(page)
    }

    /// Cały katalog: pierwsza strona, potem pozostałe równolegle.
    pub async fn list_all(&self, params: &ListingParams) -> Result<Vec<Product>, AppError> {
        let first_params = ListingParams {
            page: Some(1),
            ..params.clone()
        };
        let first = self.list(&first_params).await?;
        let total_pages = first.total_pages(first.results.len());
        let mut products = first.results;

        if first.next.is_none() || total_pages <= 1 {
            return Ok(products);
        }

        let pages = (2..=total_pages).map(|page| {
            let params = ListingParams {
                page: Some(page as u32),
                ..params.clone()
            };
            async move { self.list(&params).await }
        });

        for page in try_join_all(pages).await? {
            products.extend(page.results);
        }
        tracing::info!("Pobrano cały katalog: {} produktów", products.len());
        Ok(products)
    }

    pub async fn get(&self, id: &str) -> Result<Product, AppError> {
        let path = format!("/products/product-detail/{}/", urlencoding::encode(id));
        let product: Product = self.gateway.get_json(&path).await?;
        Ok(normalize(product))
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, AppError> {
        let product: Product = self
            .gateway
            .post_json("/products/product-create/", draft)
            .await?;
        tracing::info!("Utworzono produkt '{}'", draft.title);
        Ok(product)
    }

    /// Tworzenie z obrazkiem: część `image` z plikiem i część `data` z JSON-em produktu.
    pub async fn create_with_image(
        &self,
        draft: &ProductDraft,
        image: ImageUpload,
    ) -> Result<Product, AppError> {
        let data = serde_json::to_string(draft)?;
        let form = multipart::Form::new()
            .part("image", image.into_part()?)
            .text("data", data);
        let product: Product = self
            .gateway
            .send_multipart(Method::POST, "/products/product-create/", form)
            .await?;
        tracing::info!("Utworzono produkt '{}' z obrazkiem", draft.title);
        Ok(product)
    }

    /// `partial` wysyła PATCH zamiast PUT.
    pub async fn update<B>(&self, id: &str, body: &B, partial: bool) -> Result<Product, AppError>
    where
        B: Serialize + ?Sized,
    {
        let path = format!("/products/product-update/{}/", urlencoding::encode(id));
        let product: Product = if partial {
            self.gateway.patch_json(&path, body).await?
        } else {
            self.gateway.put_json(&path, body).await?
        };
        tracing::info!("Zaktualizowano produkt {}", id);
        Ok(product)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let path = format!("/products/product-delete/{}/", urlencoding::encode(id));
        self.gateway.delete(&path).await?;
        tracing::info!("Usunięto produkt {}", id);
        Ok(())
    }
}

/// Najniższa cena spośród wariantów z ustawioną ceną.
pub fn min_price(product: &Product) -> Option<f64> {
    product
        .variations
        .iter()
        .filter_map(|v| v.price)
        .filter(|p| p.is_finite())
        .reduce(f64::min)
}

fn normalize(mut product: Product) -> Product {
    if product.title.trim().is_empty() {
        product.title = UNTITLED_PRODUCT.to_string();
    }
    if product.category.trim().is_empty() {
        product.category = UNKNOWN_CATEGORY.to_string();
    }
    product
}

pub fn normalize_listing(products: Vec<Product>) -> Vec<Product> {
    products.into_iter().map(normalize).collect()
}

/// Unikalne kategorie w kolejności pierwszego wystąpienia.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !seen.iter().any(|c| c == &product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}
