// src/admin.rs
use crate::errors::AppError;
use crate::filters::ListingParams;
use crate::models::{Animal, Product, Variation, category};
use crate::products::{ImageUpload, ProductDraft, ProductService};

pub const CATEGORIES: &[&str] = &[
    category::DRY_FOOD,
    category::WET_FOOD,
    category::TREATS,
    category::ACCESSORIES,
    category::CARE,
    category::TOYS,
];
pub const BRANDS: &[&str] = &["Winner", "Ownat", "Authentics"];
pub const WEIGHTS: &[&str] = &[
    "1kg", "2.5kg", "3kg", "5kg", "7kg", "10kg", "15kg", "20kg", "25kg", "30kg",
];

/// Wartości pola `animal` z etykietami do listy wyboru.
pub fn animal_options() -> Vec<(String, &'static str)> {
    Animal::menu()
        .into_iter()
        .map(|(animal, label)| (animal.to_string(), label))
        .collect()
}

/// Formularz produktu w panelu administracyjnym.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub title: String,
    pub category: String,
    pub brand: String,
    pub animal: Option<String>,
    pub description: String,
    pub variations: Vec<Variation>,
    pub image: Option<ImageUpload>,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            brand: String::new(),
            animal: None,
            description: String::new(),
            variations: vec![Variation::default()],
            image: None,
        }
    }
}

impl ProductForm {
    pub fn add_variation(&mut self) {
        self.variations.push(Variation::default());
    }

    /// Formularz zawsze zachowuje co najmniej jeden wariant.
    pub fn remove_variation(&mut self, index: usize) -> Result<(), AppError> {
        if self.variations.len() <= 1 {
            return Err(AppError::Validation(
                "Il doit y avoir au moins une variation.".to_string(),
            ));
        }
        if index >= self.variations.len() {
            return Err(AppError::Validation("Variation introuvable.".to_string()));
        }
        self.variations.remove(index);
        Ok(())
    }

    pub fn attach_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let variations_ok = !self.variations.is_empty()
            && self.variations.iter().all(|v| {
                !v.sku.trim().is_empty() && v.price.is_some_and(|p| p > 0.0) && v.stock >= 0
            });
        let animal_ok = self
            .animal
            .as_deref()
            .is_none_or(|a| a.parse::<Animal>().is_ok());
        if self.title.trim().is_empty() || !variations_ok || !animal_ok {
            return Err(AppError::Validation(
                "Veuillez remplir tous les champs obligatoires avant d'enregistrer.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn draft(&self) -> ProductDraft {
        ProductDraft {
            title: self.title.trim().to_string(),
            category: self.category.clone(),
            brand: self.brand.clone(),
            animal: self.animal.clone(),
            description: self.description.clone(),
            variations: self.variations.clone(),
        }
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        let variations = if product.variations.is_empty() {
            vec![Variation::default()]
        } else {
            product.variations.clone()
        };
        Self {
            title: product.title.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            animal: product.animal.clone(),
            description: product.description.clone(),
            variations,
            image: None,
        }
    }
}

/// Zakładki dodawania i usuwania produktów.
pub struct ProductEditor {
    service: ProductService,
    pub products: Vec<Product>,
    pub form: ProductForm,
    pub selected_title: String,
    pub message: Option<String>,
    pub error_message: Option<String>,
}

impl ProductEditor {
    pub fn new(service: ProductService) -> Self {
        Self {
            service,
            products: Vec::new(),
            form: ProductForm::default(),
            selected_title: String::new(),
            message: None,
            error_message: None,
        }
    }

    pub async fn load_products(&mut self) -> Result<(), AppError> {
        match self.service.list_all(&ListingParams::default()).await {
            Ok(products) => {
                self.products = products;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Błąd ładowania produktów w panelu: {:?}", e);
                self.products.clear();
                self.error_message = Some("Impossible de charger les produits.".to_string());
                Err(e)
            }
        }
    }

    /// Podpowiedzi tytułów dla pola autouzupełniania.
    pub fn filter_titles(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .map(|p| p.title.clone())
            .filter(|title| title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn select(&mut self, title: &str) {
        self.selected_title = title.to_string();
    }

    fn selected_product(&self) -> Option<&Product> {
        self.products.iter().find(|p| p.title == self.selected_title)
    }

    pub fn selected_sku(&self) -> String {
        self.selected_product()
            .and_then(|p| p.variations.first())
            .map(|v| v.sku.clone())
            .filter(|sku| !sku.is_empty())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Zapis nowego produktu: JSON, albo multipart gdy dołączono obrazek.
    pub async fn save(&mut self) -> Result<Product, AppError> {
        self.message = None;
        if let Err(e) = self.form.validate() {
            self.error_message = Some(e.user_message());
            return Err(e);
        }

        let draft = self.form.draft();
        let result = match self.form.image.clone() {
            Some(image) => self.service.create_with_image(&draft, image).await,
            None => self.service.create(&draft).await,
        };

        match result {
            Ok(product) => {
                self.message = Some("Produit enregistré avec succès !".to_string());
                self.error_message = None;
                self.form = ProductForm::default();
                self.reload().await;
                Ok(product)
            }
            Err(e) => {
                tracing::error!("Błąd zapisu produktu: {:?}", e);
                self.error_message = Some("Erreur lors de l'enregistrement du produit.".to_string());
                Err(e)
            }
        }
    }

    pub async fn update(&mut self, id: &str, partial: bool) -> Result<Product, AppError> {
        if let Err(e) = self.form.validate() {
            self.error_message = Some(e.user_message());
            return Err(e);
        }
        let draft = self.form.draft();
        match self.service.update(id, &draft, partial).await {
            Ok(product) => {
                self.message = Some("Produit mis à jour.".to_string());
                self.error_message = None;
                self.reload().await;
                Ok(product)
            }
            Err(e) => {
                self.error_message = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Usuwa produkt wybrany po tytule i przeładowuje listę.
    pub async fn delete_selected(&mut self) -> Result<(), AppError> {
        let Some(id) = self.selected_product().map(|p| p.id.clone()) else {
            let e = AppError::Validation(
                "Veuillez sélectionner un produit valide à supprimer.".to_string(),
            );
            self.error_message = Some(e.user_message());
            return Err(e);
        };

        match self.service.delete(&id).await {
            Ok(()) => {
                self.message = Some("Produit supprimé avec succès !".to_string());
                self.error_message = None;
                self.selected_title.clear();
                self.reload().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Błąd usuwania produktu {}: {:?}", id, e);
                self.error_message = Some("Erreur lors de la suppression du produit.".to_string());
                Err(e)
            }
        }
    }

    async fn reload(&mut self) {
        // błąd przeładowania zostaje w error_message
        let _ = self.load_products().await;
    }
}
