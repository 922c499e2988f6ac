// src/filters.rs
use serde::Serialize;

use crate::models::Animal;

/// Parametry `GET /products/`. Puste pola nie trafiają do query stringa.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ListingParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal: Option<Animal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ListingParams {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page.max(1)),
            ..Default::default()
        }
    }

    pub fn with_animal(mut self, animal: Animal) -> Self {
        self.animal = Some(animal);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = if category.trim().is_empty() {
            None
        } else {
            Some(category)
        };
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        let brand = brand.into();
        self.brand = if brand.trim().is_empty() { None } else { Some(brand) };
        self
    }

    pub fn current_page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

/// Zaznaczone kategorie w filtrze listy produktów.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFilter {
    selected: Vec<String>,
}

impl CategoryFilter {
    pub fn toggle(&mut self, category: &str) {
        if let Some(pos) = self.selected.iter().position(|c| c == category) {
            self.selected.remove(pos);
        } else {
            self.selected.push(category.to_string());
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn accepts(&self, category: &str) -> bool {
        self.selected.is_empty() || self.selected.iter().any(|c| c == category)
    }
}
