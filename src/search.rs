// src/search.rs
use once_cell::sync::Lazy;

use crate::models::category::{
    ACCESSORIES, CAGES, CARE, DRY_FOOD, HAY, LAYERS, PERCHES, SEEDS, TOYS, TREATS, WET_FOOD,
};
use crate::models::{Animal, Product};

/// Kanoniczny filtr, na który tłumaczone jest potoczne hasło.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynonymMatch {
    pub category: &'static str,
    pub animal: Option<Animal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResolution {
    Filter(SynonymMatch),
    Text(String),
    All,
}

struct SynonymEntry {
    keyword: String,
    target: SynonymMatch,
}

const fn syn(category: &'static str, animal: Option<Animal>) -> SynonymMatch {
    SynonymMatch { category, animal }
}

// Kolejność ma znaczenie: wygrywa pierwszy pasujący wpis,
// więc hasła z nazwą zwierzęcia stoją przed ogólnymi.
const SYNONYMS: &[(&str, SynonymMatch)] = &[
    ("croquettes chien", syn(DRY_FOOD, Some(Animal::Chien))),
    ("croquettes chiot", syn(DRY_FOOD, Some(Animal::Chien))),
    ("croquettes chat", syn(DRY_FOOD, Some(Animal::Chat))),
    ("croquettes chaton", syn(DRY_FOOD, Some(Animal::Chat))),
    ("pâtée chien", syn(WET_FOOD, Some(Animal::Chien))),
    ("patee chien", syn(WET_FOOD, Some(Animal::Chien))),
    ("pâtée chat", syn(WET_FOOD, Some(Animal::Chat))),
    ("patee chat", syn(WET_FOOD, Some(Animal::Chat))),
    ("friandises chien", syn(TREATS, Some(Animal::Chien))),
    ("friandises chat", syn(TREATS, Some(Animal::Chat))),
    ("jouet chien", syn(TOYS, Some(Animal::Chien))),
    ("jouet chat", syn(TOYS, Some(Animal::Chat))),
    ("litière", syn(CARE, Some(Animal::Chat))),
    ("litiere", syn(CARE, Some(Animal::Chat))),
    ("graines", syn(SEEDS, Some(Animal::Oiseau))),
    ("cage oiseau", syn(CAGES, Some(Animal::Oiseau))),
    ("perchoir", syn(PERCHES, Some(Animal::Oiseau))),
    ("foin", syn(HAY, Some(Animal::Rongeur))),
    ("pondeuse", syn(LAYERS, Some(Animal::Bassecour))),
    ("croquettes", syn(DRY_FOOD, None)),
    ("pâtée", syn(WET_FOOD, None)),
    ("patee", syn(WET_FOOD, None)),
    ("friandise", syn(TREATS, None)),
    ("shampoing", syn(CARE, None)),
    ("laisse", syn(ACCESSORIES, None)),
    ("collier", syn(ACCESSORIES, None)),
    ("jouet", syn(TOYS, None)),
];

static TABLE: Lazy<Vec<SynonymEntry>> = Lazy::new(|| {
    SYNONYMS
        .iter()
        .map(|(keyword, target)| SynonymEntry {
            keyword: normalize(keyword),
            target: *target,
        })
        .collect()
});

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Tłumaczy zapytanie na filtr kategorii/zwierzęcia albo zwykłe szukanie tekstu.
pub fn resolve(query: &str) -> SearchResolution {
    let needle = normalize(query);
    if needle.is_empty() {
        return SearchResolution::All;
    }

    match TABLE.iter().find(|entry| needle.contains(&entry.keyword)) {
        Some(entry) => {
            tracing::debug!(
                "Hasło '{}' dopasowane do '{}' -> {:?}",
                query,
                entry.keyword,
                entry.target
            );
            SearchResolution::Filter(entry.target)
        }
        None => SearchResolution::Text(needle),
    }
}

pub fn matches(product: &Product, resolution: &SearchResolution) -> bool {
    match resolution {
        SearchResolution::All => true,
        SearchResolution::Filter(target) => {
            let category_ok = product.category.trim().to_lowercase() == target.category.to_lowercase();
            let animal_ok = match target.animal {
                Some(animal) => product
                    .animal
                    .as_deref()
                    .is_some_and(|a| a.trim().eq_ignore_ascii_case(&animal.to_string())),
                None => true,
            };
            category_ok && animal_ok
        }
        SearchResolution::Text(needle) => [&product.title, &product.brand, &product.category]
            .iter()
            .any(|field| field.to_lowercase().contains(needle.as_str())),
    }
}

pub fn filter_products(products: &[Product], query: &str) -> Vec<Product> {
    let resolution = resolve(query);
    products
        .iter()
        .filter(|product| matches(product, &resolution))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(title: &str, brand: &str, category: &str, animal: Option<&str>) -> Product {
        Product {
            id: title.to_string(),
            title: title.to_string(),
            brand: brand.to_string(),
            category: category.to_string(),
            animal: animal.map(str::to_string),
            ..Default::default()
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("Ownat Adult", "Ownat", "Alimentation sèche", Some("chien")),
            product("Ownat Sterilized", "Ownat", "Alimentation sèche", Some("chat")),
            product("Winner Pâtée", "Winner", "Alimentation humide", Some("chien")),
            product("Balle rebond", "Authentics", "Jouets", Some("chien")),
        ]
    }

    #[test]
    fn resolves_dog_kibble() {
        assert_eq!(
            resolve("croquettes chien"),
            SearchResolution::Filter(SynonymMatch {
                category: "Alimentation sèche",
                animal: Some(Animal::Chien),
            })
        );
    }

    #[test]
    fn kibble_query_keeps_only_dog_dry_food() {
        let found = filter_products(&catalog(), "Croquettes   CHIEN");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Ownat Adult");
    }

    #[test]
    fn declaration_order_breaks_ties() {
        // "croquettes chat" i "croquettes" pasują, wygrywa wpis wcześniejszy
        assert_eq!(
            resolve("croquettes chat senior"),
            SearchResolution::Filter(SynonymMatch {
                category: "Alimentation sèche",
                animal: Some(Animal::Chat),
            })
        );
        assert_eq!(
            resolve("croquettes pour chien"),
            SearchResolution::Filter(SynonymMatch {
                category: "Alimentation sèche",
                animal: None,
            })
        );
    }

    #[test]
    fn falls_back_to_text_search() {
        let found = filter_products(&catalog(), "owNAT");
        assert_eq!(found.len(), 2);

        let found = filter_products(&catalog(), "authentics");
        assert_eq!(found[0].title, "Balle rebond");

        assert!(filter_products(&catalog(), "aquarium").is_empty());
    }

    #[test]
    fn every_admin_category_is_a_search_target() {
        for name in crate::admin::CATEGORIES {
            assert!(
                SYNONYMS.iter().any(|(_, target)| target.category == *name),
                "brak synonimu dla kategorii {}",
                name
            );
        }
    }

    #[test]
    fn category_match_ignores_case() {
        let care = product("Shampoing doux", "Ownat", "Hygiènes & Soins", Some("chien"));
        assert_eq!(filter_products(&[care], "shampoing").len(), 1);
    }

    #[test]
    fn empty_query_keeps_everything() {
        assert_eq!(resolve("   "), SearchResolution::All);
        assert_eq!(filter_products(&catalog(), "").len(), 4);
    }
}
