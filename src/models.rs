// src/models.rs
use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Zwierzęta z menu nawigacji sklepu. Wartość `Display`/`FromStr` to klucz
/// używany w URL-ach i w polu `animal` produktu.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Animal {
    Chien,
    Chat,
    Oiseau,
    Rongeur,
    Bassecour,
    Derives,
}

impl Animal {
    pub fn label(&self) -> &'static str {
        match self {
            Animal::Chien => "Chien",
            Animal::Chat => "Chat",
            Animal::Oiseau => "Oiseau",
            Animal::Rongeur => "Rongeur, Lapin, Furet",
            Animal::Bassecour => "Basse cour",
            Animal::Derives => "Jardins aquatiques",
        }
    }

    /// Pozycje menu nawigacji w kolejności wyświetlania.
    pub fn menu() -> Vec<(Animal, &'static str)> {
        Animal::iter().map(|animal| (animal, animal.label())).collect()
    }
}

/// Nazwy kategorii produktów, wspólne dla wyszukiwarki i panelu administracyjnego.
pub mod category {
    pub const DRY_FOOD: &str = "Alimentation sèche";
    pub const WET_FOOD: &str = "Alimentation humide";
    pub const TREATS: &str = "Friandises";
    pub const TOYS: &str = "Jouets";
    pub const CARE: &str = "Hygiènes & soins";
    pub const ACCESSORIES: &str = "Accessoires";
    pub const SEEDS: &str = "Graines";
    pub const CAGES: &str = "Cages";
    pub const PERCHES: &str = "Perchoirs";
    pub const HAY: &str = "Foin";
    pub const LAYERS: &str = "Pondeuses";
}

/// Identyfikatory z backendu bywają liczbami (SQL) albo napisami (ObjectId z MongoDB).
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => Some(s),
        Some(RawId::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

/// Liczby dziesiętne z DRF przychodzą jako napisy ("12.90").
fn decimal_from_string_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_decimal(deserializer)?.unwrap_or(0.0))
}

fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDecimal {
        Number(f64),
        Text(String),
    }

    match Option::<RawDecimal>::deserialize(deserializer)? {
        Some(RawDecimal::Number(n)) => Ok(Some(n)),
        Some(RawDecimal::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawDecimal::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Variation {
    #[serde(default, deserialize_with = "optional_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub sku: String,
    #[serde(default, deserialize_with = "optional_decimal")]
    pub price: Option<f64>,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub stock: i64,
}

impl Variation {
    /// Waga w kilogramach odczytana z etykiety typu "2.5kg" lub "2,5 kg".
    pub fn weight_kg(&self) -> Option<f64> {
        let cleaned = self
            .weight
            .trim()
            .trim_end_matches(|c: char| c.is_alphabetic() || c.is_whitespace())
            .replace(',', ".");
        cleaned.parse::<f64>().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Product {
    #[serde(alias = "_id", deserialize_with = "id_from_string_or_number", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "imageUrl")]
    pub image_url: String,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, alias = "savedCards", skip_serializing_if = "Vec::is_empty")]
    pub saved_cards: Vec<SavedCard>,
}

/// Zapisana karta; pełny numer nigdy nie wraca z backendu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedCard {
    pub last4: String,
    #[serde(alias = "cardName")]
    pub card_name: String,
    #[serde(alias = "cardExpiry")]
    pub card_expiry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Guest,
    User,
    Admin,
}

// --- STRUKTURY KOSZYKA ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: i64,
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub product_id: String,
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub variant_id: String,
    #[serde(default)]
    pub product_title: String,
    #[serde(deserialize_with = "decimal_from_string_or_number")]
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(deserialize_with = "decimal_from_string_or_number")]
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "optional_decimal", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default, deserialize_with = "decimal_from_string_or_number")]
    pub subtotal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<String>,
    #[serde(default, deserialize_with = "optional_decimal", skip_serializing_if = "Option::is_none")]
    pub delivery_price: Option<f64>,
}

impl Cart {
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn total_weight(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.weight.unwrap_or(0.0) * f64::from(item.quantity))
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AddItemPayload {
    pub product_id: String,
    pub variant_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Odpowiedź na dodanie pozycji i na zmianę ilości.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CartItemMutation {
    pub id: i64,
    #[serde(deserialize_with = "decimal_from_string_or_number")]
    pub total_price: f64,
}

// --- DOSTAWA ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryOption {
    pub mode: String,
    pub label: String,
    #[serde(deserialize_with = "decimal_from_string_or_number")]
    pub fees: f64,
}
