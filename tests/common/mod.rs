#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};
use serde_json::{Value, json};

use nature_animaux_client::session::MemoryTokenStorage;
use nature_animaux_client::{ApiConfig, AppState};

pub const VALID_TOKEN: &str = "valid-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const PASSWORD: &str = "secret1";
pub const TAKEN_EMAIL: &str = "marie@example.fr";
/// Listing tej kategorii odpowiada z opóźnieniem.
pub const SLOW_CATEGORY: &str = "Foin";
/// Listing tej kategorii odpowiada z opóźnieniem i kończy się błędem 500.
pub const FAILING_CATEGORY: &str = "Graines";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreatedProduct {
    pub content_type: String,
    pub parts: Vec<String>,
    pub title: String,
}

#[derive(Debug, Default)]
pub struct MockData {
    pub requests: Vec<Recorded>,
    pub products: Vec<Value>,
    pub cart_items: Vec<Value>,
    pub next_item_id: i64,
    pub created: Vec<CreatedProduct>,
    pub deleted: Vec<String>,
    pub delivery_choice: Option<Value>,
    pub profile_updates: Vec<Value>,
    pub saved_cards: Vec<Value>,
    pub password_changes: Vec<Value>,
}

pub type Shared = Arc<Mutex<MockData>>;

pub struct MockBackend {
    pub addr: SocketAddr,
    pub data: Shared,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn app_state(&self) -> AppState {
        let base_url = self.base_url();
        let config = ApiConfig::from_lookup(|key| match key {
            "API_BASE_URL" => Some(base_url.clone()),
            "HTTP_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        AppState::with_storage(config, Arc::new(MemoryTokenStorage::default())).unwrap()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.data
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

pub fn product(id: i64, title: &str, category: &str, animal: &str, price: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "category": category,
        "brand": "Ownat",
        "animal": animal,
        "description": "",
        "image_url": "",
        "variations": [
            {"id": id * 10, "sku": format!("SKU-{}", id), "price": price, "weight": "3kg", "stock": 5}
        ]
    })
}

pub fn default_products() -> Vec<Value> {
    vec![
        product(1, "Ownat Adult", "Alimentation sèche", "chien", "19.90"),
        product(2, "Ownat Sterilized", "Alimentation sèche", "chat", "21.50"),
        product(3, "Winner Pâtée", "Alimentation humide", "chien", "2.40"),
        product(4, "Balle rebond", "Jouets", "chien", "4.99"),
        product(5, "Os à mâcher", "Friandises", "chien", "3.20"),
    ]
}

pub async fn spawn() -> MockBackend {
    spawn_with(default_products()).await
}

pub async fn spawn_with(products: Vec<Value>) -> MockBackend {
    let data: Shared = Arc::new(Mutex::new(MockData {
        products,
        next_item_id: 1,
        ..Default::default()
    }));

    let app = Router::new()
        .route("/api/login/", post(login))
        .route("/api/register/", post(register))
        .route("/api/profile/", get(profile))
        .route("/api/profile/update/", patch(update_profile))
        .route("/api/profile/email-change/", post(request_email_change))
        .route("/api/confirm-email/{token}/", get(confirm_email))
        .route("/api/change-password/", put(change_password))
        .route("/api/update-payment/", put(update_payment))
        .route("/api/delete-card/{index}/", delete(delete_card))
        .route("/api/products/", get(list_products))
        .route("/api/products/product-create/", post(create_product))
        .route(
            "/api/products/product-delete/{id}/",
            delete(delete_product),
        )
        .route("/api/cart/", get(get_cart))
        .route("/api/cart/items/", post(add_item))
        .route(
            "/api/cart/items/{id}/",
            patch(update_item).delete(remove_item),
        )
        .route("/api/cart/delivery/", post(choose_delivery))
        .route("/api/delivery/options/", get(delivery_options))
        .layer(middleware::from_fn_with_state(data.clone(), record_and_authorize))
        .with_state(data.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { addr, data }
}

async fn record_and_authorize(State(data): State<Shared>, request: Request, next: Next) -> Response {
    let recorded = {
        let header_value = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Recorded {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
        }
    };
    let authorization = recorded.authorization.clone();
    data.lock().unwrap().requests.push(recorded);

    if let Some(auth) = authorization {
        let known = [format!("Bearer {}", VALID_TOKEN), format!("Bearer {}", ADMIN_TOKEN)];
        if !known.contains(&auth) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Given token not valid for any token type"})),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Identifiants invalides"})),
        )
            .into_response();
    }
    let token = if email.starts_with("admin") {
        ADMIN_TOKEN
    } else {
        VALID_TOKEN
    };
    Json(json!({"access": token, "refresh": "refresh-token", "message": "Connexion réussie"}))
        .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == TAKEN_EMAIL {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": {"email": ["Cet email est déjà utilisé."]}})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"status": "success", "message": "Inscription réussie"})),
    )
        .into_response()
}

async fn profile(State(data): State<Shared>, headers: axum::http::HeaderMap) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth.is_empty() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let is_admin = auth.ends_with(ADMIN_TOKEN);
    let email = if is_admin { "admin@nature-animaux.fr" } else { "marie@example.fr" };
    Json(json!({
        "email": email,
        "first_name": "Marie",
        "last_name": "Curie",
        "is_admin": is_admin,
        "savedCards": data.lock().unwrap().saved_cards.clone()
    }))
    .into_response()
}

async fn update_profile(State(data): State<Shared>, Json(body): Json<Value>) -> Response {
    data.lock().unwrap().profile_updates.push(body.clone());
    let mut user = json!({
        "email": "marie@example.fr",
        "first_name": "Marie",
        "last_name": "Curie",
        "is_admin": false
    });
    for key in ["first_name", "last_name", "phone", "company"] {
        if let Some(value) = body.get(key) {
            user[key] = value.clone();
        }
    }
    Json(json!({
        "status": "success",
        "message": "Profil mis à jour avec succès.",
        "user": user
    }))
    .into_response()
}

async fn request_email_change(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": format!("Un email de confirmation a été envoyé à {}", body["new_email"].as_str().unwrap_or_default())
    }))
}

async fn confirm_email(Path(token): Path<String>) -> Response {
    if token == "bon-jeton" {
        Json(json!({"message": "Adresse email mise à jour."})).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({"error": "Lien invalide"}))).into_response()
    }
}

async fn change_password(State(data): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["current_password"] != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Mot de passe actuel incorrect."})),
        )
            .into_response();
    }
    data.lock().unwrap().password_changes.push(body);
    Json(json!({"message": "Mot de passe mis à jour."})).into_response()
}

async fn update_payment(State(data): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let number = body["cardNumber"].as_str().unwrap_or_default();
    let last4 = number.get(number.len().saturating_sub(4)..).unwrap_or_default();
    data.lock().unwrap().saved_cards.push(json!({
        "last4": last4,
        "cardName": body["cardName"],
        "cardExpiry": body["cardExpiry"],
    }));
    Json(json!({"message": "Paiement enregistré."}))
}

async fn delete_card(State(data): State<Shared>, Path(index): Path<usize>) -> StatusCode {
    let mut data = data.lock().unwrap();
    if index >= data.saved_cards.len() {
        return StatusCode::NOT_FOUND;
    }
    data.saved_cards.remove(index);
    StatusCode::NO_CONTENT
}

const PAGE_SIZE: usize = 2;

async fn list_products(
    State(data): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let category = params.get("category").map(String::as_str);
    if category == Some(SLOW_CATEGORY) || category == Some(FAILING_CATEGORY) {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    if category == Some(FAILING_CATEGORY) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Erreur interne"})),
        )
            .into_response();
    }

    let products = data.lock().unwrap().products.clone();
    let field_matches = |product: &Value, key: &str, exact: bool| match params.get(key) {
        None => true,
        Some(wanted) => {
            let value = product[key].as_str().unwrap_or_default().to_lowercase();
            if exact {
                value == wanted.to_lowercase()
            } else {
                value.contains(&wanted.to_lowercase())
            }
        }
    };
    let filtered: Vec<Value> = products
        .into_iter()
        .filter(|p| {
            field_matches(p, "title", true)
                && field_matches(p, "category", true)
                && field_matches(p, "animal", true)
        })
        .collect();

    let page: usize = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let start = (page - 1) * PAGE_SIZE;
    let results: Vec<Value> = filtered.iter().skip(start).take(PAGE_SIZE).cloned().collect();
    let next = (start + PAGE_SIZE < filtered.len()).then(|| format!("/api/products/?page={}", page + 1));

    Json(json!({
        "count": filtered.len(),
        "next": next,
        "previous": null,
        "results": results
    }))
    .into_response()
}

async fn create_product(State(data): State<Shared>, request: Request) -> Response {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut created = CreatedProduct {
        content_type: content_type.clone(),
        ..Default::default()
    };

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = match Multipart::from_request(request, &()).await {
            Ok(m) => m,
            Err(e) => return e.into_response(),
        };
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap_or_default();
            if name == "data" {
                let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
                created.title = body["title"].as_str().unwrap_or_default().to_string();
            }
            created.parts.push(name);
        }
    } else {
        let Json(body) = match Json::<Value>::from_request(request, &()).await {
            Ok(json) => json,
            Err(e) => return e.into_response(),
        };
        created.title = body["title"].as_str().unwrap_or_default().to_string();
    }

    let title = created.title.clone();
    let mut data = data.lock().unwrap();
    data.created.push(created);
    let id = 100 + data.products.len() as i64;
    let new_product = product(id, &title, "Jouets", "chien", "9.90");
    data.products.push(new_product.clone());
    (StatusCode::CREATED, Json(new_product)).into_response()
}

async fn delete_product(State(data): State<Shared>, Path(id): Path<String>) -> StatusCode {
    let mut data = data.lock().unwrap();
    let before = data.products.len();
    data.products.retain(|p| p["id"].to_string() != id);
    if data.products.len() == before {
        return StatusCode::NOT_FOUND;
    }
    data.deleted.push(id);
    StatusCode::NO_CONTENT
}

fn cart_json(data: &MockData) -> Value {
    let subtotal: f64 = data
        .cart_items
        .iter()
        .map(|i| i["total_price"].as_f64().unwrap_or_default())
        .sum();
    json!({
        "id": 1,
        "items": data.cart_items,
        "subtotal": format!("{:.2}", subtotal),
        "delivery_method": data.delivery_choice.as_ref().map(|c| c["delivery_method"].clone()),
    })
}

async fn get_cart(State(data): State<Shared>) -> Json<Value> {
    Json(cart_json(&data.lock().unwrap()))
}

async fn add_item(State(data): State<Shared>, Json(body): Json<Value>) -> Response {
    let quantity = body["quantity"].as_u64().unwrap_or_default();
    let unit_price = body["unit_price"].as_f64().unwrap_or_default();
    if quantity == 0 {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "quantity"}))).into_response();
    }
    let mut data = data.lock().unwrap();
    let id = data.next_item_id;
    data.next_item_id += 1;
    let total = unit_price * quantity as f64;
    data.cart_items.push(json!({
        "id": id,
        "product_id": body["product_id"],
        "variant_id": body["variant_id"],
        "product_title": body["product_title"],
        "unit_price": unit_price,
        "quantity": quantity,
        "total_price": total,
        "weight": body["weight"],
    }));
    (StatusCode::CREATED, Json(json!({"id": id, "total_price": total}))).into_response()
}

async fn update_item(
    State(data): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let quantity = body["quantity"].as_u64().unwrap_or_default();
    let mut data = data.lock().unwrap();
    let Some(item) = data.cart_items.iter_mut().find(|i| i["id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let total = item["unit_price"].as_f64().unwrap_or_default() * quantity as f64;
    item["quantity"] = json!(quantity);
    item["total_price"] = json!(total);
    Json(json!({"id": id, "total_price": total})).into_response()
}

async fn remove_item(State(data): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    let mut data = data.lock().unwrap();
    data.cart_items.retain(|i| i["id"] != id);
    StatusCode::NO_CONTENT
}

async fn delivery_options(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let weight: f64 = params
        .get("weight")
        .and_then(|w| w.parse().ok())
        .unwrap_or_default();
    let home_fees = if weight > 5.0 { 12.5 } else { 8.5 };
    Json(json!({
        "weight": weight,
        "options": [
            {"mode": "relay", "label": "Mondial Relay", "fees": 4.9},
            {"mode": "home", "label": "Colissimo domicile", "fees": home_fees}
        ]
    }))
}

async fn choose_delivery(State(data): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["delivery_method"].is_null() || body["delivery_price"].is_null() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "delivery_method et delivery_price sont requis"})),
        )
            .into_response();
    }
    let mut data = data.lock().unwrap();
    data.delivery_choice = Some(body);
    Json(cart_json(&data)).into_response()
}
