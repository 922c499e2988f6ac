// src/state.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::account::AccountService;
use crate::auth::AuthService;
use crate::cart::CartService;
use crate::delivery::DeliveryService;
use crate::errors::AppError;
use crate::gateway::ApiGateway;
use crate::products::ProductService;
use crate::session::{FileTokenStorage, SessionStore, TokenStorage};

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_SESSION_TOKEN_FILE: &str = ".nature_animaux_session";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub session_token_file: PathBuf,
    pub http_timeout: Duration,
    pub google_client_id: Option<String>,
}

impl ApiConfig {
    /// Czyta konfigurację ze zmiennych środowiskowych (po `dotenv()`).
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base_url =
            lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let base_url = Url::parse(raw_base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "API_BASE_URL '{}' nie może być adresem bazowym",
                raw_base_url
            )));
        }

        let session_token_file = lookup("SESSION_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_TOKEN_FILE));

        let http_timeout_secs = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config("HTTP_TIMEOUT_SECS musi być liczbą całkowitą".to_string())
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let google_client_id = lookup("GOOGLE_CLIENT_ID").filter(|id| !id.trim().is_empty());

        Ok(Self {
            base_url,
            session_token_file,
            http_timeout: Duration::from_secs(http_timeout_secs),
            google_client_id,
        })
    }
}

/// Jeden zestaw usług na instancję aplikacji. Klonowanie jest tanie,
/// wszystkie usługi dzielą tę samą sesję i ten sam licznik koszyka.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub session: SessionStore,
    pub gateway: ApiGateway,
    pub auth: AuthService,
    pub cart: CartService,
    pub products: ProductService,
    pub delivery: DeliveryService,
    pub account: AccountService,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let storage = Arc::new(FileTokenStorage::new(config.session_token_file.clone()));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(
        config: ApiConfig,
        storage: Arc<dyn TokenStorage>,
    ) -> Result<Self, AppError> {
        let session = SessionStore::new(storage);
        let gateway = ApiGateway::new(&config, session.clone())?;

        Ok(Self {
            auth: AuthService::new(gateway.clone(), session.clone()),
            cart: CartService::new(gateway.clone()),
            products: ProductService::new(gateway.clone()),
            delivery: DeliveryService::new(gateway.clone()),
            account: AccountService::new(gateway.clone(), session.clone()),
            config: Arc::new(config),
            session,
            gateway,
        })
    }
}
