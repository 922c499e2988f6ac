// src/session.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tokio::sync::{broadcast, watch};

use crate::auth_models::AccessTokenClaims;
use crate::errors::AppError;
use crate::models::{Profile, Role};

const SESSION_EVENTS_CAPACITY: usize = 16;

/// Miejsce przechowywania tokenu między uruchomieniami aplikacji.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn load(&self) -> Result<Option<String>, AppError>;
    async fn save(&self, token: &str) -> Result<(), AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}

pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> Result<Option<String>, AppError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(e)),
        }
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        tokio::fs::write(&self.path, token).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(e)),
        }
    }
}

#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.token.lock().map(|t| t.clone()).unwrap_or(None)
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.stored())
    }

    async fn save(&self, token: &str) -> Result<(), AppError> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.to_string());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    UserRequested,
    Unauthorized,
    TokenExpired,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LoggedIn,
    ProfileLoaded(Profile),
    LoggedOut { reason: LogoutReason },
}

/// Stan sesji: token i profil użytkownika, obserwowalne przez `watch`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    token: watch::Sender<Option<String>>,
    user: watch::Sender<Option<Profile>>,
    events: broadcast::Sender<SessionEvent>,
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let (token, _) = watch::channel(None);
        let (user, _) = watch::channel(None);
        let (events, _) = broadcast::channel(SESSION_EVENTS_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                token,
                user,
                events,
                storage,
            }),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner.token.borrow().clone()
    }

    pub fn user(&self) -> Option<Profile> {
        self.inner.user.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.token.borrow().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.inner
            .user
            .borrow()
            .as_ref()
            .is_some_and(|user| user.is_admin)
    }

    pub fn role(&self) -> Role {
        match self.inner.user.borrow().as_ref() {
            Some(user) if user.is_admin => Role::Admin,
            Some(_) => Role::User,
            None => Role::Guest,
        }
    }

    pub fn subscribe_token(&self) -> watch::Receiver<Option<String>> {
        self.inner.token.subscribe()
    }

    pub fn subscribe_user(&self) -> watch::Receiver<Option<Profile>> {
        self.inner.user.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Zapisuje i publikuje nowy token. Stary profil jest porzucany, bo może
    /// należeć do innego konta. Gdy zapis się nie powiedzie, sesja zostaje bez zmian.
    pub async fn set_token(&self, token: String) -> Result<(), AppError> {
        if let Err(e) = self.inner.storage.save(&token).await {
            tracing::error!("Nie udało się zapisać tokenu sesji: {:?}", e);
            return Err(e);
        }

        self.inner.user.send_replace(None);
        self.inner.token.send_replace(Some(token));
        let _ = self.inner.events.send(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Publikuje profil tylko wtedy, gdy istnieje token.
    pub fn set_user(&self, profile: Profile) -> bool {
        if self.inner.token.borrow().is_none() {
            tracing::warn!(
                "Odrzucono profil {} - brak tokenu w sesji",
                profile.email
            );
            return false;
        }
        self.inner.user.send_replace(Some(profile.clone()));
        let _ = self.inner.events.send(SessionEvent::ProfileLoaded(profile));
        true
    }

    /// Czyści token i profil. Zwraca `false`, jeśli sesja była już pusta,
    /// więc kolejne wywołania nie emitują ponownie `LoggedOut`.
    pub async fn clear(&self, reason: LogoutReason) -> bool {
        let had_user = self.inner.user.send_if_modified(|user| user.take().is_some());
        let had_token = self
            .inner
            .token
            .send_if_modified(|token| token.take().is_some());

        if !(had_token || had_user) {
            return false;
        }

        tracing::info!("Sesja wyczyszczona (powód: {:?})", reason);
        let _ = self.inner.events.send(SessionEvent::LoggedOut { reason });

        if let Err(e) = self.inner.storage.clear().await {
            tracing::warn!("Nie można usunąć zapisanego tokenu: {:?}", e);
        }
        true
    }

    /// Odczytuje zapisany token. Token z minionym `exp` jest usuwany.
    pub async fn restore(&self) -> Result<Option<String>, AppError> {
        let Some(token) = self.inner.storage.load().await? else {
            tracing::debug!("Brak zapisanego tokenu");
            return Ok(None);
        };

        if let Some(expires_at) = token_expiry(&token) {
            if expires_at <= Utc::now() {
                tracing::info!("Zapisany token wygasł {}, pomijam", expires_at);
                self.inner.storage.clear().await?;
                let _ = self.inner.events.send(SessionEvent::LoggedOut {
                    reason: LogoutReason::TokenExpired,
                });
                return Ok(None);
            }
        }

        self.inner.token.send_replace(Some(token.clone()));
        let _ = self.inner.events.send(SessionEvent::LoggedIn);
        Ok(Some(token))
    }
}

/// Czas wygaśnięcia z claimu `exp`. Podpis nie jest weryfikowany - robi to backend.
/// Tokeny, które nie są JWT, nie mają znanego terminu ważności.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = match decode::<AccessTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
    {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!("Token nie jest czytelnym JWT: {:?}", e);
            return None;
        }
    };
    let exp = data.claims.exp?;
    Utc.timestamp_opt(exp, 0).single()
}
