// src/errors.rs

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Błąd sieci: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Sesja wygasła lub brak autoryzacji")]
    Unauthorized,

    #[error("Brak uprawnień: {0}")]
    Forbidden(String),

    #[error("Nie znaleziono zasobu")]
    NotFound,

    #[error("Błędy walidacji")]
    ValidationError(#[from] ValidationErrors),

    #[error("Nieprawidłowe dane: {0}")]
    Validation(String),

    #[error("Błąd serwera ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Nieprawidłowe dane logowania")]
    InvalidLoginCredentials,

    #[error("Logowanie Google nie powiodło się")]
    GoogleLoginFailed,

    #[error("Błąd zapisu sesji: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Nieoczekiwana odpowiedź API: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Błąd budowania zapytania: {0}")]
    Query(#[from] serde_qs::Error),

    #[error("Błąd konfiguracji: {0}")]
    Config(String),
}

/// Treść błędu zwracana przez backend. Django REST zwraca różne kształty:
/// `{"error": ...}`, `{"message": ...}`, `{"detail": ...}` albo `{"errors": {...}}`.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

impl ApiErrorBody {
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// Pierwszy czytelny komunikat z odpowiedzi.
    pub fn best_message(&self) -> Option<String> {
        if let Some(m) = self
            .error
            .as_ref()
            .or(self.message.as_ref())
            .or(self.detail.as_ref())
        {
            return Some(m.clone());
        }

        // {"errors": {"email": ["..."]}} -> "email: ..."
        let errors = self.errors.as_ref()?.as_object()?;
        let mut parts = Vec::new();
        for (field, value) in errors {
            match value {
                serde_json::Value::Array(items) => {
                    for item in items.iter().filter_map(|i| i.as_str()) {
                        parts.push(format!("{}: {}", field, item));
                    }
                }
                serde_json::Value::String(s) => parts.push(format!("{}: {}", field, s)),
                _ => {}
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

impl AppError {
    /// Mapuje odpowiedź HTTP z kodem błędu na wariant `AppError`.
    pub fn from_status(status: StatusCode, raw_body: &str) -> Self {
        let message = ApiErrorBody::parse(raw_body)
            .best_message()
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Erreur").to_string());

        match status {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized,
            StatusCode::FORBIDDEN => AppError::Forbidden(message),
            StatusCode::NOT_FOUND => AppError::NotFound,
            s if s.is_client_error() => AppError::Validation(message),
            s => AppError::Server {
                status: s.as_u16(),
                message,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }

    /// Komunikat do wyświetlenia użytkownikowi sklepu (po francusku).
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => {
                "Impossible de contacter le serveur. Vérifiez votre connexion.".to_string()
            }
            AppError::Unauthorized => {
                "Votre session a expiré. Veuillez vous reconnecter.".to_string()
            }
            AppError::Forbidden(message) if !message.trim().is_empty() => message.clone(),
            AppError::Forbidden(_) => "Accès refusé.".to_string(),
            AppError::NotFound => "Ressource introuvable.".to_string(),
            AppError::ValidationError(errors) => {
                let mut messages = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        let msg = error.message.as_ref().map_or_else(
                            || format!("Le champ '{}' est invalide", field),
                            |m| m.to_string(),
                        );
                        messages.push(msg);
                    }
                }
                messages.sort();
                messages.join(" ")
            }
            AppError::Validation(message) => message.clone(),
            AppError::Server { .. } => {
                "Une erreur est survenue. Veuillez réessayer plus tard.".to_string()
            }
            AppError::InvalidLoginCredentials => {
                "Échec de connexion. Vérifiez vos identifiants.".to_string()
            }
            AppError::GoogleLoginFailed => "Échec de connexion avec Google.".to_string(),
            AppError::Storage(_) | AppError::Decode(_) | AppError::Query(_) | AppError::Config(_) => {
                "Une erreur interne est survenue.".to_string()
            }
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("Nieprawidłowy adres URL: {}", err))
    }
}
