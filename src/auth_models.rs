// src/auth_models.rs
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::Profile;

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "Format d'adresse email invalide"))]
    pub email: String,

    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "passwords_match", skip_on_field_errors = false))]
pub struct RegistrationPayload {
    #[validate(email(message = "Format d'adresse email invalide"))]
    pub email: String,

    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: String,

    #[serde(skip_serializing)]
    pub confirm_password: String,
}

fn passwords_match(payload: &RegistrationPayload) -> Result<(), ValidationError> {
    if payload.password != payload.confirm_password {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("Les mots de passe ne correspondent pas.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginPayload {
    pub token: String,
}

/// Odpowiedź `POST /login/` i `POST /auth/google/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<Profile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Claimy tokenu dostępowego (simplejwt), czytane tylko po to, by znać `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}
