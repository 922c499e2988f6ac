// src/auth.rs
pub use crate::auth_models::{
    GoogleLoginPayload, LoginPayload, MessageResponse, RegistrationPayload, TokenResponse,
};
use crate::errors::AppError;
use crate::gateway::ApiGateway;
use crate::models::Profile;
use crate::session::{LogoutReason, SessionStore};
use validator::Validate;

/// Logowanie, rejestracja i pobieranie profilu. Stan trzyma `SessionStore`.
#[derive(Clone)]
pub struct AuthService {
    gateway: ApiGateway,
    session: SessionStore,
}

impl AuthService {
    pub fn new(gateway: ApiGateway, session: SessionStore) -> Self {
        Self { gateway, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Logowanie email/hasło. Po sukcesie token i profil są ustawione.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, AppError> {
        let payload = LoginPayload {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        payload.validate()?;

        let response = match self
            .gateway
            .post_json::<_, TokenResponse>("/login/", &payload)
            .await
        {
            Ok(response) => response,
            Err(e @ (AppError::Network(_) | AppError::Forbidden(_))) => return Err(e),
            Err(e) => {
                tracing::warn!("Nieudane logowanie dla {}: {:?}", payload.email, e);
                return Err(AppError::InvalidLoginCredentials);
            }
        };

        self.accept_token(&response).await?;
        tracing::info!("Zalogowano użytkownika {}", payload.email);
        Ok(response)
    }

    /// Logowanie przez Google: wymiana tokenu ID Google na token dostępowy.
    pub async fn login_with_google(&self, id_token: &str) -> Result<TokenResponse, AppError> {
        if id_token.trim().is_empty() {
            tracing::error!("Pusty token Google");
            return Err(AppError::GoogleLoginFailed);
        }

        let payload = GoogleLoginPayload {
            token: id_token.to_string(),
        };
        let response = match self
            .gateway
            .post_json::<_, TokenResponse>("/auth/google/", &payload)
            .await
        {
            Ok(response) => response,
            Err(e @ AppError::Network(_)) => return Err(e),
            Err(e) => {
                tracing::warn!("Nieudane logowanie Google: {:?}", e);
                return Err(AppError::GoogleLoginFailed);
            }
        };

        if response.access.is_none() {
            return Err(AppError::GoogleLoginFailed);
        }
        self.accept_token(&response).await?;
        tracing::info!("Zalogowano przez Google");
        Ok(response)
    }

    pub async fn register(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<MessageResponse, AppError> {
        payload.validate()?;
        let response = self
            .gateway
            .post_json::<_, MessageResponse>("/register/", payload)
            .await?;
        tracing::info!("Zarejestrowano konto {}", payload.email);
        Ok(response)
    }

    async fn accept_token(&self, response: &TokenResponse) -> Result<(), AppError> {
        let Some(access) = response.access.clone() else {
            tracing::warn!("Odpowiedź logowania bez tokenu 'access'");
            return Err(AppError::InvalidLoginCredentials);
        };
        self.session.set_token(access).await?;
        self.fetch_and_store_user_info().await?;
        Ok(())
    }

    /// Pobiera `GET /profile/` i publikuje profil w sesji.
    /// 401 kończy sesję (obsługuje to gateway).
    pub async fn fetch_and_store_user_info(&self) -> Result<Option<Profile>, AppError> {
        if !self.session.is_authenticated() {
            tracing::warn!("Brak tokenu, użytkownik nie jest zalogowany");
            return Ok(None);
        }

        let profile: Profile = self.gateway.get_json("/profile/").await.map_err(|e| {
            tracing::error!("Błąd pobierania profilu: {:?}", e);
            e
        })?;

        if self.session.set_user(profile.clone()) {
            Ok(Some(profile))
        } else {
            Ok(None)
        }
    }

    /// Przywraca zapisaną sesję i dociąga profil.
    pub async fn restore(&self) -> Result<Option<Profile>, AppError> {
        if self.session.restore().await?.is_none() {
            return Ok(None);
        }
        self.fetch_and_store_user_info().await
    }

    pub async fn logout(&self) {
        self.session.clear(LogoutReason::UserRequested).await;
    }
}

/// Stan formularza logowania.
#[derive(Debug, Default)]
pub struct LoginView {
    pub error_message: Option<String>,
}

impl LoginView {
    /// Zwraca trasę, na którą należy przejść po udanym logowaniu.
    pub async fn submit(
        &mut self,
        auth: &AuthService,
        email: &str,
        password: &str,
    ) -> Option<&'static str> {
        self.error_message = None;
        match auth.login(email, password).await {
            Ok(_) => Some(redirect_for(auth.session().user().as_ref())),
            Err(e) => {
                self.error_message = Some(e.user_message());
                None
            }
        }
    }

    pub async fn submit_google(&mut self, auth: &AuthService, id_token: &str) -> Option<&'static str> {
        self.error_message = None;
        match auth.login_with_google(id_token).await {
            Ok(_) => Some(redirect_for(auth.session().user().as_ref())),
            Err(e) => {
                self.error_message = Some(e.user_message());
                None
            }
        }
    }
}

pub fn redirect_for(user: Option<&Profile>) -> &'static str {
    match user {
        Some(user) if user.is_admin => "/admin",
        _ => "/home",
    }
}

/// Stan formularza rejestracji.
#[derive(Debug, Default)]
pub struct RegisterView {
    pub error_message: Option<String>,
}

impl RegisterView {
    pub async fn submit(
        &mut self,
        auth: &AuthService,
        payload: &RegistrationPayload,
    ) -> Option<&'static str> {
        self.error_message = None;
        match auth.register(payload).await {
            Ok(_) => Some("/login"),
            // Błędy formularza i odpowiedzi 4xx backendu mają czytelny komunikat.
            Err(e @ (AppError::ValidationError(_) | AppError::Validation(_))) => {
                self.error_message = Some(e.user_message());
                None
            }
            Err(e) => {
                tracing::error!("Błąd rejestracji: {:?}", e);
                self.error_message = Some("L'inscription a échoué.".to_string());
                None
            }
        }
    }
}
