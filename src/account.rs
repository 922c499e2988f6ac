// src/account.rs
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::auth::MessageResponse;
use crate::errors::AppError;
use crate::gateway::ApiGateway;
use crate::models::{Profile, SavedCard};
use crate::session::SessionStore;

fn french_postal_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 5 && code.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }
    let mut err = ValidationError::new("postal_code");
    err.message = Some("Le code postal doit contenir 5 chiffres.".into());
    Err(err)
}

fn phone_number(phone: &str) -> Result<(), ValidationError> {
    let digits: String = phone.chars().filter(|c| !c.is_whitespace() && *c != '.').collect();
    let national = digits.strip_prefix("+33").map(|rest| format!("0{}", rest));
    let national = national.as_deref().unwrap_or(&digits);
    if national.len() == 10 && national.starts_with('0') && national.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }
    let mut err = ValidationError::new("phone");
    err.message = Some("Numéro de téléphone invalide.".into());
    Err(err)
}

fn digits_only(value: &str, lengths: std::ops::RangeInclusive<usize>) -> bool {
    lengths.contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

fn card_number(number: &str) -> Result<(), ValidationError> {
    if digits_only(number, 16..=16) {
        return Ok(());
    }
    let mut err = ValidationError::new("card_number");
    err.message = Some("Le numéro de carte doit contenir 16 chiffres.".into());
    Err(err)
}

// MM/AA, mois 01-12
fn card_expiry(expiry: &str) -> Result<(), ValidationError> {
    let valid = match expiry.split_once('/') {
        Some((month, year)) => {
            digits_only(month, 2..=2)
                && digits_only(year, 2..=2)
                && matches!(month.parse::<u8>(), Ok(1..=12))
        }
        None => false,
    };
    if valid {
        return Ok(());
    }
    let mut err = ValidationError::new("card_expiry");
    err.message = Some("La date d'expiration doit être au format MM/AA.".into());
    Err(err)
}

fn card_cvv(cvv: &str) -> Result<(), ValidationError> {
    if digits_only(cvv, 3..=4) {
        return Ok(());
    }
    let mut err = ValidationError::new("card_cvv");
    err.message = Some("Le cryptogramme doit contenir 3 ou 4 chiffres.".into());
    Err(err)
}

fn new_passwords_match(form: &PasswordChangeForm) -> Result<(), ValidationError> {
    if form.new_password != form.confirm_password {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("Les mots de passe ne correspondent pas.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 150, message = "Le prénom est requis (150 caractères max)."))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150, message = "Le nom est requis (150 caractères max)."))]
    pub last_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "phone_number"))]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl From<&Profile> for ProfileForm {
    fn from(profile: &Profile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: profile.phone.clone(),
            company: profile.company.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct AddressForm {
    #[validate(length(min = 3, message = "L'adresse est trop courte."))]
    pub street: String,

    #[validate(custom(function = "french_postal_code"))]
    pub postal_code: String,

    #[validate(length(min = 1, message = "La ville est requise."))]
    pub city: String,

    pub country: String,
}

impl Default for AddressForm {
    fn default() -> Self {
        Self {
            street: String::new(),
            postal_code: String::new(),
            city: String::new(),
            country: "France".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct AddressUpdate<'a> {
    address: &'a AddressForm,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
#[validate(schema(function = "new_passwords_match", skip_on_field_errors = false))]
pub struct PasswordChangeForm {
    #[validate(length(min = 1, message = "Le mot de passe actuel est requis."))]
    pub current_password: String,

    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub new_password: String,

    #[serde(skip_serializing)]
    pub confirm_password: String,
}

/// Formularz karty płatniczej. Pola idą do backendu w formacie formularza konta.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    #[validate(custom(function = "card_number"))]
    pub card_number: String,

    #[validate(length(min = 1, message = "Le nom du titulaire est requis."))]
    pub card_name: String,

    #[validate(custom(function = "card_expiry"))]
    pub card_expiry: String,

    #[serde(rename = "cardCVV")]
    #[validate(custom(function = "card_cvv"))]
    pub card_cvv: String,
}

impl PaymentForm {
    /// Widok karty po zapisie: tylko cztery ostatnie cyfry.
    pub fn to_saved_card(&self) -> SavedCard {
        let start = self.card_number.len().saturating_sub(4);
        SavedCard {
            last4: self.card_number.get(start..).unwrap_or_default().to_string(),
            card_name: self.card_name.trim().to_string(),
            card_expiry: self.card_expiry.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
struct EmailChangeRequest {
    #[validate(email(message = "Format d'adresse email invalide"))]
    new_email: String,
}

/// Odpowiedź `PATCH /profile/update/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<Profile>,
}

#[derive(Clone)]
pub struct AccountService {
    gateway: ApiGateway,
    session: SessionStore,
}

impl AccountService {
    pub fn new(gateway: ApiGateway, session: SessionStore) -> Self {
        Self { gateway, session }
    }

    pub async fn load_profile(&self) -> Result<Profile, AppError> {
        let profile: Profile = self.gateway.get_json("/profile/").await?;
        self.session.set_user(profile.clone());
        Ok(profile)
    }

    /// Częściowa aktualizacja profilu; zwrócony profil trafia do sesji.
    pub async fn update_profile<F>(&self, form: &F) -> Result<ProfileUpdateResponse, AppError>
    where
        F: Validate + Serialize,
    {
        form.validate()?;
        let response: ProfileUpdateResponse =
            self.gateway.patch_json("/profile/update/", form).await?;
        if let Some(user) = &response.user {
            self.session.set_user(user.clone());
        }
        tracing::info!("Zaktualizowano profil użytkownika");
        Ok(response)
    }

    pub async fn update_address(&self, form: &AddressForm) -> Result<ProfileUpdateResponse, AppError> {
        form.validate()?;
        let response: ProfileUpdateResponse = self
            .gateway
            .patch_json("/profile/update/", &AddressUpdate { address: form })
            .await?;
        tracing::info!("Zaktualizowano adres dostawy");
        Ok(response)
    }

    pub async fn change_password(&self, form: &PasswordChangeForm) -> Result<MessageResponse, AppError> {
        form.validate()?;
        let response: MessageResponse = self.gateway.put_json("/change-password/", form).await?;
        tracing::info!("Zmieniono hasło użytkownika");
        Ok(response)
    }

    /// Zapisuje kartę i zwraca jej skrócony opis do listy zapisanych kart.
    pub async fn save_payment(&self, form: &PaymentForm) -> Result<SavedCard, AppError> {
        form.validate()?;
        let _: MessageResponse = self.gateway.put_json("/update-payment/", form).await?;
        let card = form.to_saved_card();
        tracing::info!("Zapisano kartę kończącą się na {}", card.last4);
        Ok(card)
    }

    pub async fn delete_card(&self, index: usize) -> Result<(), AppError> {
        self.gateway.delete(&format!("/delete-card/{}/", index)).await?;
        tracing::info!("Usunięto zapisaną kartę #{}", index);
        Ok(())
    }

    pub async fn request_email_change(&self, new_email: &str) -> Result<MessageResponse, AppError> {
        let request = EmailChangeRequest {
            new_email: new_email.trim().to_string(),
        };
        request.validate()?;
        let response: MessageResponse = self
            .gateway
            .post_json("/profile/email-change/", &request)
            .await?;
        tracing::info!("Wysłano prośbę o zmianę adresu email");
        Ok(response)
    }

    pub async fn confirm_email_change(&self, token: &str) -> Result<MessageResponse, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Validation("Aucun token fourni.".to_string()));
        }
        let path = format!("/confirm-email/{}/", urlencoding::encode(token));
        self.gateway.get_json(&path).await
    }
}

/// Zakładka płatności na stronie konta: lista zapisanych kart i formularz.
#[derive(Debug, Default)]
pub struct PaymentView {
    pub cards: Vec<SavedCard>,
    pub form: PaymentForm,
    pub message: Option<String>,
}

impl PaymentView {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            cards: profile.saved_cards.clone(),
            ..Default::default()
        }
    }

    pub async fn save(&mut self, account: &AccountService) -> Result<(), AppError> {
        let card = account.save_payment(&self.form).await?;
        self.cards.push(card);
        self.form = PaymentForm::default();
        self.message = Some("Paiement enregistré.".to_string());
        Ok(())
    }

    /// Wypełnia formularz danymi karty; numer i CVV trzeba podać ponownie.
    pub fn edit(&mut self, index: usize) {
        if let Some(card) = self.cards.get(index) {
            self.form = PaymentForm {
                card_name: card.card_name.clone(),
                card_expiry: card.card_expiry.clone(),
                ..Default::default()
            };
        }
    }

    pub async fn delete(&mut self, account: &AccountService, index: usize) -> Result<(), AppError> {
        if index >= self.cards.len() {
            return Err(AppError::Validation("Carte introuvable.".to_string()));
        }
        account.delete_card(index).await?;
        self.cards.remove(index);
        self.message = Some("Carte supprimée.".to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStatus {
    Pending,
    Success,
    Error,
}

/// Strona potwierdzenia zmiany adresu email (link z wiadomości).
#[derive(Debug)]
pub struct ConfirmEmailView {
    pub status: ConfirmStatus,
    pub message: String,
}

impl Default for ConfirmEmailView {
    fn default() -> Self {
        Self {
            status: ConfirmStatus::Pending,
            message: "Validation en cours...".to_string(),
        }
    }
}

impl ConfirmEmailView {
    pub async fn confirm(&mut self, account: &AccountService, token: Option<&str>) {
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            self.status = ConfirmStatus::Error;
            self.message = "Aucun token fourni.".to_string();
            return;
        };
        match account.confirm_email_change(token).await {
            Ok(response) => {
                self.status = ConfirmStatus::Success;
                self.message = response
                    .message
                    .unwrap_or_else(|| "Adresse email confirmée.".to_string());
            }
            Err(e) => {
                tracing::warn!("Nieudane potwierdzenie emaila: {:?}", e);
                self.status = ConfirmStatus::Error;
                self.message = "Lien invalide ou expiré".to_string();
            }
        }
    }
}
