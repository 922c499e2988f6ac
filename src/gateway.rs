// src/gateway.rs

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::AppError;
use crate::session::{LogoutReason, SessionStore};
use crate::state::ApiConfig;

/// Treść zapytania: JSON albo formularz multipart (upload obrazka).
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(multipart::Form),
}

/// Jedno miejsce, przez które przechodzą wszystkie wywołania backendu.
#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiGateway {
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self, AppError> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Buduje zapytanie z nagłówkami. Przy multipart nie ustawiamy
    /// `Content-Type`, reqwest dopisze go razem z `boundary`.
    fn build(&self, method: Method, path: &str, body: RequestBody) -> (RequestBuilder, bool) {
        let url = self.url(path);
        let mut builder = self.client.request(method.clone(), &url);

        let token = self.session.token();
        let authenticated = token.is_some();
        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => builder = builder.header(AUTHORIZATION, value),
                Err(e) => {
                    tracing::warn!("Token zawiera niedozwolone znaki, pomijam nagłówek: {}", e)
                }
            }
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(value.to_string()),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        tracing::debug!(
            "Zbudowano zapytanie {} {} (token: {})",
            method,
            url,
            authenticated
        );
        (builder, authenticated)
    }

    /// Wysyła zapytanie dokładnie raz. Błędy przechodzą przez `handle_error`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<Response, AppError> {
        let (builder, authenticated) = self.build(method.clone(), path, body);

        let response = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Błąd sieci podczas {} {}: {}", method, path, e);
                return Err(AppError::Network(e));
            }
        };

        if response.status().is_success() {
            return Ok(response);
        }

        Err(self.handle_error(&method, path, response, authenticated).await)
    }

    /// Loguje błąd, przy 401 kończy sesję i zwraca znormalizowany `AppError`.
    async fn handle_error(
        &self,
        method: &Method,
        path: &str,
        response: Response,
        authenticated: bool,
    ) -> AppError {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Brak treści błędu".to_string());
        let error = AppError::from_status(status, &error_text);

        if status.is_server_error() {
            tracing::error!(
                "Błąd API {} {}: Status={}, Treść={}",
                method,
                path,
                status,
                error_text
            );
        } else {
            tracing::warn!(
                "Odrzucone zapytanie {} {}: Status={}, Treść={}",
                method,
                path,
                status,
                error_text
            );
        }

        if error.is_unauthorized() && authenticated {
            tracing::warn!("Token wygasł, automatyczne wylogowanie...");
            self.session.clear(LogoutReason::Unauthorized).await;
        }

        error
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<T, AppError> {
        let response = self.send(method, path, body).await?;
        decode_json(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.send_json(Method::GET, path, RequestBody::Empty).await
    }

    /// GET z parametrami zakodowanymi przez `serde_qs`.
    pub async fn get_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, AppError>
    where
        Q: Serialize,
        T: DeserializeOwned,
    {
        let qs = serde_qs::to_string(query)?;
        let full_path = if qs.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, qs)
        };
        self.get_json(&full_path).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = serde_json::to_value(body)?;
        self.send_json(Method::POST, path, RequestBody::Json(value))
            .await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = serde_json::to_value(body)?;
        self.send_json(Method::PUT, path, RequestBody::Json(value))
            .await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = serde_json::to_value(body)?;
        self.send_json(Method::PATCH, path, RequestBody::Json(value))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        self.send(Method::DELETE, path, RequestBody::Empty).await?;
        Ok(())
    }

    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: multipart::Form,
    ) -> Result<T, AppError> {
        self.send_json(method, path, RequestBody::Multipart(form))
            .await
    }
}

/// Pusta odpowiedź (204 lub brak treści) jest traktowana jak JSON `null`.
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!("Błąd deserializacji odpowiedzi API: {}", e);
        AppError::Decode(e)
    })
}
