// src/guard.rs
use crate::session::SessionStore;

pub const ADMIN_PREFIX: &str = "/admin";
pub const PUBLIC_FALLBACK_ROUTE: &str = "/home";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Strażnik tras administracyjnych. Decyzja zależy wyłącznie od bieżącego
/// stanu sesji i nie jest nigdzie zapamiętywana.
pub struct AdminGuard;

impl AdminGuard {
    pub fn is_admin_route(path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        path == ADMIN_PREFIX
            || path
                .strip_prefix(ADMIN_PREFIX)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn can_activate(session: &SessionStore, path: &str) -> GuardDecision {
        if !Self::is_admin_route(path) {
            return GuardDecision::Allow;
        }

        if session.is_admin() {
            GuardDecision::Allow
        } else {
            tracing::warn!(
                "Odmowa dostępu do {} - wymagane uprawnienia administratora",
                path
            );
            GuardDecision::Redirect(PUBLIC_FALLBACK_ROUTE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use crate::session::{LogoutReason, MemoryTokenStorage};
    use std::sync::Arc;

    async fn session_with(is_admin: Option<bool>) -> SessionStore {
        let session = SessionStore::new(Arc::new(MemoryTokenStorage::default()));
        if let Some(is_admin) = is_admin {
            session.set_token("tok".into()).await.unwrap();
            session.set_user(Profile {
                email: "x@example.fr".into(),
                first_name: String::new(),
                last_name: String::new(),
                is_admin,
                phone: None,
                company: None,
                saved_cards: Vec::new(),
            });
        }
        session
    }

    #[test]
    fn recognises_admin_routes() {
        assert!(AdminGuard::is_admin_route("/admin"));
        assert!(AdminGuard::is_admin_route("/admin/products"));
        assert!(AdminGuard::is_admin_route("/admin?tab=add"));
        assert!(!AdminGuard::is_admin_route("/administration-fees"));
        assert!(!AdminGuard::is_admin_route("/products"));
    }

    #[tokio::test]
    async fn blocks_guests_and_customers() {
        let guest = session_with(None).await;
        assert_eq!(
            AdminGuard::can_activate(&guest, "/admin"),
            GuardDecision::Redirect("/home")
        );

        let customer = session_with(Some(false)).await;
        assert_eq!(
            AdminGuard::can_activate(&customer, "/admin/products"),
            GuardDecision::Redirect("/home")
        );
        assert_eq!(
            AdminGuard::can_activate(&customer, "/cart"),
            GuardDecision::Allow
        );
    }

    #[tokio::test]
    async fn allows_admin_until_logout() {
        let admin = session_with(Some(true)).await;
        assert_eq!(AdminGuard::can_activate(&admin, "/admin"), GuardDecision::Allow);

        admin.clear(LogoutReason::UserRequested).await;
        assert_eq!(
            AdminGuard::can_activate(&admin, "/admin"),
            GuardDecision::Redirect("/home")
        );
    }
}
