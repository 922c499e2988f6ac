// src/main.rs
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nature_animaux_client::catalog::ProductListView;
use nature_animaux_client::{ApiConfig, AppError, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Inicjalizacja systemu logowania (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nature_animaux_client=debug,reqwest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Błąd klienta: {:?}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = ApiConfig::from_env()?;
    tracing::info!("Klient sklepu, API: {}", config.base_url);
    let state = AppState::new(config)?;

    match state.auth.restore().await {
        Ok(Some(profile)) => tracing::info!(
            "Przywrócono sesję {} (rola: {})",
            profile.email,
            state.session.role()
        ),
        Ok(None) => tracing::info!("Brak zapisanej sesji, tryb gościa"),
        Err(e) => tracing::warn!("Nie udało się przywrócić sesji: {:?}", e),
    }

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let catalog = ProductListView::new(state.products.clone());
    if query.trim().is_empty() {
        catalog.load(&Default::default()).await?;
    } else {
        catalog.search(&query).await?;
    }

    let snapshot = catalog.snapshot();
    tracing::info!(
        "Produkty: {} (kategorie: {})",
        snapshot.visible.len(),
        snapshot.categories.join(", ")
    );
    for product in &snapshot.visible {
        let price = nature_animaux_client::products::min_price(product)
            .map(|p| format!("dès {:.2} €", p))
            .unwrap_or_else(|| "prix indisponible".to_string());
        println!("{} | {} | {}", product.title, product.category, price);
    }

    if state.session.is_authenticated() {
        state.cart.get_cart().await?;
        tracing::info!("Sztuk w koszyku: {}", state.cart.count());
    }

    Ok(())
}
