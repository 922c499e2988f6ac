// src/catalog.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::errors::AppError;
use crate::filters::{CategoryFilter, ListingParams};
use crate::models::Product;
use crate::products::{self, ProductService};
use crate::search::{self, SearchResolution};

/// Numeruje zapytania; tylko odpowiedź na najnowsze może zostać opublikowana.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn next(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub visible: Vec<Product>,
    pub categories: Vec<String>,
    pub query: Option<String>,
}

struct CatalogInner {
    service: ProductService,
    sequencer: RequestSequencer,
    filter: std::sync::Mutex<CategoryFilter>,
    snapshot: watch::Sender<CatalogSnapshot>,
}

/// Logika strony listy produktów.
#[derive(Clone)]
pub struct ProductListView {
    inner: Arc<CatalogInner>,
}

impl ProductListView {
    pub fn new(service: ProductService) -> Self {
        let (snapshot, _) = watch::channel(CatalogSnapshot::default());
        Self {
            inner: Arc::new(CatalogInner {
                service,
                sequencer: RequestSequencer::default(),
                filter: std::sync::Mutex::new(CategoryFilter::default()),
                snapshot,
            }),
        }
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.inner.snapshot.subscribe()
    }

    pub fn selected_categories(&self) -> Vec<String> {
        self.with_filter(|filter| filter.selected().to_vec())
    }

    /// Ładuje katalog. Zwraca `false`, gdy w międzyczasie wystartowało nowsze zapytanie.
    pub async fn load(&self, params: &ListingParams) -> Result<bool, AppError> {
        let ticket = self.inner.sequencer.next();
        let Some(products) = self.fetch(ticket, params).await? else {
            return Ok(false);
        };
        Ok(self.publish(ticket, products, None))
    }

    /// Wyszukiwanie przez słownik synonimów; nieaktualne odpowiedzi są odrzucane.
    /// Hasło bez synonimu jest dopasowywane lokalnie do tytułu, marki i kategorii,
    /// bo backend filtruje `title` tylko dokładnie.
    pub async fn search(&self, query: &str) -> Result<bool, AppError> {
        let ticket = self.inner.sequencer.next();
        let params = match search::resolve(query) {
            SearchResolution::Filter(found) => {
                let params = ListingParams::default().with_category(found.category);
                match found.animal {
                    Some(animal) => params.with_animal(animal),
                    None => params,
                }
            }
            SearchResolution::All | SearchResolution::Text(_) => ListingParams::default(),
        };

        let Some(fetched) = self.fetch(ticket, &params).await? else {
            return Ok(false);
        };
        let matching = search::filter_products(&fetched, query);
        let query = Some(query.trim().to_string()).filter(|q| !q.is_empty());
        Ok(self.publish(ticket, matching, query))
    }

    // Błąd nieaktualnego zapytania jest traktowany jak nieaktualna odpowiedź.
    async fn fetch(&self, ticket: u64, params: &ListingParams) -> Result<Option<Vec<Product>>, AppError> {
        match self.inner.service.list_all(params).await {
            Ok(products) => Ok(Some(products)),
            Err(e) if !self.inner.sequencer.is_latest(ticket) => {
                tracing::debug!("Pominięto błąd nieaktualnego zapytania (#{}): {:?}", ticket, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn toggle_category(&self, category: &str) {
        self.with_filter(|filter| filter.toggle(category));
        self.apply_filters();
    }

    pub fn apply_filters(&self) {
        let filter = self.with_filter(|filter| filter.clone());
        self.inner.snapshot.send_modify(|snapshot| {
            snapshot.visible = snapshot
                .products
                .iter()
                .filter(|p| filter.accepts(&p.category))
                .cloned()
                .collect();
        });
    }

    fn publish(&self, ticket: u64, products: Vec<Product>, query: Option<String>) -> bool {
        if !self.inner.sequencer.is_latest(ticket) {
            tracing::debug!("Odrzucono nieaktualną odpowiedź katalogu (#{})", ticket);
            return false;
        }
        let categories = products::categories(&products);
        self.inner.snapshot.send_modify(|snapshot| {
            snapshot.products = products;
            snapshot.categories = categories;
            snapshot.query = query;
        });
        self.apply_filters();
        true
    }

    fn with_filter<R>(&self, f: impl FnOnce(&mut CategoryFilter) -> R) -> R {
        let mut guard = match self.inner.filter.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut *guard)
    }
}
