// src/pagination.rs
use serde::Deserialize;

/// Strona wyników w formacie `PageNumberPagination` z Django REST.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Liczba stron wyliczona z `count` i rozmiaru bieżącej strony.
    pub fn total_pages(&self, page_size: usize) -> u64 {
        if page_size == 0 || self.count == 0 {
            return if self.results.is_empty() { 0 } else { 1 };
        }
        self.count.div_ceil(page_size as u64)
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
