// src/lib.rs
pub mod account;
pub mod admin;
pub mod auth;
pub mod auth_models;
pub mod cart;
pub mod catalog;
pub mod delivery;
pub mod errors;
pub mod filters;
pub mod gateway;
pub mod guard;
pub mod models;
pub mod pagination;
pub mod product_detail;
pub mod products;
pub mod search;
pub mod session;
pub mod state;

pub use errors::AppError;
pub use state::{ApiConfig, AppState};
