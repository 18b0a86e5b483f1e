//! PostgreSQL storage module for scraped race data
//!
//! Provides idempotent persistence of assembled races: venues, horses,
//! riders and trainers are shared entities enriched over time.

pub mod repository;
pub mod schema;

pub use repository::Store;
pub use schema::{create_tables, SETUP_SQL};
