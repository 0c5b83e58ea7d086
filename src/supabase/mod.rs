pub mod client;
pub mod models;
pub mod query;

pub use client::{ApiResponse, Prefer, SupabaseClient};
pub use query::TableQuery;
