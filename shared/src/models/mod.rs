//! Data models
//!
//! Shared between loyalty-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod business;
pub mod client;
pub mod coupon;
pub mod visit;

// Re-exports
pub use business::*;
pub use client::*;
pub use coupon::*;
pub use visit::*;
