//! Quiz gift service
//!
//! Campaigns hand out limited-stock gifts to quiz participants by score band
//! and weighted draw. [`sv::Award`] is the award engine; everything else
//! feeds it or exposes it.
//!
//! Architecture:
//! - SeaORM for database access (SQLite), schema in the `migration` crate
//! - Axum for the HTTP API with rate limiting
//! - Tokio for async runtime

pub mod draw;
pub mod entity;
pub mod error;
pub mod plugins;
pub mod prelude;
pub mod state;
pub mod sv;
