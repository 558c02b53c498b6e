//! Admin REST client for the order splitter.
//!
//! Implements the three outbound operations against a Shopify-style store:
//! - `GET /products/<id>/metafields.json` for shipping capacity
//! - `POST /orders.json` for child orders, sent exactly once
//! - `PUT /orders/<id>.json` for the completion tag

pub mod client;
pub mod config;
pub mod error;
mod wire;

pub use client::{ACCESS_TOKEN_HEADER, ShopClient};
pub use config::{ShopConfig, ShopConfigBuilder};
pub use error::ShopClientError;
