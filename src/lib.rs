//! simrec-api: Top-N product recommendations over a precomputed
//! item-to-item similarity matrix.
//!
//! The matrix is produced offline, loaded read-only at startup, and served
//! through a thin HTTP adapter. The core is two operations: list the known
//! products, and return the N most similar products to a given one.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
