//! Shopfront Core - Shared types library.
//!
//! This crate provides common types used across all Shopfront components:
//! - `client` - HTTP client, session store and domain services
//! - `cli` - Command-line access to the storefront and admin APIs
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails and roles
//! - [`api`] - Response envelopes and error bodies of the REST backend
//! - [`catalog`] - Catalog records and SKU facet derivation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod types;

pub use types::*;
