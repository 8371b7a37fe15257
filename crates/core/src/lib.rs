//! Driftwood Core - Shared types library.
//!
//! This crate provides common types used across all Driftwood components:
//! - `tracking` - Order lifecycle tracking and guest migration
//! - `cli` - Command-line tools for checkout, tracking, and migration
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ID wrappers and the order status model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
