//! Shared foundational types for the Silica HDL midend.
//!
//! This crate provides interned identifiers and the internal-error types
//! used across all Silica crates.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, SilicaResult};
