//! Core types for Shopfront.
//!
//! This module provides the plain records the REST API serves and the
//! type-safe wrappers they are built from.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, ProductPayload};
pub use user::{User, UserPayload};
