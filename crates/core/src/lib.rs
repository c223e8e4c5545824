//! Shopfront Core - Shared domain library.
//!
//! This crate provides the types and rules used across all Shopfront components:
//! - `storefront` - Public product catalog, cart and login
//! - `admin` - Product and user management panel
//! - `cli` - Mock REST API, token tooling and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no sessions. Both web apps and the mock API share it so list
//! filtering, pagination and validation behave identically everywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and emails, plus the API records
//! - [`cart`] - Cart lines and their storage format
//! - [`token`] - JWT-shaped pseudo-auth tokens
//! - [`pagination`] - Page requests, page arithmetic and `X-Total-Count` parsing
//! - [`search`] - Product and user filters
//! - [`validation`] - Form drafts and field errors
//! - [`sample`] - Bundled fallback catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod pagination;
pub mod sample;
pub mod search;
pub mod token;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartItem};
pub use pagination::{Page, PageRequest};
pub use sample::SampleData;
pub use search::ProductFilter;
pub use token::{AuthUser, DecodedToken, Identity, TokenError, TokenSigner};
pub use types::*;
pub use validation::{FieldError, FieldErrors};
