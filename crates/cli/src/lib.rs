//! Shopfront CLI library.
//!
//! Holds the in-memory mock REST API so integration tests can start it on
//! an ephemeral port without going through the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod mock_api;
