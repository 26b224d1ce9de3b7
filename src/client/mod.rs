//! Management REST API client
//!
//! Token-authenticated client for the storage system's `/rest` endpoint.

pub mod rest;

pub use rest::*;
