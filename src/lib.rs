//! svc-info - Storage System Information Gatherer
//!
//! Collects an inventory snapshot from an IBM Spectrum Virtualize storage
//! system over its management REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         svc-info CLI                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────────┐  │
//! │  │  Configuration  │──▶│    Category     │──▶│   Result   │  │
//! │  │     Loader      │   │   Dispatcher    │   │  Reporter  │  │
//! │  └─────────────────┘   └────────┬────────┘   └────────────┘  │
//! │                                 │ ReadQuery                   │
//! │                        ┌────────┴────────┐                    │
//! │                        │   REST Client   │                    │
//! │                        │ (token session) │                    │
//! │                        └────────┬────────┘                    │
//! └─────────────────────────────────┼────────────────────────────┘
//!                                   │ HTTPS :7443/rest
//!                          ┌────────┴────────┐
//!                          │ Storage System  │
//!                          └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`client`]: Management REST API client
//! - [`config`]: Configuration loading and validation
//! - [`domain`]: Entity categories and the read-query port
//! - [`gather`]: Category dispatcher and report types
//! - [`error`]: Error types and handling

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod gather;

// Re-export commonly used types
pub use client::{SvcRestClient, SvcRestConfig, DEFAULT_REST_PORT};

pub use config::{GatherState, InfoConfig, RawConfig};

pub use domain::{Category, GatherSubset, ReadQuery, Record};

pub use error::{Error, Result};

pub use gather::{FailureOutput, InfoGatherer, InfoReport, SuccessOutput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
