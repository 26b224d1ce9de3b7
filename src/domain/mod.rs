//! Domain layer - Core types and port definitions
//!
//! This module defines the entity categories the gatherer understands
//! and the port the REST client implements.

pub mod category;
pub mod ports;

pub use category::*;
pub use ports::*;
