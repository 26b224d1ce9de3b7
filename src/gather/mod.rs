//! Information gathering
//!
//! The dispatcher that maps categories to commands, and the report it builds.

pub mod dispatcher;
pub mod report;

pub use dispatcher::*;
pub use report::*;
