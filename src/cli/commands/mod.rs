//! Command implementations.

pub mod export;
pub mod import;
