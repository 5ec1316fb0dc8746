//! Data models for the application
//!
//! Wire shapes exchanged with the conversion service. Field names are
//! camelCase on the wire.

mod account;
mod job;

// Re-export all models for convenient imports
pub use account::*;
pub use job::*;
