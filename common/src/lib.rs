//! Shared leaf types for the taskband workspace.
//!
//! This crate contains pure data structures used by every layer. It has no
//! business logic - just data that can be passed between crates.
//!
//! ## Architecture
//!
//! - **common** (this crate): Pure shared types
//! - **band-core**: Control-pipe logic operating on them
//! - **bandhost**: Reference host wiring everything together
//!
//! This layered architecture keeps concerns separated and makes testing easier.

pub mod error;

pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
