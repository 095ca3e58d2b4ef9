//! Shared primitives for the strucdev structural analysis crates.
//!
//! - **Error types**: [`StrucdevError`] and [`Result`] for structured error handling
//! - **Traits**: [`Annotated`] and [`Summarizable`], implemented by structures and point sets

pub mod error;
pub mod traits;

pub use error::{Result, StrucdevError};
pub use traits::*;
