//! Shared primitives for the Margay alignment toolkit.
//!
//! `margay-core` provides the foundation the other Margay crates build on:
//!
//! - **Error types** — [`MargayError`] and [`Result`] for structured error handling
//! - **Log-space math** — [`prob::log_sum_exp`] and friends for underflow-free scoring
//! - **Random state** — [`Xorshift64`], the seeded generator the stochastic
//!   sampler draws from

pub mod error;
pub mod prob;
pub mod rand;

pub use error::{MargayError, Result};
pub use rand::Xorshift64;
