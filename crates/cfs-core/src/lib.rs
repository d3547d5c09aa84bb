#![deny(missing_docs)]
//! Configuration, parameter stamps and shared error types for
//! continual-learning hyperparameter sweeps.

pub mod config;
pub mod errors;
/// Canonical hashing helpers.
pub mod hash;
/// Canonical JSON and YAML serde helpers.
pub mod serde;
pub mod stamp;

pub use config::{Configuration, Prior, ReplayMode, Scenario};
pub use errors::{CfsError, ErrorInfo};
pub use hash::short_hash_string;
pub use stamp::{validate_stamp, ParamStamp, StampDeriver};
