//! # Contracts
//!
//! Frozen interface contracts, defining the data structures and traits
//! shared by the dispatcher and the fetch runner.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Level Model
//! - `Severity` is totally ordered; thresholds are inclusive (`>=`)
//! - The root logger is the entry named `""`

mod error;
mod fetch;
mod record;
mod severity;
mod sink;
mod spec;

pub use error::*;
pub use fetch::*;
pub use record::*;
pub use severity::Severity;
pub use sink::*;
pub use spec::*;
