//! Command implementations.

mod dispatch;
mod fetch;
mod validate;

pub use dispatch::run_dispatch;
pub use fetch::run_fetch;
pub use validate::run_validate;
