//! Command implementations.

mod run;
mod validate;

pub use run::run_flight;
pub use validate::run_validate;
