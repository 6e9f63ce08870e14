//! Schema module - Configuration, layout and reporting types.

mod config;
mod evolution;
mod layout;

pub use config::*;
pub use evolution::*;
pub use layout::*;
