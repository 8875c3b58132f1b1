//! Repository layer — entity-scoped database operations.
//!
//! Free functions over `&Connection`, split into one sub-module per table.
//! All public functions are re-exported here.

mod appointment;
mod patient;
mod program;
mod staff;

pub use appointment::*;
pub use patient::*;
pub use program::*;
pub use staff::*;
