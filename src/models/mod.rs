pub mod appointment;
pub mod enums;
pub mod filters;
pub mod patient;
pub mod program;
pub mod staff;

pub use appointment::*;
pub use enums::*;
pub use filters::*;
pub use patient::*;
pub use program::*;
pub use staff::*;
