//! Token primitives.

pub mod secret;
pub mod set;

pub use secret::*;
pub use set::*;
