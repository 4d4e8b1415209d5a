//! Session identity material, token sets and the pending authorization attempt.

pub mod pending;
pub mod token;

pub use pending::*;
pub use token::*;
