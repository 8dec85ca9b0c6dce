//! Various utilities
//!
//! External create wrappers, small functions, etc.

pub mod arena;
pub mod progress;
pub mod random;
