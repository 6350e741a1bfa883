//! Application state

pub mod global;
