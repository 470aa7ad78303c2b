//! Shared test utilities

#![allow(dead_code)]

pub mod assets;
pub mod rates;

pub use assets::*;
pub use rates::*;
