#![doc = include_str!("../README.md")]

mod classify;
pub mod delivery;
mod error;
mod producer;
mod signal;

pub use crate::classify::*;
pub use crate::error::*;
pub use crate::producer::*;
pub use crate::signal::*;
