#![doc = include_str!("../README.md")]

mod common;
pub use common::*;
// Public re-export so downstream crates can access `citylist` via
// `citylist_tonic_core::citylist`
pub use citylist;
