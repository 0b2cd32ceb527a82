mod city;
mod interface;
mod names;
mod sleep_provider;

pub use city::*;
pub use interface::*;
pub use names::*;
pub use sleep_provider::*;

#[cfg(test)]
mod tests;
