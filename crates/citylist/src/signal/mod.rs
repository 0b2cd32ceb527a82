mod context;
mod interface;

pub use context::*;
pub use interface::*;
