mod builtin;
mod catalog;
mod dump;
mod loader;
mod registry;

pub use builtin::*;
pub use catalog::*;
pub use dump::*;
pub use loader::*;
pub use registry::*;
