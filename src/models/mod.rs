pub mod cost;
pub mod invocation;
pub mod message;

pub use cost::*;
pub use invocation::*;
pub use message::*;
