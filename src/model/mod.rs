pub mod dependency;
pub mod node;
pub mod strategy;

pub use dependency::*;
pub use node::*;
pub use strategy::*;
