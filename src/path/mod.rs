pub mod ancestors;
pub mod codec;
pub mod index;
pub mod resolver;

pub use ancestors::*;
pub use codec::*;
pub use index::*;
pub use resolver::*;
