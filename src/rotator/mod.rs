pub mod byte;
pub mod chunk;
pub mod stream;

pub use byte::*;
pub use chunk::*;
pub use stream::*;
