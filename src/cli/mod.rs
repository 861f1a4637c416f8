pub mod report;
pub mod rotate;

pub use report::*;
pub use rotate::*;
