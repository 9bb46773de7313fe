pub mod judge;
pub mod pipeline;
pub mod range;
pub mod result;
pub mod runner;
pub mod testcase;

pub use judge::{new_judge, Judge, OrderPolicy, ShapeError};
pub use pipeline::*;
pub use range::*;
pub use result::*;
pub use runner::*;
pub use testcase::*;
