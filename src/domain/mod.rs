pub mod calendar;
pub mod completion;
pub mod error;
pub mod frequency;
pub mod habit;
pub mod streak;
pub mod tracker;

pub use completion::*;
pub use error::*;
pub use frequency::*;
pub use habit::*;
pub use streak::*;
pub use tracker::*;
