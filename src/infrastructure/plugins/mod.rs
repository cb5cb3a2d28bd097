pub mod simple_logger;

pub use simple_logger::*;
