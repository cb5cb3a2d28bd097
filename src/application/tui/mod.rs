pub mod theme;
pub mod week_board;

pub use theme::*;
pub use week_board::*;
