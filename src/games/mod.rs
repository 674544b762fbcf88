//! Bit-packed rule sets for the supported games.

pub mod connect4;
pub mod morris;
pub mod ttt;

pub use connect4::ConnectFour;
pub use morris::NineMensMorris;
pub use ttt::TicTacToe;
