//! Strategy implementations.

pub mod history;
pub mod negamax;
pub mod random;
pub mod table;
pub mod utilimax;
mod util;
