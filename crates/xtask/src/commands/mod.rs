//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod check;
mod gcd;
mod replay;

pub use check::Check;
pub use gcd::Gcd;
pub use replay::Replay;
