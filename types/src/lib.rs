//! Shared types for squares pools run on top of a tournament bracket.
//!
//! Users claim squares on a 10x10 board. An assignment run binds each square to
//! a grid cell and labels every row and column with a digit. When a bracket
//! game finishes, the trailing digits of the two scores pick a cell, and its
//! owner collects the payout configured for that game's round.
//!
//! This crate only holds the data model. The engines live in
//! `squares-execution`.

mod board;
mod constants;
mod payout;
mod tournament;

pub use board::*;
pub use constants::*;
pub use payout::*;
pub use tournament::*;

#[cfg(test)]
mod tests;
