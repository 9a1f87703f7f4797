//! Ledger engine — placement and settlement of bets against the bankroll.

pub mod bookkeeper;
pub mod settlement;

pub use bookkeeper::Bookkeeper;
