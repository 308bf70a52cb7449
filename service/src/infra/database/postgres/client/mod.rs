//! Postgres database client definitions.
//!
//! [`NonTx`] serves plain operations; [`Tx`] runs everything it's handed in
//! one transaction committed explicitly.

pub mod non_tx;
pub mod tx;

pub use self::{non_tx::NonTx, tx::Tx};
