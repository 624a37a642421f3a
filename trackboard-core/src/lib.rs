//! Domain models and board layout rules for trackboard.
//!
//! This crate has no I/O. The server, the REST client and the board
//! reconciler in the `trackboard` crate all share these types, and the
//! pure move logic in [`board`] is what the reconciler applies optimistically.

pub mod board;
pub mod models;
