//! Trackboard: a kanban project tracker.
//!
//! - [`db`]: SQLite store for projects, boards, checklists and comments.
//! - [`api`]: REST server over the store.
//! - [`client`]: REST client for that server.
//! - [`board`]: the optimistic board reconciler and its text rendering.
//! - [`config`]: server and CLI settings.

pub mod api;
pub mod board;
pub mod client;
pub mod config;
pub mod db;

pub use trackboard_core::models;
