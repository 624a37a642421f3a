//! Domain models for trackboard.
//!
//! # Core Concepts
//!
//! - [`Project`]: Top-level container. Holds an ordered list of [`Column`]s,
//!   each holding an ordered list of [`Task`]s. Fetched whole as a tree.
//! - [`ProjectSummary`]: The list-view shape of a project, without columns.
//! - [`Task`]: A card on the board. Its `position` is its rank inside its column.
//! - [`Checklist`] / [`ChecklistItem`] / [`Comment`]: Owned by a task and edited
//!   through their own endpoints. Board moves never touch them.
//!
//! Positions everywhere are dense 0-based ranks among siblings.

mod checklist;
mod comment;
mod project;
mod task;

pub use checklist::*;
pub use comment::*;
pub use project::*;
pub use task::*;
