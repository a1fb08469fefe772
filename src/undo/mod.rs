//! Undo support
//!
//! Administrators can reverse individual audit log entries: deletes are
//! restored from their snapshots, creates are removed together with their
//! side effects, and updates get their prior scalar values written back.
//! Each entry can be undone at most once.

mod engine;
mod restore;

pub use engine::UndoEngine;
