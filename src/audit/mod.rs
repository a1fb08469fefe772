//! Audit logging system for clinic-ledger
//!
//! Records every tracked create, update, and delete with enough prior state
//! to reverse it later.
//!
//! # Architecture
//!
//! - `Action` / `ActionKind`: the closed set of tracked actions, each tagged
//!   with its undo classification at write time.
//! - `LogEntry`: one audit record, optionally pointing at the affected
//!   entity and carrying its prior state.
//! - `Snapshot`: typed per-entity before-images, with explicit child
//!   collections for nested restores.
//! - `AuditRecorder`: appends entries after business mutations; never fails.

mod action;
mod entry;
mod recorder;
mod snapshot;

pub use action::{Action, ActionKind};
pub use entry::{EntityKind, LogEntry, RelatedEntity};
pub use recorder::AuditRecorder;
pub use snapshot::{ClientSnapshot, PaymentSnapshot, Snapshot};
