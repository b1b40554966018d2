//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its create/update candidate.
//! - Own the field validation rules shared by every write path.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` assigned at creation.
//! - A task only moves from `done = false` to `done = true`.

pub mod task;
