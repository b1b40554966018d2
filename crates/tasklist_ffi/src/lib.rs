//! Flutter-facing bridge for the task list core.

pub mod api;
