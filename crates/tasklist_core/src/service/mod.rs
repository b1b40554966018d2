//! Core use-case services.
//!
//! # Responsibility
//! - Own the task collection and its persistence contract.
//! - Keep view/FFI layers decoupled from storage details.

pub mod board;
pub mod edit_session;
pub mod task_store;
