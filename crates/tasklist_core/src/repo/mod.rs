//! Persistence boundary for the task collection.
//!
//! # Responsibility
//! - Define the key-value adapter contract the task store writes through.
//! - Provide SQLite and in-memory adapter implementations.
//! - Encode/decode the persisted snapshot with an explicit schema.
//!
//! # Invariants
//! - The whole collection lives under one key; writes replace it wholesale.
//! - Decoding never produces a partially valid collection.

pub mod kv_store;
pub mod snapshot;
