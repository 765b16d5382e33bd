//! Purpose: Condition-gated JSON binding on top of serde, shared by the `jsongate` CLI and tests.
//! Exports: `api` (stable surface), `core` (gate, paths, kinds, populate, errors),
//! `convert` (serde field converters).
//! Role: Library backing the binary; parsing and typed binding are delegated to serde.
//! Invariants: Library code performs no I/O and keeps no global state.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod convert;
pub mod core;
mod json;
