//! Purpose: serde field converters for values JSON has no native shape for.
//! Exports: `epoch_millis` (date-times as Unix milliseconds), `math` (flat vector types).
//! Role: Selected per field with `#[serde(with = ...)]` or by using the types directly.
//! Invariants: No global converter registry; the choice is made at compile time.

pub mod epoch_millis;
pub mod math;
