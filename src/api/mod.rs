//! Purpose: Define the stable public Rust API boundary for jsongate.
//! Exports: Gate, path, kind, populate and error types plus the wrapper helpers.
//! Role: Public, additive-only surface used by the CLI and downstream crates.
//! Invariants: The JSON parse boundary stays private; callers pass text or `serde_json::Value`.

mod wrapper;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::gate::{Evaluation, FailedCondition, GateFailure, ParseGate, Rule};
pub use crate::core::kind::{GateValue, Observed, TypedValue, ValueKind};
pub use crate::core::path::{JsonPath, Segment};
pub use crate::core::populate::{ListHandling, PopulateOptions};
pub use wrapper::{
    deserialize_object, fragment_children, get_dictionary, get_list, is_valid_json,
    populate_object, select_fragment, serialize_object, try_deserialize_field, try_populate_field,
};
