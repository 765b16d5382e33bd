//! Purpose: Internal JSON parsing boundary shared by the gate and wrapper helpers.
//! Exports: `parse` module plus `from_str`/`parse_value` mapping failures to crate errors.
//! Role: Single seam for parser implementation so callsites avoid ad hoc decode logic.
//! Invariants: Text-to-value decoding in the library goes through this module.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::error::{Error, ErrorKind};

pub(crate) fn from_str<T: DeserializeOwned>(text: &str, context: &str) -> Result<T, Error> {
    parse::from_str(text).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message(format!("invalid json: {err}"))
            .with_hint(parse::hint_for_error(&err, context))
            .with_source(err)
    })
}

pub(crate) fn parse_value(text: &str, context: &str) -> Result<Value, Error> {
    from_str(text, context)
}
