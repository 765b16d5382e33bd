//! Purpose: Provide the internal runtime JSON decode entrypoints and failure diagnostics.
//! Exports: `from_str`, `ParseFailureCategory`, `categorize_error`, `categorize_message`,
//! `hint_for_error`.
//! Role: Parser boundary that centralizes simd-json usage details.
//! Invariants: Input buffers are copied once to satisfy simd-json mutable-slice API.
//! Invariants: Categories are derived from error text only; payload bytes never leak into hints.
//! Invariants: Structural tape failures (`InternalError(TapeError)`) and truncated containers are syntax.
//! Notes: Error mapping to crate errors is done by `json::from_str` so context stays explicit.

use serde::de::DeserializeOwned;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ParseFailureCategory {
    Syntax,
    Utf8,
    NumericRange,
    DepthLimit,
    Eof,
    Unknown,
}

impl ParseFailureCategory {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Utf8 => "utf8",
            Self::NumericRange => "numeric-range",
            Self::DepthLimit => "depth-limit",
            Self::Eof => "eof",
            Self::Unknown => "unknown",
        }
    }
}

pub(crate) fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, simd_json::Error> {
    let mut bytes = input.as_bytes().to_vec();
    simd_json::serde::from_slice(&mut bytes)
}

pub(crate) fn categorize_error(err: &simd_json::Error) -> ParseFailureCategory {
    categorize_message(&err.to_string())
}

pub(crate) fn categorize_message(message: &str) -> ParseFailureCategory {
    let lower = message.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|needle| lower.contains(needle));

    if has(&["utf8", "utf-8", "unicode"]) {
        ParseFailureCategory::Utf8
    } else if has(&["recursion", "depth", "nesting"]) {
        ParseFailureCategory::DepthLimit
    } else if has(&["number", "overflow", "exponent", "out of range"]) {
        ParseFailureCategory::NumericRange
    } else if has(&["eof", "end of input", "unexpected end"]) {
        ParseFailureCategory::Eof
    } else if has(&[
        "syntax",
        "expected",
        "unexpected character",
        "invalid",
        "trailing",
        "tapeerror",
        "internalerror",
    ]) {
        ParseFailureCategory::Syntax
    } else {
        ParseFailureCategory::Unknown
    }
}

pub(crate) fn hint_for_error(err: &simd_json::Error, context: &str) -> String {
    format!(
        "parse category: {}; context: {context}. Check that the input is a single well-formed JSON document.",
        categorize_error(err).as_str()
    )
}
