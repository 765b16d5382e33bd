//! Purpose: Populate an existing value from a JSON fragment instead of building a new one.
//! Exports: `PopulateOptions`, `ListHandling`, `populate_value`, `populate`.
//! Role: Bind primitive behind `ParseGate::populate` and `api::populate_object`.
//! Invariants: Fields missing from the fragment keep the value they serialize to.
//! Invariants: Typed targets round-trip through `serde_json::Value`; fields that are not
//! serialized (`#[serde(skip)]`, `skip_serializing`) come back as their deserialize default.
//! Invariants: Typed populate is all-or-nothing; on error the target is untouched.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ListHandling {
    /// Reuse the existing list and append the fragment's elements.
    #[default]
    Append,
    /// Drop the existing list and take the fragment's elements.
    Replace,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PopulateOptions {
    pub lists: ListHandling,
}

impl PopulateOptions {
    pub fn replace_lists() -> Self {
        Self {
            lists: ListHandling::Replace,
        }
    }
}

/// Merge `fragment` into `target` in place.
///
/// The top-level shapes must agree: an object populates an object and an
/// array populates an array. Anything else is a bind error and leaves
/// `target` as it was.
pub fn populate_value(
    target: &mut Value,
    fragment: &Value,
    options: PopulateOptions,
) -> Result<(), Error> {
    if same_container(target, fragment) {
        merge(target, fragment, options);
        return Ok(());
    }
    match (target.is_null(), fragment) {
        (true, Value::Object(_) | Value::Array(_)) => {
            *target = fragment.clone();
            Ok(())
        }
        _ => Err(Error::new(ErrorKind::Bind)
            .with_message(format!(
                "cannot populate {} from a JSON {}",
                shape(target),
                shape(fragment)
            ))
            .with_hint("Point the target path at an object or array matching the target type.")),
    }
}

/// Populate a typed value: serialize it, merge the fragment, deserialize back.
///
/// Only state that survives `T -> Value -> T` is kept. A field skipped on
/// serialization is reset to its default even when the fragment does not
/// mention it.
pub fn populate<T>(target: &mut T, fragment: &Value, options: PopulateOptions) -> Result<(), Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut current = serde_json::to_value(&*target).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to snapshot populate target")
            .with_source(err)
    })?;
    populate_value(&mut current, fragment, options)?;
    *target = serde_json::from_value(current).map_err(|err| {
        Error::new(ErrorKind::Bind)
            .with_message(format!("fragment does not fit target type: {err}"))
            .with_source(err)
    })?;
    Ok(())
}

fn merge(target: &mut Value, fragment: &Value, options: PopulateOptions) {
    match (target, fragment) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(key) {
                    Some(slot) if same_container(slot, value) => merge(slot, value, options),
                    Some(slot) => *slot = value.clone(),
                    None => {
                        existing.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(existing), Value::Array(incoming)) => match options.lists {
            ListHandling::Append => existing.extend(incoming.iter().cloned()),
            ListHandling::Replace => *existing = incoming.clone(),
        },
        (slot, value) => *slot = value.clone(),
    }
}

fn same_container(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_))
    )
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
