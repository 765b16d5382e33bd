//! Purpose: Convenience entry points for documents whose payload sits under a wrapper path.
//! Exports: `is_valid_json`, `deserialize_object`, `serialize_object`, `select_fragment`,
//! `fragment_children`, `get_list`, `get_dictionary`, `try_deserialize_field`,
//! `populate_object`, `try_populate_field`.
//! Role: Thin pass-through over the parse boundary, path selector and populate merge.
//! Invariants: `None`/empty wrapper means the document root.
//! Invariants: `try_*` helpers swallow errors by contract; everything else returns them.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::core::path::{JsonPath, Segment};
use crate::core::populate::{self, PopulateOptions};
use crate::json;

/// True when `text` is a JSON object or array (after trimming) that parses.
pub fn is_valid_json(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    let wrapped = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    wrapped && json::parse_value(trimmed, "is_valid_json").is_ok()
}

pub fn deserialize_object<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    json::from_str(text, "deserialize_object")
}

pub fn serialize_object<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message(format!("failed to serialize value: {err}"))
            .with_source(err)
    })
}

/// The fragment at `wrapper`, or `None` when the path does not resolve.
pub fn select_fragment(text: &str, wrapper: &str) -> Result<Option<Value>, Error> {
    let path = JsonPath::parse(wrapper)?;
    let document = json::parse_value(text, "select_fragment")?;
    Ok(path.select(&document).cloned())
}

/// Array elements or object values of the fragment at `wrapper`.
pub fn fragment_children(text: &str, wrapper: &str) -> Result<Option<Vec<Value>>, Error> {
    Ok(select_fragment(text, wrapper)?.map(children_of))
}

/// Deserialize a list, either the whole document or every child of `wrapper`.
pub fn get_list<T: DeserializeOwned>(text: &str, wrapper: Option<&str>) -> Result<Vec<T>, Error> {
    let Some(wrapper) = wrapper.filter(|w| !w.is_empty()) else {
        return deserialize_object(text);
    };
    let children = fragment_children(text, wrapper)?.ok_or_else(|| {
        Error::new(ErrorKind::NotFound)
            .with_message("list wrapper not found")
            .with_path(wrapper)
    })?;
    children
        .iter()
        .enumerate()
        .map(|(idx, child)| {
            T::deserialize(child).map_err(|err| {
                Error::new(ErrorKind::Parse)
                    .with_message(format!("list element {idx} does not fit target type: {err}"))
                    .with_path(wrapper)
                    .with_source(err)
            })
        })
        .collect()
}

/// Deserialize a string-keyed map.
///
/// With a wrapper, each entry is bound on its own; entries that are `null`
/// or do not fit `T` are skipped, and a missing wrapper yields an empty map.
pub fn get_dictionary<T: DeserializeOwned>(
    text: &str,
    wrapper: Option<&str>,
) -> Result<BTreeMap<String, T>, Error> {
    let Some(wrapper) = wrapper.filter(|w| !w.is_empty()) else {
        return deserialize_object(text);
    };
    let Some(Value::Object(entries)) = select_fragment(text, wrapper)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .filter_map(|(key, value)| T::deserialize(value).ok().map(|parsed| (key, parsed)))
        .collect())
}

/// Deserialize the top-level field `name` (taken literally, dots included).
pub fn try_deserialize_field<T: DeserializeOwned>(text: &str, name: &str) -> Option<T> {
    let document = json::parse_value(text, "try_deserialize_field").ok()?;
    let fragment = field_path(name).select(&document)?;
    T::deserialize(fragment).ok()
}

/// Merge the document into `target`. Fields `target` does not serialize are
/// reset to their deserialize default.
pub fn populate_object<T>(text: &str, target: &mut T, options: PopulateOptions) -> Result<(), Error>
where
    T: Serialize + DeserializeOwned,
{
    let fragment = json::parse_value(text, "populate_object")?;
    populate::populate(target, &fragment, options)
}

/// Populate `target` from the top-level field `name`; reports success only.
pub fn try_populate_field<T>(text: &str, name: &str, target: &mut T) -> bool
where
    T: Serialize + DeserializeOwned,
{
    let Ok(document) = json::parse_value(text, "try_populate_field") else {
        return false;
    };
    field_path(name)
        .select(&document)
        .is_some_and(|fragment| {
            populate::populate(target, fragment, PopulateOptions::default()).is_ok()
        })
}

fn field_path(name: &str) -> JsonPath {
    JsonPath::from_segments(vec![Segment::Key(name.to_string())])
}

fn children_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    }
}
