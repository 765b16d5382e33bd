//! Purpose: Parse and resolve field-selector paths into a JSON document.
//! Exports: `JsonPath`, `Segment`, `select`.
//! Role: Shared lookup used by the gate (rule paths, target paths) and wrapper helpers.
//! Invariants: An empty path or `$` selects the document root.
//! Invariants: Resolution never fails structurally; a missing step yields `None`.
//! Notes: Supports dotted names, `['quoted']`/`["quoted"]` names and `[N]` indexes.

use std::fmt;

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let chars: Vec<char> = body.chars().collect();
        let mut segments = Vec::new();
        let mut idx = 0;
        // Leading `$.` and a bare first name are both accepted.
        let mut expect_name = !body.is_empty() && !body.starts_with('[') && !body.starts_with('.');

        if body.starts_with('.') {
            idx = 1;
            expect_name = true;
        }

        while idx < chars.len() || expect_name {
            if expect_name {
                let start = idx;
                while idx < chars.len() && chars[idx] != '.' && chars[idx] != '[' {
                    idx += 1;
                }
                if idx == start {
                    return Err(path_error(input, "empty path segment"));
                }
                segments.push(Segment::Key(chars[start..idx].iter().collect()));
                expect_name = false;
                continue;
            }

            match chars[idx] {
                '.' => {
                    idx += 1;
                    expect_name = true;
                }
                '[' => {
                    let (segment, next) = parse_bracket(input, &chars, idx + 1)?;
                    segments.push(segment);
                    idx = next;
                }
                other => {
                    return Err(path_error(input, format!("unexpected character `{other}`")));
                }
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn select<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |current, segment| match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key),
                (Segment::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            })
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) if is_plain_name(key) => write!(f, ".{key}")?,
                Segment::Key(key) => {
                    write!(f, "['{}']", key.replace('\\', "\\\\").replace('\'', "\\'"))?
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Resolve `path` against `document`; malformed paths resolve to nothing.
pub fn select<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    JsonPath::parse(path).ok()?.select(document)
}

fn parse_bracket(input: &str, chars: &[char], mut idx: usize) -> Result<(Segment, usize), Error> {
    let Some(&first) = chars.get(idx) else {
        return Err(path_error(input, "unterminated `[`"));
    };

    if first == '\'' || first == '"' {
        let quote = first;
        idx += 1;
        let mut key = String::new();
        loop {
            match chars.get(idx) {
                None => return Err(path_error(input, "unterminated quoted name")),
                Some('\\') => {
                    let Some(&escaped) = chars.get(idx + 1) else {
                        return Err(path_error(input, "dangling escape in quoted name"));
                    };
                    key.push(escaped);
                    idx += 2;
                }
                Some(&c) if c == quote => {
                    idx += 1;
                    break;
                }
                Some(&c) => {
                    key.push(c);
                    idx += 1;
                }
            }
        }
        if chars.get(idx) != Some(&']') {
            return Err(path_error(input, "expected `]` after quoted name"));
        }
        return Ok((Segment::Key(key), idx + 1));
    }

    let start = idx;
    while idx < chars.len() && chars[idx] != ']' {
        idx += 1;
    }
    if idx >= chars.len() {
        return Err(path_error(input, "unterminated `[`"));
    }
    let raw: String = chars[start..idx].iter().collect();
    let index = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| path_error(input, format!("invalid array index `{raw}`")))?;
    Ok((Segment::Index(index), idx + 1))
}

fn is_plain_name(key: &str) -> bool {
    !key.is_empty() && !key.contains(['.', '[', ']', '\'', '"'])
}

fn path_error(input: &str, detail: impl fmt::Display) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("invalid path: {detail}"))
        .with_path(input)
        .with_hint("Use dotted names (`data.items`), `['quoted.name']` or `[0]` indexes.")
}
