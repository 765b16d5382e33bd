//! Purpose: Turn `jsongate gate --rule` specs and rules files into gate rules.
//! Exports: `RuleSpec`, `CompareOp`, `load_rules_file`.
//! Role: Small adapter between CLI text and `api::Rule` predicates.
//! Invariants: Spec syntax is `PATH:KIND [OP LITERAL]` with whitespace around OP.
//! Invariants: Literals are coerced to KIND up front; a literal that does not fit is a usage error.
//! Invariants: A rule without OP passes whenever the field is present and coerces to KIND.

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use jsongate::api::{Error, ErrorKind, Rule, TypedValue, ValueKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn holds(self, ordering: Option<Ordering>) -> bool {
        match self {
            Self::Eq => ordering == Some(Ordering::Equal),
            Self::Ne => ordering != Some(Ordering::Equal),
            Self::Lt => ordering == Some(Ordering::Less),
            Self::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            Self::Gt => ordering == Some(Ordering::Greater),
            Self::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuleSpec {
    pub path: String,
    pub kind: ValueKind,
    pub check: Option<(CompareOp, TypedValue)>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFileEntry {
    path: String,
    kind: String,
    #[serde(default)]
    op: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

impl RuleSpec {
    pub fn parse(spec: &str) -> Result<Self, Error> {
        let spec = spec.trim();
        let (head, rest) = split_head(spec);
        let Some((path, kind)) = head.rsplit_once(':') else {
            return Err(spec_error(spec, "missing `:KIND` after the path"));
        };
        let kind: ValueKind = kind.parse()?;

        if rest.is_empty() {
            return Ok(Self {
                path: path.to_string(),
                kind,
                check: None,
            });
        }

        let (op_token, literal) = match rest.split_once(char::is_whitespace) {
            Some((op, literal)) => (op, literal.trim()),
            None => (rest, ""),
        };
        let Some(op) = CompareOp::parse(op_token) else {
            return Err(spec_error(spec, format!("unknown operator `{op_token}`")));
        };
        if literal.is_empty() {
            return Err(spec_error(spec, "missing literal after the operator"));
        }
        // Bare words are accepted as strings so `status:string == ok` works unquoted.
        let literal = serde_json::from_str::<Value>(literal)
            .unwrap_or_else(|_| Value::String(literal.to_string()));
        Self::with_check(spec, path, kind, op, &literal)
    }

    fn from_entry(entry: RuleFileEntry) -> Result<Self, Error> {
        let kind: ValueKind = entry.kind.parse()?;
        let label = format!("{}:{}", entry.path, entry.kind);
        match (entry.op, entry.value) {
            (None, None) => Ok(Self {
                path: entry.path,
                kind,
                check: None,
            }),
            (Some(op_token), Some(literal)) => {
                let Some(op) = CompareOp::parse(&op_token) else {
                    return Err(spec_error(&label, format!("unknown operator `{op_token}`")));
                };
                Self::with_check(&label, &entry.path, kind, op, &literal)
            }
            _ => Err(spec_error(&label, "`op` and `value` must be given together")),
        }
    }

    fn with_check(
        spec: &str,
        path: &str,
        kind: ValueKind,
        op: CompareOp,
        literal: &Value,
    ) -> Result<Self, Error> {
        let Some(expected) = kind.coerce(literal) else {
            return Err(spec_error(
                spec,
                format!("literal {literal} does not fit kind {kind}"),
            ));
        };
        Ok(Self {
            path: path.to_string(),
            kind,
            check: Some((op, expected)),
        })
    }

    pub fn into_rule(self) -> Rule {
        let check = self.check;
        Rule::new(self.path, self.kind, move |actual: Option<&TypedValue>| {
            match (&check, actual) {
                (None, actual) => actual.is_some(),
                (Some(_), None) => false,
                (Some((op, expected)), Some(actual)) => op.holds(actual.compare(expected)),
            }
        })
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.kind)?;
        if let Some((op, expected)) = &self.check {
            write!(f, " {} {}", op.as_str(), expected.to_json())?;
        }
        Ok(())
    }
}

pub fn load_rules_file(path: &Path) -> Result<Vec<RuleSpec>, Error> {
    let text = fs::read_to_string(path).map_err(|err| {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Error::new(kind)
            .with_message(format!("failed to read rules file {}", path.display()))
            .with_source(err)
    })?;
    let entries: Vec<RuleFileEntry> = serde_json::from_str(&text).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid rules file {}: {err}", path.display()))
            .with_hint(r#"Expected a JSON array like [{"path":"errCode","kind":"int","op":"==","value":0}]."#)
            .with_source(err)
    })?;
    entries.into_iter().map(RuleSpec::from_entry).collect()
}

/// Split `PATH:KIND` from the rest at the first whitespace outside a
/// bracketed path segment, so `['a b']:int == 1` keeps its quoted key.
fn split_head(spec: &str) -> (&str, &str) {
    let mut in_bracket = false;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in spec.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '[' => in_bracket = true,
            ']' => in_bracket = false,
            '\'' | '"' if in_bracket => quote = Some(ch),
            c if c.is_whitespace() && !in_bracket => {
                return (&spec[..idx], spec[idx..].trim());
            }
            _ => {}
        }
    }
    (spec, "")
}

fn spec_error(spec: &str, detail: impl fmt::Display) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("invalid rule `{spec}`: {detail}"))
        .with_hint("Rules look like `errCode:int == 0`, `data.name:string != \"\"` or `data:json`.")
}
