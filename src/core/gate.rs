//! Purpose: Gate deserialization/population of a JSON document on field conditions.
//! Exports: `ParseGate`, `Rule`, `Evaluation`, `FailedCondition`, `GateFailure`.
//! Role: Core component; evaluates every rule, then either binds the target fragment or
//! routes each failed path to its registered failure callback.
//! Invariants: `evaluate` is pure: it never short-circuits and never invokes callbacks.
//! Invariants: `bind` runs only when every rule passed.
//! Invariants: Each distinct failed path triggers its callback at most once per parse.
//! Invariants: At most one failure callback per path; duplicates are rejected.
//! Invariants: The document is never mutated by the gate.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::error::{Error, ErrorKind};
use crate::core::kind::{GateValue, Observed, TypedValue, ValueKind};
use crate::core::path::{self, JsonPath};
use crate::core::populate::{self, PopulateOptions};

type Predicate = Box<dyn Fn(Option<&TypedValue>) -> bool>;
type FailureCallback = Box<dyn Fn(&Observed)>;

/// A condition on the value found at `path`.
///
/// The predicate sees `None` when the path is absent, resolves to `null`, or
/// holds something that does not coerce to `kind`.
pub struct Rule {
    path: String,
    kind: ValueKind,
    predicate: Predicate,
}

impl Rule {
    pub fn new(
        path: impl Into<String>,
        kind: ValueKind,
        predicate: impl Fn(Option<&TypedValue>) -> bool + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            predicate: Box::new(predicate),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    fn check(&self, document: &Value) -> (bool, Observed) {
        let observed = self.kind.observe(path::select(document, &self.path));
        let met = (self.predicate)(observed.typed());
        (met, observed)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FailedCondition {
    pub path: String,
    pub expected: ValueKind,
    pub observed: Observed,
}

/// Every unmet condition of one evaluation, in rule registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evaluation {
    failures: Vec<FailedCondition>,
}

impl Evaluation {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FailedCondition] {
        &self.failures
    }

    /// Distinct failed paths, first occurrence order.
    pub fn failed_paths(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.failures
            .iter()
            .map(|failure| failure.path.as_str())
            .filter(|path| seen.insert(*path))
            .collect()
    }
}

#[derive(Debug)]
pub enum GateFailure {
    /// One or more rules were not met; `bind` was not invoked.
    Conditions(Evaluation),
    /// Every rule passed but the target could not be bound.
    Bind(Error),
}

impl GateFailure {
    /// Failed conditions; empty for bind failures.
    pub fn failures(&self) -> &[FailedCondition] {
        match self {
            Self::Conditions(evaluation) => evaluation.failures(),
            Self::Bind(_) => &[],
        }
    }

    pub fn is_condition_failure(&self) -> bool {
        matches!(self, Self::Conditions(_))
    }
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conditions(evaluation) => write!(
                f,
                "conditions not met: {}",
                evaluation.failed_paths().join(", ")
            ),
            Self::Bind(err) => write!(f, "bind failed: {err}"),
        }
    }
}

impl std::error::Error for GateFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conditions(_) => None,
            Self::Bind(err) => Some(err),
        }
    }
}

impl From<GateFailure> for Error {
    fn from(failure: GateFailure) -> Self {
        match failure {
            GateFailure::Conditions(evaluation) => Error::new(ErrorKind::ConditionFailed)
                .with_message(format!(
                    "conditions not met: {}",
                    evaluation.failed_paths().join(", ")
                )),
            GateFailure::Bind(err) => err,
        }
    }
}

/// Rule set plus failure callbacks, optionally holding the document to parse.
#[derive(Default)]
pub struct ParseGate {
    document: Option<Value>,
    rules: Vec<Rule>,
    callbacks: HashMap<String, FailureCallback>,
}

impl ParseGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Value) -> Self {
        Self {
            document: Some(document),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(Self::with_document(crate::json::parse_value(text, "gate.document")?))
    }

    pub fn set_document(&mut self, document: Value) {
        self.document = Some(document);
    }

    pub fn set_json(&mut self, text: &str) -> Result<(), Error> {
        self.document = Some(crate::json::parse_value(text, "gate.document")?);
        Ok(())
    }

    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn has_fail_callback(&self, path: &str) -> bool {
        self.callbacks.contains_key(path)
    }

    pub fn add_rule(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Require the value at `path` to be a `T` satisfying `predicate`.
    /// Absent, null, or mismatched values fail without calling `predicate`.
    pub fn add_condition<T, F>(&mut self, path: impl Into<String>, predicate: F) -> &mut Self
    where
        T: GateValue + 'static,
        F: Fn(&T) -> bool + 'static,
    {
        self.add_rule(Rule::new(path, T::KIND, move |typed| {
            typed
                .and_then(T::from_typed)
                .is_some_and(|value| predicate(&value))
        }))
    }

    /// Like [`add_condition`](Self::add_condition) but the predicate also decides
    /// what a missing value means.
    pub fn add_condition_with<T, F>(&mut self, path: impl Into<String>, predicate: F) -> &mut Self
    where
        T: GateValue + 'static,
        F: Fn(Option<T>) -> bool + 'static,
    {
        self.add_rule(Rule::new(path, T::KIND, move |typed| {
            predicate(typed.and_then(T::from_typed))
        }))
    }

    pub fn add_condition_fail_callback<F>(
        &mut self,
        path: impl Into<String>,
        callback: F,
    ) -> Result<&mut Self, Error>
    where
        F: Fn(&Observed) + 'static,
    {
        let path = path.into();
        if self.callbacks.contains_key(&path) {
            return Err(Error::new(ErrorKind::AlreadyExists)
                .with_message("a failure callback is already registered for this path")
                .with_path(path));
        }
        self.callbacks.insert(path, Box::new(callback));
        Ok(self)
    }

    /// Register a failure callback that receives the observed value as `T`
    /// (`None` when absent, null, or not a `T`).
    pub fn add_typed_fail_callback<T, F>(
        &mut self,
        path: impl Into<String>,
        callback: F,
    ) -> Result<&mut Self, Error>
    where
        T: GateValue + 'static,
        F: Fn(Option<T>) + 'static,
    {
        self.add_condition_fail_callback(path, move |observed| {
            callback(observed.typed().and_then(T::from_typed))
        })
    }

    pub fn evaluate(&self, document: &Value) -> Evaluation {
        let failures = self
            .rules
            .iter()
            .filter_map(|rule| {
                let (met, observed) = rule.check(document);
                if met {
                    return None;
                }
                debug!(path = %rule.path, kind = %rule.kind, ?observed, "condition not met");
                Some(FailedCondition {
                    path: rule.path.clone(),
                    expected: rule.kind,
                    observed,
                })
            })
            .collect();
        Evaluation { failures }
    }

    /// Run the gate over the held document and bind the fragment at `target_path`.
    pub fn parse_with<R, F>(&self, target_path: &str, bind: F) -> Result<R, GateFailure>
    where
        F: FnOnce(&Value) -> Result<R, Error>,
    {
        let Some(document) = self.document.as_ref() else {
            let err = Error::new(ErrorKind::Usage)
                .with_message("no document set on the gate")
                .with_hint("Call `set_json`/`set_document` or use `parse_document_with`.");
            warn!(error = %err, "parse requested without a document");
            return Err(GateFailure::Bind(err));
        };
        self.parse_document_with(document, target_path, bind)
    }

    pub fn parse_document_with<R, F>(
        &self,
        document: &Value,
        target_path: &str,
        bind: F,
    ) -> Result<R, GateFailure>
    where
        F: FnOnce(&Value) -> Result<R, Error>,
    {
        let evaluation = self.evaluate(document);
        if !evaluation.passed() {
            self.dispatch_failures(&evaluation);
            return Err(GateFailure::Conditions(evaluation));
        }

        select_target(document, target_path)
            .and_then(bind)
            .map_err(|err| {
                warn!(target_path, error = %err, "failed to bind json fragment");
                GateFailure::Bind(err)
            })
    }

    /// Deserialize a new `T` from the fragment at `target_path`.
    pub fn deserialize<T: DeserializeOwned>(&self, target_path: &str) -> Result<T, GateFailure> {
        self.parse_with(target_path, |fragment| {
            T::deserialize(fragment).map_err(|err| {
                Error::new(ErrorKind::Bind)
                    .with_message(format!("fragment does not fit target type: {err}"))
                    .with_path(target_path)
                    .with_source(err)
            })
        })
    }

    /// Populate `target` from the fragment at `target_path`, appending to lists.
    ///
    /// `target` round-trips through `serde_json::Value`, so fields it does not
    /// serialize come back as their deserialize default.
    pub fn populate<T>(&self, target_path: &str, target: &mut T) -> Result<(), GateFailure>
    where
        T: Serialize + DeserializeOwned,
    {
        self.populate_with_options(target_path, target, PopulateOptions::default())
    }

    pub fn populate_with_options<T>(
        &self,
        target_path: &str,
        target: &mut T,
        options: PopulateOptions,
    ) -> Result<(), GateFailure>
    where
        T: Serialize + DeserializeOwned,
    {
        self.parse_with(target_path, |fragment| {
            populate::populate(target, fragment, options).map_err(|err| err.with_path(target_path))
        })
    }

    fn dispatch_failures(&self, evaluation: &Evaluation) {
        let mut notified = HashSet::new();
        for failure in evaluation.failures() {
            if !notified.insert(failure.path.as_str()) {
                continue;
            }
            match self.callbacks.get(&failure.path) {
                Some(callback) => callback(&failure.observed),
                None => debug!(path = %failure.path, "no failure callback registered"),
            }
        }
    }
}

impl fmt::Debug for ParseGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut callback_paths: Vec<&String> = self.callbacks.keys().collect();
        callback_paths.sort();
        f.debug_struct("ParseGate")
            .field("has_document", &self.document.is_some())
            .field("rules", &self.rules)
            .field("callback_paths", &callback_paths)
            .finish()
    }
}

fn select_target<'a>(document: &'a Value, target_path: &str) -> Result<&'a Value, Error> {
    let parsed = JsonPath::parse(target_path)?;
    parsed.select(document).ok_or_else(|| {
        Error::new(ErrorKind::NotFound)
            .with_message("target fragment not found")
            .with_path(target_path)
    })
}
