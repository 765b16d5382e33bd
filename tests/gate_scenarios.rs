//! Purpose: End-to-end coverage of the conditional parse gate through the public API.
//! Exports: Integration tests only.
//! Role: Lock deserialize/populate behavior for met, unmet, and absent conditions.
//! Invariants: Failed conditions never reach the bind step.
//! Invariants: Callbacks see the actual value, or absence, exactly once per failed path.

use std::cell::RefCell;
use std::rc::Rc;

use jsongate::api::{
    ErrorKind, GateFailure, Observed, ParseGate, PopulateOptions, TypedValue,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

const APP_DETAIL: &str = r#"{
  "errCode": 0,
  "errMsg": "success",
  "data": {
    "id": 1003,
    "name": "Punch",
    "scover": "https://cdn.example.com/pics/eeb90489.png",
    "brief": "Boxing workout",
    "tags": ["sport", "fitness"]
  }
}"#;

const SCOVER: &str = "https://cdn.example.com/pics/eeb90489.png";

#[derive(Debug, Default, Deserialize, Serialize)]
struct AppDetail {
    #[serde(default)]
    scover: Option<String>,
    #[serde(default)]
    brief: Option<String>,
    #[serde(default = "default_extra", rename = "extraField")]
    extra_field: String,
}

fn default_extra() -> String {
    "ArbitraryValue".to_string()
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct Account {
    email: Option<String>,
    active: bool,
    #[serde(default)]
    roles: Vec<String>,
    gender: Option<String>,
}

fn gate() -> ParseGate {
    ParseGate::from_json(APP_DETAIL).expect("fixture parses")
}

#[test]
fn deserialize_without_condition_succeeds() {
    let detail: AppDetail = gate().deserialize("data").unwrap();
    assert_eq!(detail.scover.as_deref(), Some(SCOVER));
    assert_eq!(detail.extra_field, "ArbitraryValue");
}

#[test]
fn deserialize_without_target_binds_root() {
    let gate = ParseGate::from_json(r#"{"email":"ops@example.com","active":true}"#).unwrap();
    let account: Account = gate.deserialize("").unwrap();
    assert!(account.active);
    assert_eq!(account.email.as_deref(), Some("ops@example.com"));
}

#[test]
fn deserialize_with_met_condition_succeeds() {
    let mut gate = gate();
    gate.add_condition("errCode", |code: &i32| *code == 0);
    let detail: AppDetail = gate.deserialize("data").unwrap();
    assert_eq!(detail.scover.as_deref(), Some(SCOVER));
}

#[test]
fn deserialize_with_wrong_value_fails_without_binding() {
    let mut gate = gate();
    gate.add_condition("errCode", |code: &i32| *code == 1);
    let failure = gate.deserialize::<AppDetail>("data").unwrap_err();
    assert!(failure.is_condition_failure());
    assert_eq!(failure.failures().len(), 1);
    assert_eq!(failure.failures()[0].path, "errCode");
}

#[test]
fn wrong_value_triggers_callback_with_actual_value() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut gate = gate();
    gate.add_condition("errCode", |code: &i32| *code == 1);
    let sink = Rc::clone(&seen);
    gate.add_typed_fail_callback("errCode", move |code: Option<i32>| {
        sink.borrow_mut().push(code)
    })
    .unwrap();

    assert!(gate.deserialize::<AppDetail>("data").is_err());
    assert_eq!(seen.borrow().as_slice(), &[Some(0)]);
}

#[test]
fn missing_field_fails_and_callback_sees_absence() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut gate = gate();
    gate.add_condition("unExisted", |code: &i64| *code == 0);
    let sink = Rc::clone(&seen);
    gate.add_condition_fail_callback("unExisted", move |observed| {
        sink.borrow_mut().push(observed.clone())
    })
    .unwrap();

    let failure = gate.deserialize::<AppDetail>("data").unwrap_err();
    assert!(failure.is_condition_failure());
    assert_eq!(seen.borrow().as_slice(), &[Observed::Absent]);
}

#[test]
fn every_failed_path_is_routed_to_its_own_callback() {
    let doc = json!({"errCode": 3, "permission": "none", "data": {}});
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut gate = ParseGate::with_document(doc);
    gate.add_condition("errCode", |code: &i64| *code == 0)
        .add_condition("permission", |p: &String| p == "granted")
        .add_condition("quota", |q: &i64| *q > 0);

    for path in ["errCode", "permission"] {
        let sink = Rc::clone(&seen);
        gate.add_condition_fail_callback(path, move |observed| {
            sink.borrow_mut().push((path, observed.clone()))
        })
        .unwrap();
    }

    let failure = gate.deserialize::<serde_json::Value>("data").unwrap_err();
    assert_eq!(failure.failures().len(), 3);
    assert_eq!(
        seen.borrow().as_slice(),
        &[
            ("errCode", Observed::Value(TypedValue::Integer(3))),
            ("permission", Observed::Value(TypedValue::String("none".into()))),
        ]
    );
}

#[test]
fn evaluate_is_idempotent() {
    let mut gate = gate();
    gate.add_condition("errCode", |code: &i64| *code == 1)
        .add_condition("unExisted", |_: &bool| true)
        .add_condition("errMsg", |msg: &String| msg == "success");
    let document = gate.document().cloned().unwrap();
    let first = gate.evaluate(&document);
    let second = gate.evaluate(&document);
    assert_eq!(first, second);
    assert_eq!(first.failed_paths(), vec!["errCode", "unExisted"]);
}

#[test]
fn populate_keeps_fields_missing_from_fragment() {
    let mut detail = AppDetail {
        extra_field: "ABC".to_string(),
        ..AppDetail::default()
    };
    let mut gate = gate();
    gate.add_condition("errCode", |code: &i64| *code == 0);
    gate.populate("data", &mut detail).unwrap();
    assert_eq!(detail.scover.as_deref(), Some(SCOVER));
    assert_eq!(detail.extra_field, "ABC");
}

#[test]
fn populate_with_unmet_condition_leaves_target_alone() {
    let mut detail = AppDetail {
        extra_field: "ABC".to_string(),
        ..AppDetail::default()
    };
    let mut gate = gate();
    gate.add_condition("unExisted", |code: &i64| *code == 0);
    assert!(gate.populate("data", &mut detail).is_err());
    assert_eq!(detail.scover, None);
    assert_eq!(detail.extra_field, "ABC");
}

#[test]
fn populate_root_without_target_path() {
    let mut account = Account {
        email: Some("ops@example.com".into()),
        active: false,
        roles: vec!["User".into(), "Admin".into()],
        gender: None,
    };
    let gate = ParseGate::from_json(r#"{"email":"ops@example.com","active":true}"#).unwrap();
    gate.populate("", &mut account).unwrap();
    assert!(account.active);
    assert_eq!(account.roles.len(), 2);
}

#[test]
fn populate_replace_lists_on_request() {
    let mut account = Account {
        roles: vec!["User".into()],
        ..Account::default()
    };
    let gate = ParseGate::from_json(r#"{"account":{"roles":["Ben","Tony"]}}"#).unwrap();
    gate.populate_with_options("account", &mut account, PopulateOptions::replace_lists())
        .unwrap();
    assert_eq!(account.roles, vec!["Ben".to_string(), "Tony".to_string()]);
}

#[test]
fn bind_errors_report_no_failed_conditions() {
    let mut gate = gate();
    gate.add_condition("errCode", |code: &i64| *code == 0);
    let failure = gate.deserialize::<Vec<u8>>("data").unwrap_err();
    match &failure {
        GateFailure::Bind(err) => assert_eq!(err.kind(), ErrorKind::Bind),
        other => panic!("unexpected failure: {other:?}"),
    }
    assert!(failure.failures().is_empty());

    let as_error: jsongate::api::Error = failure.into();
    assert_eq!(as_error.kind(), ErrorKind::Bind);
}

#[test]
fn set_json_replaces_the_held_document() {
    let mut gate = ParseGate::new();
    assert!(gate.document().is_none());
    gate.set_json(r#"{"errCode":1}"#).unwrap();
    gate.add_condition("errCode", |code: &i64| *code == 1);
    let code: i64 = gate.deserialize("errCode").unwrap();
    assert_eq!(code, 1);

    let err = gate.set_json("{not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct CachedDetail {
    #[serde(default)]
    scover: Option<String>,
    #[serde(skip)]
    hits: u32,
}

#[test]
fn populate_resets_fields_the_target_does_not_serialize() {
    let mut detail = CachedDetail {
        scover: None,
        hits: 7,
    };
    gate().populate("data", &mut detail).unwrap();
    assert_eq!(detail.scover.as_deref(), Some(SCOVER));
    assert_eq!(detail.hits, 0);
}
