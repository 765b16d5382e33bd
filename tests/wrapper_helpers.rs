//! Purpose: Coverage for the wrapper-path convenience helpers.
//! Exports: Integration tests only.
//! Role: Lock list/dictionary extraction, single-field try helpers, and populate modes.
//! Invariants: Helpers never panic on malformed or missing input.

use std::collections::BTreeMap;

use jsongate::api::{
    ErrorKind, PopulateOptions, deserialize_object, fragment_children, get_dictionary, get_list,
    populate_object, select_fragment, serialize_object, try_deserialize_field, try_populate_field,
};
use jsongate::convert::math::Vector3;
use serde::{Deserialize, Serialize};
use serde_json::json;

const DOWNLOADS: &str = r#"[
  {"isSystem":false,"totalSize":704264327,"downloadSize":52958191,"appId":3308841940,"name":"Punch","pkg":"com.hemudu.punch","status":3},
  {"isSystem":false,"totalSize":107750076,"downloadSize":40807195,"appId":3823345597,"name":"爱奇艺 HD","pkg":"com.qiyi.video.pad","status":3},
  {"isSystem":false,"totalSize":271464018,"downloadSize":0,"appId":9268865956,"name":"暴走篮球","pkg":"io.realcast.justhoops.yvr","status":7}
]"#;

const ACCOUNT: &str = r#"{"email":"ops@example.com","active":true,"roles":["User","Admin"]}"#;

#[derive(Debug, Deserialize, PartialEq)]
struct DownloadInfo {
    #[serde(rename = "isSystem")]
    is_system: bool,
    #[serde(rename = "totalSize")]
    file_size: i64,
    #[serde(rename = "downloadSize")]
    download_length: i64,
    #[serde(rename = "appId")]
    app_id: i64,
    #[serde(rename = "name")]
    app_name: String,
    #[serde(rename = "pkg")]
    package_name: String,
    #[serde(rename = "status", default = "unknown_status")]
    init_status: i32,
}

fn unknown_status() -> i32 {
    -1
}

#[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
struct Account {
    email: Option<String>,
    active: bool,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    gender: Option<String>,
}

#[test]
fn get_list_reads_complex_elements_from_root() {
    let downloads: Vec<DownloadInfo> = get_list(DOWNLOADS, None).unwrap();
    assert_eq!(downloads.len(), 3);
    assert_eq!(downloads[1].app_name, "爱奇艺 HD");
    assert_eq!(downloads[2].app_id, 9_268_865_956);
    assert_eq!(downloads[2].init_status, 7);
}

#[test]
fn get_list_reads_children_of_wrapper() {
    let roles: Vec<String> = get_list(ACCOUNT, Some("roles")).unwrap();
    assert_eq!(roles, vec!["User".to_string(), "Admin".to_string()]);

    let numbers: Vec<i32> = get_list("[1,2,3,4,5]", Some("")).unwrap();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
}

#[test]
fn get_list_missing_wrapper_is_not_found() {
    let err = get_list::<String>(ACCOUNT, Some("groups")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.path(), Some("groups"));

    let err = get_list::<i32>(ACCOUNT, Some("roles")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn get_dictionary_skips_null_and_unfit_entries() {
    let text = r#"{"data":{"a":{"x":1,"y":2,"z":3},"b":null,"c":"oops","d":{"x":0,"y":0,"z":1}}}"#;
    let vectors: BTreeMap<String, Vector3> = get_dictionary(text, Some("data")).unwrap();
    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors["a"], Vector3::from([1.0, 2.0, 3.0]));
    assert!(!vectors.contains_key("b"));

    let empty: BTreeMap<String, Vector3> = get_dictionary(text, Some("missing")).unwrap();
    assert!(empty.is_empty());

    let whole: BTreeMap<String, i32> = get_dictionary(r#"{"a":1,"b":2}"#, None).unwrap();
    assert_eq!(whole.get("b"), Some(&2));
}

#[test]
fn try_deserialize_field_reads_top_level_values() {
    let doc = r#"{"errCode":0,"versionName":"16.0.27","start":true,"data":{"scover":"x"}}"#;
    assert_eq!(try_deserialize_field::<i32>(doc, "errCode"), Some(0));
    assert_eq!(
        try_deserialize_field::<String>(doc, "versionName").as_deref(),
        Some("16.0.27")
    );
    assert_eq!(try_deserialize_field::<bool>(doc, "start"), Some(true));
    assert_eq!(try_deserialize_field::<i32>(doc, "UnExist"), None);
    assert_eq!(try_deserialize_field::<i32>("{broken", "errCode"), None);
}

#[test]
fn try_populate_field_keeps_existing_values() {
    let doc = r#"{"data":{"active":true,"roles":["Ben"]}}"#;
    let mut account = Account {
        gender: Some("Female".into()),
        roles: vec!["User".into()],
        ..Account::default()
    };
    assert!(try_populate_field(doc, "data", &mut account));
    assert!(account.active);
    assert_eq!(account.roles, vec!["User".to_string(), "Ben".to_string()]);
    assert_eq!(account.gender.as_deref(), Some("Female"));

    assert!(!try_populate_field(doc, "missing", &mut account));
}

#[test]
fn populate_object_append_and_replace() {
    let incoming = r#"{"email":"ops@example.com","active":true,"roles":["Ben","Tony"]}"#;
    let mut account: Account = deserialize_object(ACCOUNT).unwrap();
    populate_object(incoming, &mut account, PopulateOptions::default()).unwrap();
    assert_eq!(account.roles.len(), 4);

    let mut account: Account = deserialize_object(ACCOUNT).unwrap();
    populate_object(incoming, &mut account, PopulateOptions::replace_lists()).unwrap();
    assert_eq!(account.roles, vec!["Ben".to_string(), "Tony".to_string()]);
}

#[test]
fn select_and_children_follow_paths() {
    let text = r#"{"data":{"items":[{"id":1},{"id":2}]}}"#;
    assert_eq!(
        select_fragment(text, "data.items[1].id").unwrap(),
        Some(json!(2))
    );
    assert_eq!(select_fragment(text, "data.nope").unwrap(), None);
    assert_eq!(
        fragment_children(text, "data.items").unwrap(),
        Some(vec![json!({"id": 1}), json!({"id": 2})])
    );
    assert_eq!(
        select_fragment(text, "data..items").unwrap_err().kind(),
        ErrorKind::Usage
    );
}

#[test]
fn serialize_object_matches_field_order() {
    let account: Account = deserialize_object(ACCOUNT).unwrap();
    assert_eq!(
        serialize_object(&account).unwrap(),
        r#"{"email":"ops@example.com","active":true,"roles":["User","Admin"],"gender":null}"#
    );
}
