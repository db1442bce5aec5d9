//! Client Tests
//!
//! Tests for immediate document and key operations against the in-process store.

use jsonkv::memory::{Fault, Submission};
use jsonkv::{Client, Config, JsonCommands, JsonKvError, JsonReply, KeyCommands, MemoryTransport, RawDocument, SetOptions};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn client() -> (Client<MemoryTransport>, MemoryTransport) {
    let store = MemoryTransport::new();
    (Client::new(store.clone(), Config::default()), store)
}

// =============================================================================
// Document Lifecycle
// =============================================================================

#[test]
fn test_set_nan_fails_without_round_trip() {
    let (mut client, store) = client();

    let result = client.set("doc", None, &vec![0.5, f64::NAN], SetOptions::new());
    assert!(matches!(result, Err(JsonKvError::Encoding(_))));

    let result = client.arrappend("doc", None, &[1.0, f64::INFINITY]);
    assert!(matches!(result, Err(JsonKvError::Encoding(_))));

    assert!(store.history().is_empty());
    assert_eq!(store.document("doc"), None);
}

#[test]
fn test_huge_ttl_is_rejected() {
    let (mut client, store) = client();
    client.set("doc", None, &json!(1), SetOptions::new()).unwrap();

    let err = client.expire("doc", i64::MAX as u64).unwrap_err();
    assert!(matches!(err, JsonKvError::Command(_)));

    let err = client
        .set("other", None, &json!(2), SetOptions::new().ttl(i64::MAX as u64))
        .unwrap_err();
    assert_eq!(err.batch_index(), Some(1));
    assert_eq!(store.document("other"), None);
    assert_eq!(store.document("doc"), Some(json!(1)));
}

#[test]
fn test_set_get_arrappend_delete() {
    let (mut client, store) = client();

    let reply = client.set("doc1", None, &json!({"a": 1}), SetOptions::new()).unwrap();
    assert_eq!(reply, JsonReply::Ok);
    assert_eq!(client.get("doc1", None).unwrap(), Some(json!({"a": 1})));

    client
        .set("doc1", Some(".a"), &json!({"list": [1]}), SetOptions::new())
        .unwrap();
    let lengths = client.arrappend("doc1", Some(".a.list"), &[2, 3]).unwrap();
    assert_eq!(lengths, vec![Some(3)]);
    assert_eq!(client.get("doc1", Some(".a.list")).unwrap(), Some(json!([1, 2, 3])));

    assert_eq!(client.delete("doc1", None).unwrap(), 1);
    assert_eq!(client.get("doc1", None).unwrap(), None);
    assert!(store.keys().is_empty());
}

#[test]
fn test_absent_distinct_from_null() {
    let (mut client, _) = client();

    client.set("nothing", None, &Value::Null, SetOptions::new()).unwrap();

    assert_eq!(client.get("nothing", None).unwrap(), Some(Value::Null));
    assert_eq!(client.get("never-set", None).unwrap(), None);
}

#[test]
fn test_missing_path_is_absent() {
    let (mut client, _) = client();
    client.set("doc", None, &json!({"a": 1}), SetOptions::new()).unwrap();

    assert_eq!(client.get("doc", Some(".b")).unwrap(), None);
}

#[test]
fn test_get_multiple_paths() {
    let (mut client, _) = client();
    client.set("doc", None, &json!({"a": 1, "b": "x"}), SetOptions::new()).unwrap();

    let value = client.get_paths("doc", &[".a", ".b"], false).unwrap();
    assert_eq!(value, Some(json!({".a": 1, ".b": "x"})));
}

#[test]
fn test_mget_one_entry_per_key() {
    let (mut client, _) = client();
    client.set("a", None, &json!({"n": 1}), SetOptions::new()).unwrap();
    client.set("b", None, &json!({"n": 2}), SetOptions::new()).unwrap();

    let values = client.mget(&["a", "missing", "b"], Some(".n")).unwrap();
    assert_eq!(values, vec![Some(json!(1)), None, Some(json!(2))]);
}

// =============================================================================
// Conditional and Expiring Writes
// =============================================================================

#[test]
fn test_nx_and_xx_sends_nothing() {
    let (mut client, store) = client();

    let result = client.set("doc", None, &1, SetOptions::new().nx().xx());
    assert!(matches!(result, Err(JsonKvError::Argument(_))));
    assert!(store.history().is_empty());
}

#[test]
fn test_nx_skips_existing() {
    let (mut client, _) = client();
    client.set("doc", None, &json!({"a": 1}), SetOptions::new()).unwrap();

    let reply = client.set("doc", Some(".a"), &2, SetOptions::new().nx()).unwrap();
    assert_eq!(reply, JsonReply::Absent);
    assert_eq!(client.get("doc", Some(".a")).unwrap(), Some(json!(1)));

    let reply = client.set("doc", Some(".b"), &2, SetOptions::new().xx()).unwrap();
    assert_eq!(reply, JsonReply::Absent);
}

#[test]
fn test_set_with_ttl_is_one_atomic_batch() {
    let (mut client, store) = client();

    let reply = client
        .set("doc", None, &json!({"a": 1}), SetOptions::new().ttl(60))
        .unwrap();
    assert_eq!(reply, JsonReply::Array(vec![JsonReply::Ok, JsonReply::Integer(1)]));

    let history = store.history();
    assert_eq!(history.len(), 1);
    match &history[0] {
        Submission::Batch { commands, atomic, .. } => {
            assert!(*atomic);
            assert_eq!(commands.len(), 2);
            assert_eq!(commands[0][0], "JSON.SET");
            assert_eq!(commands[1], vec!["EXPIRE", "doc", "60"]);
        }
        other => panic!("Expected an atomic batch, got {:?}", other),
    }

    let ttl = store.time_to_live("doc").unwrap();
    assert!(ttl.as_secs() > 0 && ttl.as_secs() <= 60);
    let remaining = client.ttl("doc").unwrap();
    assert!(remaining > 0 && remaining <= 60);
}

#[test]
fn test_set_with_ttl_aborted_leaves_nothing() {
    let (mut client, store) = client();
    store.inject_fault(Fault::AbortAt(1));

    let result = client.set("doc", None, &json!({"a": 1}), SetOptions::new().ttl(60));
    match result {
        Err(JsonKvError::Batch { index, .. }) => assert_eq!(index, 1),
        other => panic!("Expected batch error, got {:?}", other),
    }
    assert_eq!(store.document("doc"), None);
    assert_eq!(client.get("doc", None).unwrap(), None);
}

#[test]
fn test_set_raw_document() {
    let (mut client, _) = client();
    let doc = RawDocument::Map(vec![(b"name".to_vec(), RawDocument::from(json!("x")))]);

    client.set_raw("doc", None, doc, SetOptions::new()).unwrap();
    assert_eq!(client.get("doc", None).unwrap(), Some(json!({"name": "x"})));
}

// =============================================================================
// Document Operations
// =============================================================================

#[test]
fn test_mset_and_merge() {
    let (mut client, _) = client();

    assert!(client
        .mset(&[("a", ".", json!({"x": 1})), ("b", ".", json!([]))])
        .unwrap());
    assert!(client.merge("a", None, &json!({"x": null, "y": 2})).unwrap());
    assert_eq!(client.get("a", None).unwrap(), Some(json!({"y": 2})));
    assert_eq!(client.get("b", None).unwrap(), Some(json!([])));
}

#[test]
fn test_array_operations() {
    let (mut client, _) = client();
    client.set("doc", None, &json!({"l": [1, 2, 3]}), SetOptions::new()).unwrap();

    assert_eq!(client.arrindex("doc", Some(".l"), &2, None, None).unwrap(), vec![Some(1)]);
    assert_eq!(client.arrindex("doc", Some(".l"), &9, None, None).unwrap(), vec![Some(-1)]);
    assert_eq!(client.arrinsert("doc", Some(".l"), 0, &[0]).unwrap(), vec![Some(4)]);
    assert_eq!(client.arrlen("doc", Some(".l")).unwrap(), vec![Some(4)]);
    assert_eq!(client.arrpop("doc", Some(".l"), None).unwrap(), vec![Some(json!(3))]);
    assert_eq!(client.arrtrim("doc", Some(".l"), 1, 1).unwrap(), vec![Some(1)]);
    assert_eq!(client.get("doc", Some(".l")).unwrap(), Some(json!([1])));
}

#[test]
fn test_dollar_path_one_entry_per_match() {
    let (mut client, _) = client();
    client.set("doc", None, &json!({"l": [1], "s": "x"}), SetOptions::new()).unwrap();

    assert_eq!(client.arrlen("doc", Some("$.l")).unwrap(), vec![Some(1)]);
    assert_eq!(client.arrlen("doc", Some("$.s")).unwrap(), vec![None]);
    assert_eq!(client.arrlen("doc", Some("$.nope")).unwrap(), Vec::<Option<i64>>::new());
}

#[test]
fn test_object_operations() {
    let (mut client, _) = client();
    client.set("doc", None, &json!({"o": {"b": 1, "a": 2}}), SetOptions::new()).unwrap();

    assert_eq!(
        client.objkeys("doc", Some(".o")).unwrap(),
        vec![Some(vec!["a".to_string(), "b".to_string()])]
    );
    assert_eq!(
        client.objkeys("doc", Some("$.o")).unwrap(),
        vec![Some(vec!["a".to_string(), "b".to_string()])]
    );
    assert_eq!(
        client.objkeys("doc", Some("$.missing")).unwrap(),
        Vec::<Option<Vec<String>>>::new()
    );
    assert_eq!(client.objlen("doc", Some(".o")).unwrap(), vec![Some(2)]);
    assert_eq!(client.type_of("doc", Some(".o")).unwrap(), vec!["object".to_string()]);
    assert_eq!(client.type_of("missing", None).unwrap(), Vec::<String>::new());
}

#[test]
fn test_string_number_and_boolean_operations() {
    let (mut client, _) = client();
    client
        .set("doc", None, &json!({"s": "foo", "n": 1, "b": true}), SetOptions::new())
        .unwrap();

    assert_eq!(client.strappend("doc", Some(".s"), "bar").unwrap(), vec![Some(6)]);
    assert_eq!(client.strlen("doc", Some(".s")).unwrap(), vec![Some(6)]);
    assert_eq!(client.numincrby("doc", Some(".n"), &2).unwrap(), json!(3));
    assert_eq!(client.toggle("doc", Some(".b")).unwrap(), vec![Some(false)]);
    assert_eq!(client.toggle("doc", Some("$.b")).unwrap(), vec![Some(true)]);
    assert_eq!(client.get("doc", None).unwrap(), Some(json!({"s": "foobar", "n": 3, "b": true})));
}

#[test]
fn test_clear_and_forget() {
    let (mut client, _) = client();
    client
        .set("doc", None, &json!({"l": [1, 2], "n": 5, "k": "v"}), SetOptions::new())
        .unwrap();

    assert_eq!(client.clear("doc", Some(".l")).unwrap(), 1);
    assert_eq!(client.clear("doc", Some(".n")).unwrap(), 1);
    assert_eq!(client.forget("doc", Some(".k")).unwrap(), 1);
    assert_eq!(client.get("doc", None).unwrap(), Some(json!({"l": [], "n": 0})));
}

#[test]
fn test_debug_and_resp() {
    let (mut client, _) = client();
    client.set("doc", None, &json!({"a": 1}), SetOptions::new()).unwrap();

    let memory = client.debug("MEMORY", Some("doc"), None).unwrap();
    assert_eq!(memory, JsonReply::Integer(r#"{"a":1}"#.len() as i64));

    let resp = client.resp("doc", None).unwrap();
    assert_eq!(
        resp,
        JsonReply::Array(vec![
            JsonReply::Text("{".into()),
            JsonReply::Text("a".into()),
            JsonReply::Integer(1),
        ])
    );
}

// =============================================================================
// Error Propagation
// =============================================================================

#[test]
fn test_command_error_propagates() {
    let (mut client, _) = client();
    client.set("doc", None, &json!({"s": "x"}), SetOptions::new()).unwrap();

    let result = client.arrappend("doc", Some(".s"), &[1]);
    assert!(matches!(result, Err(JsonKvError::Command(_))));
}

#[test]
fn test_transport_error_propagates() {
    let (mut client, store) = client();
    store.inject_fault(Fault::Disconnect);

    let result = client.get("doc", None);
    match result {
        Err(e) => assert!(e.is_transport()),
        Ok(v) => panic!("Expected transport error, got {:?}", v),
    }
}

// =============================================================================
// Key Commands
// =============================================================================

#[test]
fn test_key_commands() {
    let (mut client, _) = client();
    client.set("a", None, &1, SetOptions::new()).unwrap();

    assert_eq!(client.ping().unwrap(), "PONG");
    assert_eq!(client.exists(&["a", "b"]).unwrap(), 1);
    assert_eq!(client.ttl("a").unwrap(), -1);
    assert!(client.expire("a", 100).unwrap());
    assert!(client.persist("a").unwrap());
    assert!(!client.expire("b", 100).unwrap());
    assert_eq!(client.del_keys(&["a", "b"]).unwrap(), 1);
    assert_eq!(client.ttl("a").unwrap(), -2);
}

#[test]
fn test_no_escape_from_config() {
    let store = MemoryTransport::new();
    let config = Config::builder().no_escape(true).build();
    let mut client = Client::new(store.clone(), config);

    client.get("doc", None).unwrap();
    assert_eq!(
        store.history(),
        vec![Submission::Command(vec![
            "JSON.GET".to_string(),
            "doc".to_string(),
            "NOESCAPE".to_string(),
            ".".to_string(),
        ])]
    );
}
