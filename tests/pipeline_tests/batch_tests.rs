//! Batch Tests
//!
//! Tests for atomic and non-atomic batch execution.

use jsonkv::memory::{Fault, Submission};
use jsonkv::protocol::{Command, ReplyKind};
use jsonkv::{Client, Config, JsonCommands, JsonKvError, JsonReply, KeyCommands, MemoryTransport, SetOptions};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn client() -> (Client<MemoryTransport>, MemoryTransport) {
    let store = MemoryTransport::new();
    (Client::new(store.clone(), Config::default()), store)
}

fn seeded() -> (Client<MemoryTransport>, MemoryTransport) {
    let (mut client, store) = client();
    client
        .set("doc", None, &json!({"l": [1], "s": "x", "n": 1}), SetOptions::new())
        .unwrap();
    store.clear_history();
    (client, store)
}

// =============================================================================
// Queueing
// =============================================================================

#[test]
fn test_operations_queue_without_io() {
    let (mut client, store) = seeded();
    let mut batch = client.pipeline(false, None);

    batch.arrappend("doc", Some(".l"), &[2]).unwrap();
    batch.get("doc", None).unwrap();

    assert_eq!(batch.len(), 2);
    assert!(!batch.is_atomic());
    assert_eq!(batch.commands()[0].verb(), "JSON.ARRAPPEND");
    assert!(store.history().is_empty());
}

#[test]
fn test_argument_error_queues_nothing() {
    let (mut client, _) = client();
    let mut batch = client.pipeline(false, None);

    let result = batch.set("doc", None, &1, SetOptions::new().nx().xx());
    assert!(matches!(result, Err(JsonKvError::Argument(_))));
    assert!(batch.is_empty());
}

#[test]
fn test_empty_batch_no_round_trip() {
    let (mut client, store) = client();

    let results = client.transaction().execute().unwrap();
    assert!(results.is_empty());
    assert!(store.history().is_empty());
}

#[test]
fn test_shard_hint_passed_through() {
    let (mut client, store) = seeded();
    let mut batch = client.pipeline(true, Some("shard-7"));
    assert_eq!(batch.shard_hint(), Some("shard-7"));
    batch.ping().unwrap();
    batch.execute().unwrap();

    match &store.history()[0] {
        Submission::Batch { shard_hint, atomic, .. } => {
            assert_eq!(shard_hint.as_deref(), Some("shard-7"));
            assert!(*atomic);
        }
        other => panic!("Expected batch, got {:?}", other),
    }
}

#[test]
fn test_pipeline_default_follows_config() {
    let mut client = Client::new(
        MemoryTransport::new(),
        Config::builder().transaction(false).build(),
    );
    assert!(!client.pipeline_default().is_atomic());
    assert!(client.transaction().is_atomic());
}

// =============================================================================
// Result Decoding
// =============================================================================

#[test]
fn test_results_decoded_per_command() {
    let (mut client, store) = seeded();
    let mut batch = client.pipeline(false, None);

    let appended = batch.arrappend("doc", Some(".l"), &[2, 3]).unwrap();
    let value = batch.get("doc", Some(".l")).unwrap();
    let kind = batch.type_of("doc", Some(".s")).unwrap();
    let missing = batch.get("nope", None).unwrap();
    let mut results = batch.execute().unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(results.take(appended).unwrap(), vec![Some(3)]);
    assert_eq!(results.take(value).unwrap(), Some(json!([1, 2, 3])));
    assert_eq!(results.take(kind).unwrap(), vec!["string".to_string()]);
    assert_eq!(results.take(missing).unwrap(), None);

    assert_eq!(store.history().len(), 1);
    assert_eq!(
        store.history()[0].verbs(),
        vec!["JSON.ARRAPPEND", "JSON.GET", "JSON.TYPE", "JSON.GET"]
    );
}

#[test]
fn test_result_taken_once() {
    let (mut client, _) = seeded();
    let mut batch = client.pipeline(false, None);
    let len = batch.arrlen("doc", Some(".l")).unwrap();
    let mut results = batch.execute().unwrap();

    assert_eq!(results.take(len).unwrap(), vec![Some(1)]);
    assert!(matches!(results.take(len), Err(JsonKvError::Argument(_))));
}

#[test]
fn test_handle_from_other_batch_rejected() {
    let (mut client, _) = seeded();

    let mut first = client.pipeline(false, None);
    let stale = first.get("doc", None).unwrap();
    drop(first);

    let mut second = client.pipeline(false, None);
    let len = second.arrlen("doc", Some(".l")).unwrap();
    let mut results = second.execute().unwrap();

    match results.take(stale) {
        Err(JsonKvError::Argument(message)) => assert!(message.contains("batch")),
        other => panic!("Expected argument error, got {:?}", other),
    }
    // The mismatched claim leaves the real result in place
    assert_eq!(results.take(len).unwrap(), vec![Some(1)]);
}

#[test]
fn test_handle_from_empty_batch_rejected() {
    let (mut client, _) = seeded();

    let mut first = client.pipeline(false, None);
    let stale = first.ping().unwrap();
    drop(first);

    let mut results = client.pipeline(false, None).execute().unwrap();
    assert!(matches!(results.take(stale), Err(JsonKvError::Argument(_))));
}

// =============================================================================
// Non-atomic Failures
// =============================================================================

#[test]
fn test_non_atomic_failure_is_positional() {
    let (mut client, store) = seeded();
    let mut batch = client.pipeline(false, None);

    let first = batch.arrappend("doc", Some(".l"), &[2]).unwrap();
    let failing = batch.arrappend("doc", Some(".s"), &[2]).unwrap();
    let last = batch.strappend("doc", Some(".s"), "y").unwrap();
    let mut results = batch.execute_with(false).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results.take(first).unwrap(), vec![Some(2)]);
    assert!(matches!(results.take(failing), Err(JsonKvError::Command(_))));
    assert_eq!(results.take(last).unwrap(), vec![Some(2)]);

    assert_eq!(store.document("doc"), Some(json!({"l": [1, 2], "s": "xy", "n": 1})));
}

#[test]
fn test_non_atomic_raise_on_error() {
    let (mut client, store) = seeded();
    let mut batch = client.pipeline(false, None);

    batch.numincrby("doc", Some(".n"), &1).unwrap();
    batch.numincrby("doc", Some(".s"), &1).unwrap();
    batch.numincrby("doc", Some(".n"), &1).unwrap();

    match batch.execute_with(true) {
        Err(JsonKvError::Batch { index, .. }) => assert_eq!(index, 1),
        other => panic!("Expected batch error, got {:?}", other),
    }

    // Non-atomic commands already ran on the store
    assert_eq!(store.document("doc").unwrap()["n"], json!(3));
}

#[test]
fn test_into_results_in_order() {
    let (mut client, _) = seeded();
    let mut batch = client.pipeline(false, None);
    batch.push(Command::new("JSON.STRLEN", ReplyKind::Integers).arg("doc").arg(".s"));
    batch.push(Command::new("JSON.STRLEN", ReplyKind::Integers).arg("doc").arg(".l"));

    let results = batch.execute_with(false).unwrap().into_results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap(), &JsonReply::Integer(1));
    assert!(results[1].is_err());
}

// =============================================================================
// Atomic Batches
// =============================================================================

#[test]
fn test_atomic_all_applied() {
    let (mut client, store) = seeded();
    let mut batch = client.transaction();

    batch.arrappend("doc", Some(".l"), &[2]).unwrap();
    batch.set("other", None, &json!(true), SetOptions::new()).unwrap();
    batch.execute().unwrap();

    assert_eq!(store.document("doc").unwrap()["l"], json!([1, 2]));
    assert_eq!(store.document("other"), Some(json!(true)));
}

#[test]
fn test_atomic_invalid_command_applies_nothing() {
    let (mut client, store) = seeded();
    let mut batch = client.transaction();

    batch.arrappend("doc", Some(".l"), &[2]).unwrap();
    batch.push(Command::new("JSON.NOPE", ReplyKind::Raw).arg("doc"));
    batch.set("other", None, &1, SetOptions::new()).unwrap();

    match batch.execute() {
        Err(JsonKvError::Batch { index, message }) => {
            assert_eq!(index, 1);
            assert!(message.contains("unknown command"));
        }
        other => panic!("Expected batch error, got {:?}", other),
    }

    assert_eq!(store.document("doc").unwrap()["l"], json!([1]));
    assert_eq!(store.document("other"), None);
}

#[test]
fn test_atomic_runtime_error_applies_nothing() {
    let (mut client, store) = seeded();
    let mut batch = client.transaction();

    batch.arrappend("doc", Some(".l"), &[2]).unwrap();
    batch.arrappend("doc", Some(".s"), &[2]).unwrap();

    let result = batch.execute_with(false);
    assert_eq!(result.unwrap_err().batch_index(), Some(1));
    assert_eq!(store.document("doc").unwrap()["l"], json!([1]));
}

#[test]
fn test_atomic_abort_mid_batch_leaves_no_effect() {
    let (mut client, store) = seeded();
    store.inject_fault(Fault::AbortAt(2));
    let mut batch = client.transaction();

    batch.arrappend("doc", Some(".l"), &[2]).unwrap();
    batch.set("doc2", None, &json!({}), SetOptions::new().ttl(30)).unwrap();
    let result = batch.execute();

    assert_eq!(result.unwrap_err().batch_index(), Some(2));
    assert_eq!(store.document("doc").unwrap()["l"], json!([1]));
    assert_eq!(store.document("doc2"), None);
    assert_eq!(store.time_to_live("doc2"), None);
}

#[test]
fn test_set_with_ttl_in_atomic_batch() {
    let (mut client, store) = seeded();
    let mut batch = client.transaction();

    let written = batch.set("doc2", None, &json!({"a": 1}), SetOptions::new().ttl(30)).unwrap();
    let exists = batch.exists(&["doc2"]).unwrap();
    let mut results = batch.execute().unwrap();

    assert_eq!(
        results.take(written).unwrap(),
        JsonReply::Array(vec![JsonReply::Ok, JsonReply::Integer(1)])
    );
    assert_eq!(results.take(exists).unwrap(), 1);
    assert_eq!(
        store.history()[0].verbs(),
        vec!["JSON.SET", "EXPIRE", "EXISTS"]
    );
    assert!(store.time_to_live("doc2").is_some());
}

#[test]
fn test_set_with_ttl_rejected_in_non_atomic_batch() {
    let (mut client, _) = client();
    let mut batch = client.pipeline(false, None);

    let result = batch.set("doc", None, &1, SetOptions::new().ttl(30));
    assert!(matches!(result, Err(JsonKvError::Argument(_))));
    assert!(batch.is_empty());
}

// =============================================================================
// Transport Failures
// =============================================================================

#[test]
fn test_disconnect_fails_whole_batch() {
    let (mut client, store) = seeded();
    store.inject_fault(Fault::Disconnect);
    let mut batch = client.pipeline(false, None);

    batch.arrappend("doc", Some(".l"), &[2]).unwrap();
    batch.get("doc", None).unwrap();

    let err = batch.execute().unwrap_err();
    assert!(err.is_transport());
    assert_eq!(store.document("doc").unwrap()["l"], json!([1]));
}
