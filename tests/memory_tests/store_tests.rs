//! In-process Store Tests
//!
//! Tests for the memory transport at the raw reply level.

use std::thread;

use bytes::Bytes;
use jsonkv::memory::{Fault, Submission};
use jsonkv::protocol::Reply;
use jsonkv::transport::{BatchReply, Transport};
use jsonkv::MemoryTransport;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn cmd(parts: &[&str]) -> Vec<Bytes> {
    parts.iter().map(|p| Bytes::copy_from_slice(p.as_bytes())).collect()
}

fn send(store: &mut MemoryTransport, parts: &[&str]) -> Reply {
    store.send_command(&cmd(parts)).unwrap()
}

// =============================================================================
// Single Commands
// =============================================================================

#[test]
fn test_set_and_get_raw_replies() {
    let mut store = MemoryTransport::new();

    assert_eq!(send(&mut store, &["JSON.SET", "doc", ".", r#"{"a":[1]}"#]), Reply::ok());
    assert_eq!(send(&mut store, &["JSON.GET", "doc", ".a"]), Reply::bulk("[1]"));
    assert_eq!(send(&mut store, &["JSON.GET", "doc", "$.a"]), Reply::bulk("[[1]]"));
    assert_eq!(send(&mut store, &["JSON.GET", "missing", "."]), Reply::nil());
}

#[test]
fn test_new_key_must_start_at_root() {
    let mut store = MemoryTransport::new();

    let reply = send(&mut store, &["JSON.SET", "doc", ".a", "1"]);
    assert!(reply.is_error());
    assert!(store.keys().is_empty());
}

#[test]
fn test_legacy_missing_path_error() {
    let mut store = MemoryTransport::new();
    send(&mut store, &["JSON.SET", "doc", ".", "{}"]);

    match send(&mut store, &["JSON.GET", "doc", ".nope"]) {
        Reply::Error(message) => assert!(message.contains("does not exist")),
        other => panic!("Expected error reply, got {:?}", other),
    }
}

#[test]
fn test_wrong_arity_rejected() {
    let mut store = MemoryTransport::new();

    assert!(send(&mut store, &["JSON.SET", "doc"]).is_error());
    assert!(send(&mut store, &["JSON.MSET", "a", ".", "1", "b"]).is_error());
    assert!(send(&mut store, &["NOT.A.VERB"]).is_error());
}

#[test]
fn test_mset_all_or_nothing() {
    let mut store = MemoryTransport::new();

    let reply = send(&mut store, &["JSON.MSET", "a", ".", "1", "b", ".x", "2"]);
    assert!(reply.is_error());
    assert!(store.keys().is_empty());

    let reply = send(&mut store, &["JSON.MSET", "a", ".", "1", "b", ".", "2"]);
    assert_eq!(reply, Reply::ok());
    assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_expire_and_persist() {
    let mut store = MemoryTransport::new();
    send(&mut store, &["JSON.SET", "doc", ".", "1"]);

    assert_eq!(send(&mut store, &["EXPIRE", "doc", "100"]), Reply::Integer(1));
    assert!(store.time_to_live("doc").is_some());
    assert_eq!(send(&mut store, &["PERSIST", "doc"]), Reply::Integer(1));
    assert_eq!(store.time_to_live("doc"), None);

    // A non-positive expiry deletes the key
    assert_eq!(send(&mut store, &["EXPIRE", "doc", "0"]), Reply::Integer(1));
    assert_eq!(store.document("doc"), None);
}

#[test]
fn test_expire_out_of_range_rejected() {
    let mut store = MemoryTransport::new();
    send(&mut store, &["JSON.SET", "doc", ".", "1"]);

    let huge = i64::MAX.to_string();
    match send(&mut store, &["EXPIRE", "doc", huge.as_str()]) {
        Reply::Error(message) => assert!(message.contains("invalid expire time")),
        other => panic!("Expected error reply, got {:?}", other),
    }

    // The key keeps no expiry and the store stays usable
    assert_eq!(store.time_to_live("doc"), None);
    assert_eq!(send(&mut store, &["EXPIRE", "doc", "10"]), Reply::Integer(1));
}

#[test]
fn test_debug_help_lists_subcommands() {
    let mut store = MemoryTransport::new();

    match send(&mut store, &["JSON.DEBUG", "HELP"]) {
        Reply::Array(Some(lines)) => assert_eq!(lines.len(), 2),
        other => panic!("Expected array reply, got {:?}", other),
    }
}

// =============================================================================
// Batches
// =============================================================================

#[test]
fn test_non_atomic_batch_continues_after_error() {
    let mut store = MemoryTransport::new();
    let commands = vec![
        cmd(&["JSON.SET", "doc", ".", "[]"]),
        cmd(&["JSON.STRLEN", "doc", "."]),
        cmd(&["JSON.ARRAPPEND", "doc", ".", "1"]),
    ];

    match store.send_batch(&commands, false, None).unwrap() {
        BatchReply::Replies(replies) => {
            assert_eq!(replies.len(), 3);
            assert_eq!(replies[0], Reply::ok());
            assert!(replies[1].is_error());
            assert_eq!(replies[2], Reply::Integer(1));
        }
        other => panic!("Expected replies, got {:?}", other),
    }
}

#[test]
fn test_atomic_batch_staged_until_commit() {
    let mut store = MemoryTransport::new();
    let commands = vec![
        cmd(&["JSON.SET", "doc", ".", "[]"]),
        cmd(&["JSON.STRLEN", "doc", "."]),
    ];

    let reply = store.send_batch(&commands, true, None).unwrap();
    assert!(matches!(reply, BatchReply::Aborted { index: 1, .. }));
    assert_eq!(store.document("doc"), None);
}

#[test]
fn test_fault_is_one_shot() {
    let mut store = MemoryTransport::new();
    store.inject_fault(Fault::Disconnect);

    assert!(store.send_command(&cmd(&["PING"])).is_err());
    assert_eq!(send(&mut store, &["PING"]), Reply::Status("PONG".into()));
}

#[test]
fn test_abort_fault_waits_for_atomic_batch() {
    let mut store = MemoryTransport::new();
    store.inject_fault(Fault::AbortAt(0));

    // Single commands do not consume the abort
    assert_eq!(send(&mut store, &["PING"]), Reply::Status("PONG".into()));

    let reply = store
        .send_batch(&[cmd(&["JSON.SET", "doc", ".", "1"])], true, None)
        .unwrap();
    assert!(matches!(reply, BatchReply::Aborted { index: 0, .. }));
}

#[test]
fn test_history_records_round_trips() {
    let mut store = MemoryTransport::new();
    send(&mut store, &["PING"]);
    store
        .send_batch(&[cmd(&["PING"]), cmd(&["PING"])], false, Some("hint"))
        .unwrap();

    let history = store.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], Submission::Command(vec!["PING".to_string()]));
    assert_eq!(history[1].verbs(), vec!["PING", "PING"]);

    store.clear_history();
    assert!(store.history().is_empty());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_clones_share_keyspace_across_threads() {
    let store = MemoryTransport::new();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let mut handle = store.clone();
            thread::spawn(move || {
                for j in 0..25 {
                    let key = format!("doc-{}-{}", i, j);
                    let value = json!({"i": i}).to_string();
                    let reply = handle
                        .send_command(&cmd(&["JSON.SET", key.as_str(), ".", value.as_str()]))
                        .unwrap();
                    assert_eq!(reply, Reply::ok());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.keys().len(), 100);
    assert_eq!(store.document("doc-3-24"), Some(json!({"i": 3})));
}
