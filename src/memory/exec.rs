//! Command execution for the in-process store
//!
//! Every command returns a `Reply`; store-side failures are error replies,
//! never Rust errors, matching what a remote store would send.

use std::time::{Duration, Instant};

use bytes::Bytes;
use serde_json::{Map, Number, Value};

use crate::protocol::Reply;
use super::path::{self, ParsedPath};
use super::store::Keyspace;

type Outcome = std::result::Result<Reply, String>;

const MISSING_KEY: &str = "ERR could not perform this operation on a key that doesn't exist";

/// (verb, minimum args, maximum args) excluding the verb itself
const VERBS: &[(&str, usize, Option<usize>)] = &[
    ("JSON.GET", 1, None),
    ("JSON.MGET", 2, None),
    ("JSON.SET", 3, Some(4)),
    ("JSON.MSET", 3, None),
    ("JSON.MERGE", 3, Some(3)),
    ("JSON.DEL", 1, Some(2)),
    ("JSON.FORGET", 1, Some(2)),
    ("JSON.CLEAR", 1, Some(2)),
    ("JSON.ARRAPPEND", 3, None),
    ("JSON.ARRINDEX", 3, Some(5)),
    ("JSON.ARRINSERT", 4, None),
    ("JSON.ARRLEN", 1, Some(2)),
    ("JSON.ARRPOP", 1, Some(3)),
    ("JSON.ARRTRIM", 4, Some(4)),
    ("JSON.TYPE", 1, Some(2)),
    ("JSON.RESP", 1, Some(2)),
    ("JSON.OBJKEYS", 1, Some(2)),
    ("JSON.OBJLEN", 1, Some(2)),
    ("JSON.NUMINCRBY", 3, Some(3)),
    ("JSON.STRLEN", 1, Some(2)),
    ("JSON.STRAPPEND", 2, Some(3)),
    ("JSON.TOGGLE", 1, Some(2)),
    ("JSON.DEBUG", 1, Some(3)),
    ("EXPIRE", 2, Some(2)),
    ("PERSIST", 1, Some(1)),
    ("TTL", 1, Some(1)),
    ("EXISTS", 1, None),
    ("DEL", 1, None),
    ("PING", 0, Some(1)),
];

/// Queue-time check: known verb and acceptable argument count
pub(crate) fn validate(tokens: &[Bytes]) -> std::result::Result<(), String> {
    let verb = verb_of(tokens)?;
    let argc = tokens.len() - 1;
    let (_, min, max) = VERBS
        .iter()
        .find(|(name, _, _)| *name == verb)
        .ok_or_else(|| format!("ERR unknown command '{}'", verb))?;

    let mset_grouping = verb == "JSON.MSET" && argc % 3 != 0;
    if argc < *min || max.is_some_and(|max| argc > max) || mset_grouping {
        return Err(format!(
            "ERR wrong number of arguments for '{}' command",
            verb.to_ascii_lowercase()
        ));
    }
    Ok(())
}

fn verb_of(tokens: &[Bytes]) -> std::result::Result<String, String> {
    tokens
        .first()
        .map(|t| String::from_utf8_lossy(t).to_ascii_uppercase())
        .ok_or_else(|| "ERR empty command".to_string())
}

/// Execute one command against the keyspace
pub(crate) fn run(ks: &mut Keyspace, tokens: &[Bytes]) -> Reply {
    let outcome = validate(tokens).and_then(|_| {
        let verb = verb_of(tokens)?;
        let args: Vec<String> = tokens[1..]
            .iter()
            .map(|t| String::from_utf8_lossy(t).into_owned())
            .collect();
        dispatch(ks, &verb, &args)
    });
    outcome.unwrap_or_else(Reply::Error)
}

fn dispatch(ks: &mut Keyspace, verb: &str, args: &[String]) -> Outcome {
    match verb {
        "JSON.GET" => json_get(ks, args),
        "JSON.MGET" => json_mget(ks, args),
        "JSON.SET" => json_set(ks, args),
        "JSON.MSET" => json_mset(ks, args),
        "JSON.MERGE" => json_merge(ks, args),
        "JSON.DEL" | "JSON.FORGET" => json_del(ks, args),
        "JSON.CLEAR" => json_clear(ks, args),
        "JSON.ARRAPPEND" => json_arrappend(ks, args),
        "JSON.ARRINDEX" => json_arrindex(ks, args),
        "JSON.ARRINSERT" => json_arrinsert(ks, args),
        "JSON.ARRLEN" => json_arrlen(ks, args),
        "JSON.ARRPOP" => json_arrpop(ks, args),
        "JSON.ARRTRIM" => json_arrtrim(ks, args),
        "JSON.TYPE" => json_type(ks, args),
        "JSON.RESP" => json_resp(ks, args),
        "JSON.OBJKEYS" => json_objkeys(ks, args),
        "JSON.OBJLEN" => json_objlen(ks, args),
        "JSON.NUMINCRBY" => json_numincrby(ks, args),
        "JSON.STRLEN" => json_strlen(ks, args),
        "JSON.STRAPPEND" => json_strappend(ks, args),
        "JSON.TOGGLE" => json_toggle(ks, args),
        "JSON.DEBUG" => json_debug(ks, args),
        "EXPIRE" => expire(ks, args),
        "PERSIST" => persist(ks, args),
        "TTL" => ttl(ks, args),
        "EXISTS" => Ok(Reply::Integer(args.iter().filter(|k| ks.get(k).is_some()).count() as i64)),
        "DEL" => Ok(Reply::Integer(args.iter().filter(|k| ks.remove(k)).count() as i64)),
        "PING" => Ok(args.first().map(|m| Reply::bulk(m.clone())).unwrap_or_else(|| Reply::Status("PONG".into()))),
        other => Err(format!("ERR unknown command '{}'", other)),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn path_arg(args: &[String], index: usize) -> (String, std::result::Result<ParsedPath, String>) {
    let raw = args.get(index).cloned().unwrap_or_else(|| ".".to_string());
    let parsed = path::parse(&raw);
    (raw, parsed)
}

fn parse_json(text: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(text).map_err(|e| format!("ERR expected value: {}", e))
}

fn parse_int(text: &str) -> std::result::Result<i64, String> {
    text.parse::<i64>()
        .map_err(|_| "ERR value is not an integer or out of range".to_string())
}

fn json_bulk(value: &Value) -> Reply {
    Reply::bulk(value.to_string())
}

fn wrong_type(expected: &str, found: &Value) -> String {
    format!(
        "ERR WRONGTYPE wrong type of path value - expected {} but found {}",
        expected,
        path::type_name(found)
    )
}

/// Apply `f` to the value at `path`, shaping the reply for the path syntax
///
/// Legacy paths reply with `f`'s reply or error. `$` paths reply with an
/// array holding one entry per match, where a failed match is nil.
fn per_match<F>(target: Option<&mut Value>, path: &ParsedPath, raw: &str, f: F) -> Outcome
where
    F: FnOnce(&mut Value) -> Outcome,
{
    match (target, path.multi) {
        (None, false) => Err(path::missing(raw)),
        (None, true) => Ok(Reply::array(Vec::new())),
        (Some(v), false) => f(v),
        (Some(v), true) => Ok(Reply::array(vec![f(v).unwrap_or_else(|_| Reply::nil())])),
    }
}

/// Run `f` on the document at `key`; a missing key yields `if_missing`
fn with_doc<F>(ks: &mut Keyspace, key: &str, if_missing: Outcome, f: F) -> Outcome
where
    F: FnOnce(&mut Value) -> Outcome,
{
    match ks.doc_mut(key) {
        Some(doc) => f(doc),
        None => if_missing,
    }
}

/// Shared shape of single-path commands: `VERB key [path]`
fn on_path<F>(ks: &mut Keyspace, args: &[String], if_missing: Outcome, f: F) -> Outcome
where
    F: FnOnce(&mut Value) -> Outcome,
{
    let (raw, parsed) = path_arg(args, 1);
    let parsed = parsed?;
    with_doc(ks, &args[0], if_missing, |doc| {
        per_match(path::lookup_mut(doc, &parsed.steps), &parsed, &raw, f)
    })
}

// =============================================================================
// Document Reads and Writes
// =============================================================================

fn json_get(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let mut paths: Vec<&String> = args[1..].iter().collect();
    if paths.first().is_some_and(|p| p.eq_ignore_ascii_case("NOESCAPE")) {
        paths.remove(0);
    }

    let Some(doc) = ks.doc(&args[0]) else {
        return Ok(Reply::nil());
    };

    let render = |raw: &str| -> std::result::Result<Value, String> {
        let parsed = path::parse(raw)?;
        let found = path::lookup(doc, &parsed.steps);
        match (found, parsed.multi) {
            (Some(v), false) => Ok(v.clone()),
            (None, false) => Err(path::missing(raw)),
            (found, true) => Ok(Value::Array(found.cloned().into_iter().collect())),
        }
    };

    match paths.as_slice() {
        [] => Ok(json_bulk(doc)),
        [single] => Ok(json_bulk(&render(single)?)),
        many => {
            let mut out = Map::new();
            for raw in many {
                out.insert(raw.to_string(), render(raw)?);
            }
            Ok(json_bulk(&Value::Object(out)))
        }
    }
}

fn json_mget(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let (keys, raw) = args.split_at(args.len() - 1);
    let parsed = path::parse(&raw[0])?;
    let replies = keys
        .iter()
        .map(|key| {
            let found = ks.doc(key).and_then(|doc| path::lookup(doc, &parsed.steps));
            match (found, parsed.multi) {
                (Some(v), false) => json_bulk(v),
                (None, false) => Reply::nil(),
                (found, true) if ks.doc(key).is_some() => {
                    json_bulk(&Value::Array(found.cloned().into_iter().collect()))
                }
                (_, true) => Reply::nil(),
            }
        })
        .collect();
    Ok(Reply::array(replies))
}

#[derive(Clone, Copy, PartialEq)]
enum Condition {
    Always,
    IfAbsent,
    IfPresent,
}

fn set_one(ks: &mut Keyspace, key: &str, raw: &str, value: Value, cond: Condition) -> Outcome {
    let parsed = path::parse(raw)?;

    let Some(doc) = ks.doc_mut(key) else {
        if !parsed.is_root() {
            return Err("ERR new objects must be created at the root".to_string());
        }
        if cond == Condition::IfPresent {
            return Ok(Reply::nil());
        }
        ks.insert(key, value);
        return Ok(Reply::ok());
    };

    let exists = path::lookup(doc, &parsed.steps).is_some();
    match cond {
        Condition::IfAbsent if exists => return Ok(Reply::nil()),
        Condition::IfPresent if !exists => return Ok(Reply::nil()),
        _ => {}
    }
    path::assign(doc, &parsed, value, raw)?;
    Ok(Reply::ok())
}

fn json_set(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let value = parse_json(&args[2])?;
    let cond = match args.get(3).map(|f| f.to_ascii_uppercase()).as_deref() {
        None => Condition::Always,
        Some("NX") => Condition::IfAbsent,
        Some("XX") => Condition::IfPresent,
        Some(_) => return Err("ERR syntax error".to_string()),
    };
    set_one(ks, &args[0], &args[1], value, cond)
}

fn json_mset(ks: &mut Keyspace, args: &[String]) -> Outcome {
    // All triplets apply or none do
    let mut staged = ks.clone();
    for triplet in args.chunks(3) {
        let value = parse_json(&triplet[2])?;
        set_one(&mut staged, &triplet[0], &triplet[1], value, Condition::Always)?;
    }
    *ks = staged;
    Ok(Reply::ok())
}

fn merge_patch(target: &mut Value, patch: Value) {
    match patch {
        Value::Object(fields) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                for (k, v) in fields {
                    if v.is_null() {
                        map.remove(&k);
                    } else {
                        merge_patch(map.entry(k).or_insert(Value::Null), v);
                    }
                }
            }
        }
        other => *target = other,
    }
}

fn json_merge(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let patch = parse_json(&args[2])?;
    let raw = &args[1];
    let parsed = path::parse(raw)?;

    let Some(doc) = ks.doc_mut(&args[0]) else {
        if !parsed.is_root() {
            return Err("ERR new objects must be created at the root".to_string());
        }
        let mut fresh = Value::Null;
        merge_patch(&mut fresh, patch);
        ks.insert(&args[0], fresh);
        return Ok(Reply::ok());
    };

    match path::lookup_mut(doc, &parsed.steps) {
        Some(target) => merge_patch(target, patch),
        None if !patch.is_null() => {
            let mut fresh = Value::Null;
            merge_patch(&mut fresh, patch);
            path::assign(doc, &parsed, fresh, raw)?;
        }
        None => {}
    }
    Ok(Reply::ok())
}

fn json_del(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let (_, parsed) = path_arg(args, 1);
    let parsed = parsed?;

    if parsed.is_root() {
        return Ok(Reply::Integer(ks.remove(&args[0]) as i64));
    }
    match ks.doc_mut(&args[0]) {
        Some(doc) => Ok(Reply::Integer(path::remove(doc, &parsed) as i64)),
        None => Ok(Reply::Integer(0)),
    }
}

fn json_clear(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let (_, parsed) = path_arg(args, 1);
    let parsed = parsed?;
    let Some(doc) = ks.doc_mut(&args[0]) else {
        return Ok(Reply::Integer(0));
    };
    let cleared = match path::lookup_mut(doc, &parsed.steps) {
        Some(Value::Array(items)) if !items.is_empty() => {
            items.clear();
            1
        }
        Some(Value::Object(map)) if !map.is_empty() => {
            map.clear();
            1
        }
        Some(n @ Value::Number(_)) => {
            *n = Value::from(0);
            1
        }
        _ => 0,
    };
    Ok(Reply::Integer(cleared))
}

// =============================================================================
// Arrays
// =============================================================================

fn as_array<'a>(value: &'a mut Value) -> std::result::Result<&'a mut Vec<Value>, String> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(wrong_type("array", other)),
    }
}

fn json_arrappend(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let values = args[2..]
        .iter()
        .map(|v| parse_json(v))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    on_path(ks, args, Err(MISSING_KEY.to_string()), |target| {
        let items = as_array(target)?;
        items.extend(values);
        Ok(Reply::Integer(items.len() as i64))
    })
}

/// Clamp a slice bound the way the store does (negative counts from the end)
fn clamp_bound(index: i64, len: usize) -> usize {
    let len = len as i64;
    let idx = if index < 0 { (len + index).max(0) } else { index };
    idx.min(len) as usize
}

fn json_arrindex(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let needle = parse_json(&args[2])?;
    let start = args.get(3).map(|s| parse_int(s)).transpose()?.unwrap_or(0);
    let stop = args.get(4).map(|s| parse_int(s)).transpose()?.unwrap_or(0);
    on_path(ks, args, Err(MISSING_KEY.to_string()), |target| {
        let items = as_array(target)?;
        let from = clamp_bound(start, items.len());
        let to = if stop == 0 { items.len() } else { clamp_bound(stop, items.len()) };
        let found = (from..to.max(from))
            .find(|&i| items[i] == needle)
            .map(|i| i as i64)
            .unwrap_or(-1);
        Ok(Reply::Integer(found))
    })
}

fn json_arrinsert(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let index = parse_int(&args[2])?;
    let values = args[3..]
        .iter()
        .map(|v| parse_json(v))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    on_path(ks, args, Err(MISSING_KEY.to_string()), |target| {
        let items = as_array(target)?;
        let len = items.len() as i64;
        let at = if index < 0 { len + index } else { index };
        if at < 0 || at > len {
            return Err("ERR index out of bounds".to_string());
        }
        let at = at as usize;
        items.splice(at..at, values);
        Ok(Reply::Integer(items.len() as i64))
    })
}

fn json_arrlen(ks: &mut Keyspace, args: &[String]) -> Outcome {
    on_path(ks, args, Ok(Reply::nil()), |target| {
        Ok(Reply::Integer(as_array(target)?.len() as i64))
    })
}

fn json_arrpop(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let index = args.get(2).map(|s| parse_int(s)).transpose()?.unwrap_or(-1);
    on_path(ks, args, Ok(Reply::nil()), |target| {
        let items = as_array(target)?;
        if items.is_empty() {
            return Ok(Reply::nil());
        }
        let len = items.len() as i64;
        let at = if index < 0 { len + index } else { index };
        let at = at.clamp(0, len - 1) as usize;
        Ok(json_bulk(&items.remove(at)))
    })
}

fn json_arrtrim(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let start = parse_int(&args[2])?;
    let stop = parse_int(&args[3])?;
    on_path(ks, args, Err(MISSING_KEY.to_string()), |target| {
        let items = as_array(target)?;
        let len = items.len();
        let from = clamp_bound(start, len);
        let to = if stop < 0 {
            clamp_bound(stop, len) + 1
        } else {
            (stop as usize).saturating_add(1).min(len)
        };
        if from >= to {
            items.clear();
        } else {
            items.truncate(to);
            items.drain(..from);
        }
        Ok(Reply::Integer(items.len() as i64))
    })
}

// =============================================================================
// Introspection
// =============================================================================

fn json_type(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let (_, parsed) = path_arg(args, 1);
    let multi = parsed.as_ref().map(|p| p.multi).unwrap_or(false);
    on_path(ks, args, Ok(Reply::nil()), |target| {
        let name = path::type_name(target).to_string();
        Ok(if multi { Reply::bulk(name) } else { Reply::Status(name) })
    })
}

fn to_resp(value: &Value) -> Reply {
    match value {
        Value::Null => Reply::nil(),
        Value::Bool(b) => Reply::Status(b.to_string()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Reply::Integer(i),
            None => Reply::bulk(n.to_string()),
        },
        Value::String(s) => Reply::bulk(s.clone()),
        Value::Array(items) => {
            let mut out = vec![Reply::Status("[".into())];
            out.extend(items.iter().map(to_resp));
            Reply::array(out)
        }
        Value::Object(map) => {
            let mut out = vec![Reply::Status("{".into())];
            for (k, v) in map {
                out.push(Reply::bulk(k.clone()));
                out.push(to_resp(v));
            }
            Reply::array(out)
        }
    }
}

fn json_resp(ks: &mut Keyspace, args: &[String]) -> Outcome {
    on_path(ks, args, Ok(Reply::nil()), |target| Ok(to_resp(target)))
}

fn json_objkeys(ks: &mut Keyspace, args: &[String]) -> Outcome {
    on_path(ks, args, Ok(Reply::nil()), |target| match target {
        Value::Object(map) => Ok(Reply::array(map.keys().map(|k| Reply::bulk(k.clone())).collect())),
        other => Err(wrong_type("object", other)),
    })
}

fn json_objlen(ks: &mut Keyspace, args: &[String]) -> Outcome {
    on_path(ks, args, Ok(Reply::nil()), |target| match target {
        Value::Object(map) => Ok(Reply::Integer(map.len() as i64)),
        other => Err(wrong_type("object", other)),
    })
}

fn json_strlen(ks: &mut Keyspace, args: &[String]) -> Outcome {
    on_path(ks, args, Ok(Reply::nil()), |target| match target {
        Value::String(s) => Ok(Reply::Integer(s.chars().count() as i64)),
        other => Err(wrong_type("string", other)),
    })
}

fn json_debug(ks: &mut Keyspace, args: &[String]) -> Outcome {
    match args[0].to_ascii_uppercase().as_str() {
        "HELP" => Ok(Reply::array(vec![
            Reply::bulk("MEMORY <key> [path] - reports memory usage"),
            Reply::bulk("HELP                - this message"),
        ])),
        "MEMORY" => {
            let key = args.get(1).ok_or_else(|| {
                "ERR wrong number of arguments for 'json.debug' command".to_string()
            })?;
            let (raw, parsed) = path_arg(args, 2);
            let parsed = parsed?;
            let Some(doc) = ks.doc(key) else {
                return Ok(Reply::Integer(0));
            };
            let size = |v: &Value| v.to_string().len() as i64;
            match (path::lookup(doc, &parsed.steps), parsed.multi) {
                (Some(v), false) => Ok(Reply::Integer(size(v))),
                (None, false) => Err(path::missing(&raw)),
                (found, true) => Ok(Reply::array(
                    found.into_iter().map(|v| Reply::Integer(size(v))).collect(),
                )),
            }
        }
        other => Err(format!("ERR unknown subcommand '{}'", other)),
    }
}

// =============================================================================
// Scalars
// =============================================================================

fn add_numbers(current: &Number, delta: &Number) -> std::result::Result<Value, String> {
    if let (Some(a), Some(b)) = (current.as_i64(), delta.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Ok(Value::from(sum));
        }
    }
    let sum = current.as_f64().unwrap_or(0.0) + delta.as_f64().unwrap_or(0.0);
    Number::from_f64(sum)
        .map(Value::Number)
        .ok_or_else(|| "ERR result is not a finite number".to_string())
}

fn json_numincrby(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let delta = match parse_json(&args[2])? {
        Value::Number(n) => n,
        _ => return Err("ERR expected a number".to_string()),
    };
    let raw = args[1].clone();
    let parsed = path::parse(&raw)?;
    let doc = ks.doc_mut(&args[0]).ok_or_else(|| MISSING_KEY.to_string())?;

    let bump = |target: &mut Value| -> std::result::Result<Value, String> {
        match target {
            Value::Number(n) => {
                let next = add_numbers(n, &delta)?;
                *target = next.clone();
                Ok(next)
            }
            other => Err(wrong_type("number", other)),
        }
    };

    // Both path syntaxes reply with JSON text
    match (path::lookup_mut(doc, &parsed.steps), parsed.multi) {
        (Some(target), false) => Ok(json_bulk(&bump(target)?)),
        (None, false) => Err(path::missing(&raw)),
        (target, true) => {
            let results: Vec<Value> = target
                .into_iter()
                .map(|t| bump(t).unwrap_or(Value::Null))
                .collect();
            Ok(json_bulk(&Value::Array(results)))
        }
    }
}

fn json_strappend(ks: &mut Keyspace, args: &[String]) -> Outcome {
    // `key value` appends at the root
    let (path_args, value) = if args.len() == 2 {
        (vec![args[0].clone()], &args[1])
    } else {
        (vec![args[0].clone(), args[1].clone()], &args[2])
    };
    let suffix = match parse_json(value)? {
        Value::String(s) => s,
        other => return Err(wrong_type("string", &other)),
    };
    on_path(ks, &path_args, Err(MISSING_KEY.to_string()), |target| match target {
        Value::String(s) => {
            s.push_str(&suffix);
            Ok(Reply::Integer(s.chars().count() as i64))
        }
        other => Err(wrong_type("string", other)),
    })
}

fn json_toggle(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let (_, parsed) = path_arg(args, 1);
    let multi = parsed.as_ref().map(|p| p.multi).unwrap_or(false);
    on_path(ks, args, Err(MISSING_KEY.to_string()), |target| match target {
        Value::Bool(b) => {
            *b = !*b;
            Ok(if multi {
                Reply::Integer(*b as i64)
            } else {
                Reply::bulk(b.to_string())
            })
        }
        other => Err(wrong_type("boolean", other)),
    })
}

// =============================================================================
// Key Expiry
// =============================================================================

fn expire(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let seconds = parse_int(&args[1])?;
    if seconds <= 0 {
        return Ok(Reply::Integer(ks.remove(&args[0]) as i64));
    }
    let deadline = Instant::now()
        .checked_add(Duration::from_secs(seconds as u64))
        .ok_or_else(|| "ERR invalid expire time in 'expire' command".to_string())?;
    match ks.get_mut(&args[0]) {
        Some(entry) => {
            entry.expires_at = Some(deadline);
            Ok(Reply::Integer(1))
        }
        None => Ok(Reply::Integer(0)),
    }
}

fn persist(ks: &mut Keyspace, args: &[String]) -> Outcome {
    match ks.get_mut(&args[0]) {
        Some(entry) => Ok(Reply::Integer(entry.expires_at.take().is_some() as i64)),
        None => Ok(Reply::Integer(0)),
    }
}

fn ttl(ks: &mut Keyspace, args: &[String]) -> Outcome {
    let reply = match ks.get(&args[0]) {
        None => -2,
        Some(entry) => match entry.expires_at {
            None => -1,
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                (left.as_millis() as i64 + 999) / 1000
            }
        },
    };
    Ok(Reply::Integer(reply))
}
