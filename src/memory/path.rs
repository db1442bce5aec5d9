//! Path navigation for the in-process store
//!
//! Supports legacy paths (`.`, `.a.b`, `a[0]`, `["key"]`) and definite
//! `$`-rooted paths (`$`, `$.a[-1]`). Wildcards and filters are rejected.

use serde_json::Value;

/// One navigation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    Key(String),
    Index(i64),
}

/// A parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedPath {
    pub steps: Vec<Step>,

    /// `$`-rooted: replies carry one entry per match
    pub multi: bool,
}

impl ParsedPath {
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps to the parent container and the final step
    pub fn split_last(&self) -> Option<(&[Step], &Step)> {
        self.steps.split_last().map(|(last, parent)| (parent, last))
    }
}

/// Parse a path expression
pub(crate) fn parse(path: &str) -> Result<ParsedPath, String> {
    let (multi, body) = match path.strip_prefix('$') {
        Some(rest) => (true, rest),
        None => (false, path),
    };

    let chars: Vec<char> = body.chars().collect();
    let mut steps = Vec::new();
    let mut i = 0;

    // Legacy paths may omit the leading dot
    if !multi && !chars.is_empty() && chars[0] != '.' && chars[0] != '[' {
        i = read_key(&chars, 0, &mut steps, path)?;
    }

    while i < chars.len() {
        match chars[i] {
            '.' => {
                if i + 1 == chars.len() {
                    if i == 0 {
                        break;
                    }
                    return Err(syntax(path));
                }
                i = read_key(&chars, i + 1, &mut steps, path)?;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| i + p)
                    .ok_or_else(|| syntax(path))?;
                let inner: String = chars[i + 1..close].iter().collect();
                steps.push(bracket_step(inner.trim(), path)?);
                i = close + 1;
            }
            _ => return Err(syntax(path)),
        }
    }

    Ok(ParsedPath { steps, multi })
}

fn read_key(chars: &[char], start: usize, steps: &mut Vec<Step>, path: &str) -> Result<usize, String> {
    let mut end = start;
    while end < chars.len() && chars[end] != '.' && chars[end] != '[' {
        end += 1;
    }
    let key: String = chars[start..end].iter().collect();
    if key.is_empty() {
        return Err(syntax(path));
    }
    if key == "*" {
        return Err(format!("ERR wildcard paths are not supported: '{}'", path));
    }
    steps.push(Step::Key(key));
    Ok(end)
}

fn bracket_step(inner: &str, path: &str) -> Result<Step, String> {
    let quoted = (inner.starts_with('"') && inner.ends_with('"'))
        || (inner.starts_with('\'') && inner.ends_with('\''));
    if quoted && inner.len() >= 2 {
        return Ok(Step::Key(inner[1..inner.len() - 1].to_string()));
    }
    inner
        .parse::<i64>()
        .map(Step::Index)
        .map_err(|_| format!("ERR unsupported path segment '[{}]' in '{}'", inner, path))
}

fn syntax(path: &str) -> String {
    format!("ERR syntax error in path '{}'", path)
}

// =============================================================================
// Navigation
// =============================================================================

/// Normalize a possibly negative index against a length
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if index < 0 { len + index } else { index };
    if idx >= 0 && idx < len {
        Some(idx as usize)
    } else {
        None
    }
}

pub(crate) fn lookup<'a>(root: &'a Value, steps: &[Step]) -> Option<&'a Value> {
    steps.iter().try_fold(root, |node, step| match (node, step) {
        (Value::Object(map), Step::Key(k)) => map.get(k),
        (Value::Array(items), Step::Index(i)) => normalize_index(*i, items.len()).map(|i| &items[i]),
        _ => None,
    })
}

pub(crate) fn lookup_mut<'a>(root: &'a mut Value, steps: &[Step]) -> Option<&'a mut Value> {
    let mut node = root;
    for step in steps {
        node = match (node, step) {
            (Value::Object(map), Step::Key(k)) => map.get_mut(k)?,
            (Value::Array(items), Step::Index(i)) => {
                let len = items.len();
                items.get_mut(normalize_index(*i, len)?)?
            }
            _ => return None,
        };
    }
    Some(node)
}

/// Write `value` at `path`, creating the final object member if needed
pub(crate) fn assign(root: &mut Value, path: &ParsedPath, value: Value, raw: &str) -> Result<(), String> {
    let Some((parent_steps, last)) = path.split_last() else {
        *root = value;
        return Ok(());
    };

    let parent = lookup_mut(root, parent_steps).ok_or_else(|| missing(raw))?;
    match (parent, last) {
        (Value::Object(map), Step::Key(k)) => {
            map.insert(k.clone(), value);
            Ok(())
        }
        (Value::Array(items), Step::Index(i)) => {
            let idx = normalize_index(*i, items.len())
                .ok_or_else(|| "ERR index out of range".to_string())?;
            items[idx] = value;
            Ok(())
        }
        _ => Err(missing(raw)),
    }
}

/// Remove the value at `path`; returns whether anything was removed
pub(crate) fn remove(root: &mut Value, path: &ParsedPath) -> bool {
    let Some((parent_steps, last)) = path.split_last() else {
        return false;
    };
    match (lookup_mut(root, parent_steps), last) {
        (Some(Value::Object(map)), Step::Key(k)) => map.remove(k).is_some(),
        (Some(Value::Array(items)), Step::Index(i)) => match normalize_index(*i, items.len()) {
            Some(idx) => {
                items.remove(idx);
                true
            }
            None => false,
        },
        _ => false,
    }
}

pub(crate) fn missing(raw: &str) -> String {
    format!("ERR Path '{}' does not exist", raw)
}

/// Type name as the store reports it
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
