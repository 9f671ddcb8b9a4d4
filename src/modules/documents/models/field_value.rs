// Field value semantics shared by local query evaluation and merge writes
//
// Values follow the document store's cross-type order:
// null < boolean < number < string < array < map.
// Numbers compare numerically regardless of integer/double encoding.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::document::Fields;
use super::query::{Condition, Operator};

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn number_cmp(a: &serde_json::Number, b: &serde_json::Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }

    let a = a.as_f64().unwrap_or(f64::NAN);
    let b = b.as_f64().unwrap_or(f64::NAN);
    // NaN sorts before every other number
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn map_cmp(a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    let mut a_entries: Vec<_> = a.iter().collect();
    let mut b_entries: Vec<_> = b.iter().collect();
    a_entries.sort_by(|x, y| x.0.cmp(y.0));
    b_entries.sort_by(|x, y| x.0.cmp(y.0));

    for ((ak, av), (bk, bv)) in a_entries.iter().zip(b_entries.iter()) {
        let ord = ak.cmp(bk).then_with(|| compare(av, bv));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_entries.len().cmp(&b_entries.len())
}

/// Total order over field values
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => number_cmp(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (xv, yv) in x.iter().zip(y.iter()) {
                let ord = compare(xv, yv);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => map_cmp(x, y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Resolve a dotted field path inside a document body
pub fn lookup<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Evaluate one condition against a document body.
/// Missing fields never match; inequalities only match values of the same type.
pub fn matches(condition: &Condition, fields: &Fields) -> bool {
    let Some(actual) = lookup(fields, &condition.field) else {
        return false;
    };

    if condition.operator.is_inequality() && type_rank(actual) != type_rank(&condition.value) {
        return false;
    }

    let ord = compare(actual, &condition.value);
    match condition.operator {
        Operator::LessThan => ord == Ordering::Less,
        Operator::LessThanOrEqual => ord != Ordering::Greater,
        Operator::Equal => ord == Ordering::Equal,
        Operator::GreaterThan => ord == Ordering::Greater,
        Operator::GreaterThanOrEqual => ord != Ordering::Less,
    }
}

/// Merge `patch` into `target`; nested maps merge field by field,
/// every other value replaces what was there.
pub fn merge_into(target: &mut Fields, patch: Fields) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) if !nested.is_empty() => {
                merge_into(existing, nested);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Leaf field paths written by a merge of `fields`, as segment lists.
/// A non-empty nested map contributes its own leaves; anything else is a leaf.
pub fn merge_paths(fields: &Fields) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    collect_paths(fields, &mut Vec::new(), &mut paths);
    paths
}

fn collect_paths(fields: &Fields, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    for (key, value) in fields {
        prefix.push(key.clone());
        match value {
            Value::Object(nested) if !nested.is_empty() => collect_paths(nested, prefix, out),
            _ => out.push(prefix.clone()),
        }
        prefix.pop();
    }
}
