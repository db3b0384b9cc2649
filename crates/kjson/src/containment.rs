//! Structural containment and null stripping.
//!
//! Containment is the "is a structural subset of" relation used for
//! existence queries: arrays contain order-independently, objects contain
//! member-wise with recursion into nested containers, and scalars contain
//! only their equals. Equality throughout is the comparator's normalized
//! equality, so `1.50m` is contained wherever `1.5m` is.

use crate::{cmp::equals, value::Value};

/// `true` if `contained` is a structural subset of `container`.
#[must_use]
pub fn contains(container: &Value, contained: &Value) -> bool {
    match (container, contained) {
        (Value::Array(outer), Value::Array(inner)) => inner
            .iter()
            .all(|needle| outer.iter().any(|item| equals(item, needle))),
        (Value::Object(outer), Value::Object(inner)) => {
            inner.iter().all(|(key, needle)| {
                // The first member with a matching key decides.
                match outer.iter().find(|(candidate_key, _)| candidate_key == key) {
                    None => false,
                    Some((_, candidate)) => match needle {
                        Value::Array(_) | Value::Object(_) => contains(candidate, needle),
                        _ => equals(candidate, needle),
                    },
                }
            })
        }
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        _ => equals(container, contained),
    }
}

/// `contains` with the arguments flipped.
#[must_use]
pub fn contained_by(contained: &Value, container: &Value) -> bool {
    contains(container, contained)
}

/// Rebuilds the value with every `Null` array element and object member
/// removed, recursively. Idempotent; scalars pass through unchanged.
#[must_use]
pub fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        Value::Object(members) => Value::Object(
            members
                .iter()
                .filter(|(_, member)| !member.is_null())
                .map(|(key, member)| (key.clone(), strip_nulls(member)))
                .collect(),
        ),
        other => other.clone(),
    }
}
