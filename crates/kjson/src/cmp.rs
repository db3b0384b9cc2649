//! Total ordering over values, usable for index key ordering.
//!
//! Values order first by type rank, then by a per-type rule. The order is
//! total: `NaN` participates via `f64::total_cmp`, and every per-type rule
//! agrees with equality, so `compare(a, b) == Equal` exactly when
//! `equals(a, b)`.

use std::cmp::Ordering;

use crate::value::Value;

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::BigInt(_) => 3,
        Value::Decimal128(_) => 4,
        Value::String(_) => 5,
        Value::Uuid(_) => 6,
        Value::Instant(_) => 7,
        Value::Duration(_) => 8,
        Value::Array(_) => 9,
        Value::Object(_) => 10,
    }
}

/// Compares two values under the total order.
#[must_use]
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match type_rank(a).cmp(&type_rank(b)) {
        Ordering::Equal => {}
        rank_order => return rank_order,
    }
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Value::BigInt(x), Value::BigInt(y)) => x.cmp(y),
        (Value::Decimal128(x), Value::Decimal128(y)) => x.cmp(y),
        (Value::Uuid(x), Value::Uuid(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Value::Instant(x), Value::Instant(y)) => x.cmp(y),
        (Value::Duration(x), Value::Duration(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => compare_arrays(x, y),
        (Value::Object(x), Value::Object(y)) => compare_objects(x, y),
        _ => unreachable!("equal type ranks imply matching variants"),
    }
}

/// Deep structural equality under the same normalization rules as
/// [`compare`].
#[must_use]
pub fn equals(a: &Value, b: &Value) -> bool {
    compare(a, b) == Ordering::Equal
}

fn compare_arrays(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match compare(x, y) {
            Ordering::Equal => {}
            element_order => return element_order,
        }
    }
    a.len().cmp(&b.len())
}

/// Objects compare as member sequences canonicalized by sorting on key
/// and then on value, so neither insertion order nor the arrangement of
/// duplicate keys affects the result.
fn compare_objects(a: &[(String, Value)], b: &[(String, Value)]) -> Ordering {
    let a = canonical_members(a);
    let b = canonical_members(b);
    for ((key_a, value_a), (key_b, value_b)) in a.iter().zip(&b) {
        match key_a
            .as_bytes()
            .cmp(key_b.as_bytes())
            .then_with(|| compare(value_a, value_b))
        {
            Ordering::Equal => {}
            member_order => return member_order,
        }
    }
    a.len().cmp(&b.len())
}

fn canonical_members(members: &[(String, Value)]) -> Vec<&(String, Value)> {
    let mut sorted: Vec<_> = members.iter().collect();
    sorted.sort_unstable_by(|(key_a, value_a), (key_b, value_b)| {
        key_a
            .as_bytes()
            .cmp(key_b.as_bytes())
            .then_with(|| compare(value_a, value_b))
    });
    sorted
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        equals(self, other)
    }
}

impl Eq for Value {}

impl Ord for Value {
    fn cmp(&self, other: &Value) -> Ordering {
        compare(self, other)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use test_case::test_case;

    fn cmp_text(a: &str, b: &str) -> Ordering {
        compare(&parse(a).unwrap(), &parse(b).unwrap())
    }

    #[test]
    fn type_ranks_are_strictly_increasing() {
        let ladder = [
            "null",
            "false",
            "1",
            "1n",
            "1m",
            "\"a\"",
            "00000000-0000-0000-0000-000000000000",
            "1970-01-01T00:00:00Z",
            "PT1S",
            "[]",
            "{}",
        ];
        for pair in ladder.windows(2) {
            assert_eq!(cmp_text(pair[0], pair[1]), Ordering::Less, "{pair:?}");
        }
    }

    #[test_case("false", "true", Ordering::Less)]
    #[test_case("1", "2", Ordering::Less)]
    #[test_case("-1", "1", Ordering::Less)]
    #[test_case("\"abc\"", "\"abd\"", Ordering::Less)]
    #[test_case("\"ab\"", "\"abc\"", Ordering::Less)]
    #[test_case("99n", "100n", Ordering::Less)]
    #[test_case("-100n", "-99n", Ordering::Less)]
    #[test_case("99.99m", "100m", Ordering::Less)]
    #[test_case("1.50m", "1.5m", Ordering::Equal)]
    #[test_case("PT1H", "PT61M", Ordering::Less)]
    #[test_case("P30D", "P1M", Ordering::Equal)]
    #[test_case("[1,2]", "[1,3]", Ordering::Less)]
    #[test_case("[1,2]", "[1,2,0]", Ordering::Less; "prefix is smaller")]
    fn same_rank_rules(a: &str, b: &str, expected: Ordering) {
        assert_eq!(cmp_text(a, b), expected);
    }

    #[test]
    fn numbers_use_total_order() {
        let nan = Value::Number(f64::NAN);
        assert_eq!(compare(&nan, &nan), Ordering::Equal);
        assert_eq!(
            compare(&Value::Number(f64::INFINITY), &nan),
            Ordering::Less
        );
        assert_eq!(
            compare(&Value::Number(-0.0), &Value::Number(0.0)),
            Ordering::Less
        );
    }

    #[test]
    fn instants_compare_in_utc() {
        // Same point on the timeline, different display offsets.
        assert_eq!(
            cmp_text("2025-01-15T10:30:00+05:30", "2025-01-15T05:00:00Z"),
            Ordering::Equal
        );
        assert_eq!(
            cmp_text("2025-01-15T05:00:00Z", "2025-01-15T05:00:01Z"),
            Ordering::Less
        );
    }

    #[test]
    fn uuids_compare_by_raw_bytes() {
        assert_eq!(
            cmp_text(
                "00000000-0000-0000-0000-000000000001",
                "00000000-0000-0000-0000-000000000002"
            ),
            Ordering::Less
        );
    }

    #[test]
    fn object_member_order_does_not_matter() {
        assert_eq!(cmp_text("{a:1,b:2}", "{b:2,a:1}"), Ordering::Equal);
        assert_eq!(cmp_text("{a:1}", "{a:2}"), Ordering::Less);
        assert_eq!(cmp_text("{a:1}", "{a:1,b:2}"), Ordering::Less);
    }

    #[test]
    fn duplicate_keys_compare_as_multisets() {
        assert_eq!(cmp_text("{a:1,a:2}", "{a:2,a:1}"), Ordering::Equal);
        assert_eq!(cmp_text("{a:1,a:2}", "{a:1,a:3}"), Ordering::Less);
    }

    #[test]
    fn comparison_is_antisymmetric_and_transitive() {
        let values: Vec<Value> = [
            "null", "true", "-1", "0", "1n", "0.5m", "\"x\"", "PT1S", "[1]", "{a:1}",
        ]
        .iter()
        .map(|text| parse(text).unwrap())
        .collect();
        for a in &values {
            for b in &values {
                assert_eq!(compare(a, b), compare(b, a).reverse());
                for c in &values {
                    if compare(a, b) == Ordering::Less && compare(b, c) == Ordering::Less {
                        assert_eq!(compare(a, c), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn equality_matches_equal_ordering() {
        let pairs = [
            ("1.50m", "1.5m"),
            ("{a:1,b:2}", "{b:2,a:1}"),
            ("[1,2]", "[1,2]"),
            ("007n", "7n"),
        ];
        for (a, b) in pairs {
            let a = parse(a).unwrap();
            let b = parse(b).unwrap();
            assert!(equals(&a, &b));
            assert_eq!(compare(&a, &b), Ordering::Equal);
        }
    }
}
