use std::cmp::Ordering;

use kjson::{compare, contained_by, contains, equals, parse, strip_nulls, Value};

fn values(texts: &[&str]) -> Vec<Value> {
    texts.iter().map(|text| parse(text).expect(text)).collect()
}

#[test]
fn sorting_follows_the_documented_order() {
    let sorted = values(&[
        "null",
        "false",
        "true",
        "-1.5",
        "0",
        "2",
        "-5n",
        "3n",
        "10n",
        "-1m",
        "0.5m",
        "99.99m",
        "\"\"",
        "\"a\"",
        "\"ab\"",
        "00000000-0000-0000-0000-000000000001",
        "ffffffff-ffff-ffff-ffff-ffffffffffff",
        "1970-01-01T00:00:00Z",
        "2025-01-15T10:30:00Z",
        "-PT1S",
        "PT1S",
        "P1D",
        "[]",
        "[1]",
        "[1,1]",
        "{}",
        "{a:1}",
    ]);
    let mut shuffled: Vec<Value> = sorted.iter().rev().cloned().collect();
    shuffled.sort();
    assert_eq!(shuffled, sorted);
}

#[test]
fn comparator_laws_hold_across_a_mixed_corpus() {
    let corpus = values(&[
        "null",
        "true",
        "false",
        "0",
        "-0.5",
        "1n",
        "007n",
        "7n",
        "1.50m",
        "1.5m",
        "\"x\"",
        "550e8400-e29b-41d4-a716-446655440000",
        "2025-01-15T10:30:00+05:30",
        "2025-01-15T05:00:00Z",
        "P1M",
        "P30D",
        "[1,[2]]",
        "{a:1,b:2}",
        "{b:2,a:1}",
    ]);
    for a in &corpus {
        assert_eq!(compare(a, a), Ordering::Equal);
        for b in &corpus {
            assert_eq!(compare(a, b), compare(b, a).reverse());
            assert_eq!(equals(a, b), compare(a, b) == Ordering::Equal);
            for c in &corpus {
                if compare(a, b) != Ordering::Greater && compare(b, c) != Ordering::Greater {
                    assert_ne!(compare(a, c), Ordering::Greater);
                }
            }
        }
    }
}

#[test]
fn containment_fixture() {
    let container = parse("{\"a\":1,\"b\":2}").unwrap();
    let contained = parse("{\"a\":1}").unwrap();
    assert!(contains(&container, &contained));
    assert!(!contains(&contained, &container));
    assert!(contained_by(&contained, &container));
}

#[test]
fn containment_is_reflexive_across_the_corpus() {
    let corpus = values(&[
        "null",
        "42",
        "42n",
        "99.99m",
        "\"x\"",
        "2025-01-15T10:30:00Z",
        "[1,[2,{a:3}]]",
        "{a:{b:[null,1]},c:2}",
    ]);
    for value in &corpus {
        assert!(contains(value, value));
    }
}

#[test]
fn strip_nulls_is_idempotent_and_shrinking() {
    let value = parse("{a:null,b:[null,{c:null,d:1},null],e:2}").unwrap();
    let once = strip_nulls(&value);
    assert_eq!(once, parse("{b:[{d:1}],e:2}").unwrap());
    assert_eq!(strip_nulls(&once), once);
}
