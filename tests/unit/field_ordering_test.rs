// Property-based tests for field value ordering and local query evaluation
//
// Uses proptest to check that ordering is a consistent total order and that
// ordered, limited queries over the in-memory backend return a sorted prefix.

use std::cmp::Ordering;

use docrepo::documents::models::field_value::compare;
use docrepo::documents::{
    Condition, DocumentBackend, Fields, MemoryBackend, OrderBy, Query, SetOptions,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

proptest! {
    #[test]
    fn test_compare_is_antisymmetric(a in scalar(), b in scalar()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn test_compare_is_transitive(a in scalar(), b in scalar(), c in scalar()) {
        if compare(&a, &b) != Ordering::Greater && compare(&b, &c) != Ordering::Greater {
            prop_assert_ne!(compare(&a, &c), Ordering::Greater);
        }
    }

    #[test]
    fn test_ordered_limit_returns_sorted_prefix(
        ages in proptest::collection::vec(0i64..100, 0..30),
        limit in 1u32..10,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let documents = runtime.block_on(async {
            let backend = MemoryBackend::new();
            for (i, age) in ages.iter().enumerate() {
                let mut fields = Fields::new();
                fields.insert("age".to_string(), json!(age));
                backend
                    .set_document("people", &format!("p{:03}", i), &fields, SetOptions::overwrite())
                    .await
                    .unwrap();
            }

            let query = Query::collection("people")
                .filter(Condition::gte("age", 18))
                .order_by(OrderBy::asc("age"))
                .limit(limit);
            backend.run_query(&query).await.unwrap()
        });

        let mut expected: Vec<i64> = ages.iter().copied().filter(|a| *a >= 18).collect();
        expected.sort();
        expected.truncate(limit as usize);

        let returned: Vec<i64> = documents
            .iter()
            .map(|d| d.field("age").and_then(Value::as_i64).unwrap())
            .collect();
        prop_assert_eq!(returned, expected);
    }
}
