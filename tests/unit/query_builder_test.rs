// Query builder behavior: conditions and ordering keep caller order,
// limits cap or clear, and each step yields an independent query value.

use docrepo::documents::{Condition, Operator, OrderBy, Query, SortDirection};
use proptest::prelude::*;

#[test]
fn test_conditions_keep_caller_order() {
    let query = Query::collection("users")
        .filter(Condition::eq("gender", "male"))
        .filter(Condition::gt("age", 18))
        .filter(Condition::lte("age", 65));

    let operators: Vec<Operator> = query.conditions().iter().map(|c| c.operator).collect();
    assert_eq!(
        operators,
        vec![Operator::Equal, Operator::GreaterThan, Operator::LessThanOrEqual]
    );
}

#[test]
fn test_builder_steps_do_not_share_state() {
    let base = Query::collection("users").filter(Condition::eq("gender", "male"));
    let sorted = base.clone().order_by(OrderBy::asc("name")).limit(1);

    assert!(base.ordering().is_empty());
    assert_eq!(base.max_results(), None);
    assert_eq!(sorted.ordering()[0].direction, SortDirection::Ascending);
    assert_eq!(sorted.max_results(), Some(1));
    assert_eq!(sorted.conditions(), base.conditions());
}

#[test]
fn test_condition_display() {
    assert_eq!(Condition::lt("age", 30).to_string(), "age < 30");
    assert_eq!(Condition::eq("name", "Kat").to_string(), "name == \"Kat\"");
}

proptest! {
    #[test]
    fn test_last_limit_wins(first in 0u32..1000, second in 0u32..1000) {
        let query = Query::collection("users").limit(first).limit(second);
        let expected = if second == 0 { None } else { Some(second) };
        prop_assert_eq!(query.max_results(), expected);
    }

    #[test]
    fn test_filters_preserve_count_and_order(fields in proptest::collection::vec("[a-z]{1,8}", 0..10)) {
        let query = Query::collection("users")
            .filters(fields.iter().map(|f| Condition::eq(f.as_str(), 1)));

        let applied: Vec<&str> = query.conditions().iter().map(|c| c.field.as_str()).collect();
        let expected: Vec<&str> = fields.iter().map(String::as_str).collect();
        prop_assert_eq!(applied, expected);
        prop_assert!(query.validate().is_ok());
    }
}
