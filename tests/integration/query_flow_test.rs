// Integration tests for filtered, ordered and limited reads
//
// Runs the repository's query shape against the in-memory backend:
// equality filters, range filters, ordering, limits and the builder API.

#[path = "../helpers/mod.rs"]
mod helpers;

use docrepo::documents::{Condition, Document, OrderBy, SortDirection};
use docrepo::{AppError, DataRepository};
use helpers::{seeded_users, users_repository, TestDataFactory};
use serde_json::json;

fn names(documents: &[Document]) -> Vec<&str> {
    documents
        .iter()
        .map(|d| d.field("name").and_then(|v| v.as_str()).unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_get_all_documents() {
    let (_backend, repo) = seeded_users().await;
    let all = repo.get(&[], &[], None).await.unwrap();
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn test_equality_filter() {
    let (_backend, repo) = seeded_users().await;

    let males = repo
        .get(&[Condition::eq("gender", "male")], &[], None)
        .await
        .unwrap();

    assert_eq!(males.len(), 3);
    assert!(males
        .iter()
        .all(|d| d.field("gender") == Some(&json!("male"))));
}

#[tokio::test]
async fn test_first_by_name() {
    let (_backend, repo) = seeded_users().await;

    let first = repo
        .get(&[], &[OrderBy::asc("name")], Some(1))
        .await
        .unwrap();

    assert_eq!(names(&first), vec!["Adam"]);
}

#[tokio::test]
async fn test_first_male_by_name_descending() {
    let (_backend, repo) = seeded_users().await;

    let first = repo
        .get(
            &[Condition::eq("gender", "male")],
            &[OrderBy::new("name", SortDirection::Descending)],
            Some(1),
        )
        .await
        .unwrap();

    assert_eq!(names(&first), vec!["Peter"]);
}

#[tokio::test]
async fn test_zero_limit_returns_everything() {
    let (_backend, repo) = seeded_users().await;
    let all = repo.get(&[], &[OrderBy::asc("name")], Some(0)).await.unwrap();
    assert_eq!(names(&all), vec!["Adam", "Gary", "Kat", "Peter", "Zoe"]);
}

#[tokio::test]
async fn test_conditions_combine_with_and() {
    let (_backend, repo) = users_repository();
    for (id, age, city) in [
        ("a", 17, "Manila"),
        ("b", 25, "Manila"),
        ("c", 31, "Cebu"),
        ("d", 40, "Manila"),
    ] {
        repo.add(
            TestDataFactory::fields(json!({"name": id, "age": age, "address": {"city": city}})),
            Some(id),
        )
        .await
        .unwrap();
    }

    let adults_in_manila = repo
        .get(
            &[
                Condition::gte("age", 18),
                Condition::eq("address.city", "Manila"),
            ],
            &[OrderBy::asc("age")],
            None,
        )
        .await
        .unwrap();

    let ids: Vec<_> = adults_in_manila.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "d"]);

    let under_thirty = repo
        .get(&[Condition::lt("age", 30.0)], &[], None)
        .await
        .unwrap();
    assert_eq!(under_thirty.len(), 2);
}

#[tokio::test]
async fn test_no_matches_is_empty_not_error() {
    let (_backend, repo) = seeded_users().await;
    let none = repo
        .get(&[Condition::eq("gender", "other")], &[], None)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_blank_condition_field_is_rejected() {
    let (_backend, repo) = seeded_users().await;
    let result = repo.get(&[Condition::eq("", "male")], &[], None).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_range_against_null_is_rejected() {
    let (_backend, repo) = users_repository();
    repo.add(TestDataFactory::fields(json!({"name": "Nobody", "age": null})), Some("n"))
        .await
        .unwrap();

    let result = repo
        .get(&[Condition::lte("age", serde_json::Value::Null)], &[], None)
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // Equality against null is still a valid filter
    let nulls = repo
        .get(&[Condition::eq("age", serde_json::Value::Null)], &[], None)
        .await
        .unwrap();
    assert_eq!(nulls.len(), 1);
}

#[tokio::test]
async fn test_range_filter_orders_by_filtered_field() {
    let (_backend, repo) = users_repository();
    for (id, age) in [("a", 60), ("b", 20), ("c", 40)] {
        repo.add(TestDataFactory::fields(json!({"age": age})), Some(id))
            .await
            .unwrap();
    }

    let youngest_adult = repo
        .get(&[Condition::gt("age", 18)], &[], Some(1))
        .await
        .unwrap();
    assert_eq!(youngest_adult.len(), 1);
    assert_eq!(youngest_adult[0].id, "b");
}

#[tokio::test]
async fn test_query_builder_through_find() {
    let (_backend, repo) = seeded_users().await;

    let base = repo.query().unwrap().filter(Condition::eq("gender", "female"));
    let ordered = base.clone().order_by(OrderBy::desc("name"));

    // Extending a query leaves the original untouched
    assert!(base.ordering().is_empty());

    let women = repo.find(ordered.limit(5)).await.unwrap();
    assert_eq!(names(&women), vec!["Zoe", "Kat"]);
}
