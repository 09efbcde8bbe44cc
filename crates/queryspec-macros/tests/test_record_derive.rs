//! Integration tests for `#[derive(Record)]`.
//!
//! These tests verify that derived records expose their fields to
//! expressions and that specifications evaluate against them.

use std::borrow::Cow;

use chrono::NaiveDate;
use queryspec_db::evaluator::SpecificationEvaluator;
use queryspec_db::expr::Lambda;
use queryspec_db::record::Record;
use queryspec_db::specification::Specification;
use queryspec_db::value::Value;
use queryspec_macros::Record;

// ── Entities ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Record)]
#[record(entity = "customers")]
pub struct Customer {
    pub id: i64,
    #[record(rename = "fullName")]
    pub full_name: String,
    pub email: Option<String>,
    pub joined: NaiveDate,
    pub external_id: uuid::Uuid,
    #[record(skip)]
    pub password_hash: String,
}

#[derive(Debug, Clone, Record)]
pub struct OrderLine {
    pub quantity: i32,
    pub price: f64,
}

fn customer(id: i64, name: &str, email: Option<&str>) -> Customer {
    Customer {
        id,
        full_name: name.to_string(),
        email: email.map(str::to_string),
        joined: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        external_id: uuid::Uuid::nil(),
        password_hash: "x".to_string(),
    }
}

// ── Metadata ────────────────────────────────────────────────────────────

#[test]
fn test_entity_name_attribute() {
    assert_eq!(Customer::entity_name(), "customers");
}

#[test]
fn test_default_entity_name_is_snake_case() {
    assert_eq!(OrderLine::entity_name(), "order_line");
}

// ── Field access ────────────────────────────────────────────────────────

#[test]
fn test_field_lookup() {
    let c = customer(7, "Ann Lee", Some("ann@example.com"));
    assert_eq!(c.field("id"), Some(Value::Int(7)));
    assert_eq!(c.field("fullName"), Some(Value::from("Ann Lee")));
    assert_eq!(c.field("email"), Some(Value::from("ann@example.com")));
    assert_eq!(c.field("joined"), Some(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())));
}

#[test]
fn test_renamed_field_hides_rust_name() {
    let c = customer(1, "Ann", None);
    assert_eq!(c.field("full_name"), None);
}

#[test]
fn test_skipped_field_is_hidden() {
    let c = customer(1, "Ann", None);
    assert_eq!(c.field("password_hash"), None);
    assert!(c.field_values().iter().all(|(name, _)| *name != "password_hash"));
}

#[test]
fn test_none_becomes_null() {
    let c = customer(1, "Ann", None);
    assert_eq!(c.field("email"), Some(Value::Null));
}

#[test]
fn test_field_values_in_declaration_order() {
    let line = OrderLine { quantity: 3, price: 2.5 };
    assert_eq!(
        line.field_values(),
        vec![
            (Cow::Borrowed("quantity"), Value::Int(3)),
            (Cow::Borrowed("price"), Value::Float(2.5))
        ]
    );
}

// ── Evaluation ──────────────────────────────────────────────────────────

#[test]
fn test_specification_over_derived_records() {
    let customers = vec![
        customer(1, "Ann Lee", Some("ann@example.com")),
        customer(2, "Bob Stone", None),
        customer(3, "Annabel Ray", Some("annabel@example.org")),
    ];
    let mut spec = Specification::<Customer>::new();
    spec.query()
        .search(Lambda::member("fullName"), "ann%")
        .order_by_descending(Lambda::member("id"));

    let out = SpecificationEvaluator::<Customer>::new().evaluate(customers, &spec).unwrap();
    let ids: Vec<i64> = out.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[test]
fn test_arithmetic_over_derived_fields() {
    let line = OrderLine { quantity: 4, price: 2.5 };
    let total = Lambda::new(|l| l.clone().member("quantity") * l.member("price"));
    assert_eq!(total.invoke(&line).unwrap(), Value::Float(10.0));
}
