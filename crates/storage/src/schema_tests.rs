// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn invoice_schema() -> SchemaDef {
    SchemaDef::new()
        .required("customer", FieldType::String)
        .required("total", FieldType::Number)
        .field("dueDate", FieldType::Timestamp)
        .field("lines", FieldType::Array)
}

#[parameterized(
    string = { FieldType::String, json!("x"), true },
    string_rejects_number = { FieldType::String, json!(1), false },
    number_accepts_float = { FieldType::Number, json!(1.5), true },
    integer_rejects_float = { FieldType::Integer, json!(1.5), false },
    integer = { FieldType::Integer, json!(-3), true },
    boolean = { FieldType::Boolean, json!(false), true },
    timestamp = { FieldType::Timestamp, json!("2024-05-01T12:00:00.000Z"), true },
    timestamp_rejects_date_only = { FieldType::Timestamp, json!("2024-05-01"), false },
    array = { FieldType::Array, json!([]), true },
    object = { FieldType::Object, json!({}), true },
    any = { FieldType::Any, json!(null), true },
)]
fn field_types(ty: FieldType, value: Value, expected: bool) {
    assert_eq!(ty.accepts(&value), expected);
}

#[test]
fn unknown_collection_is_not_validated() {
    let registry = SchemaRegistry::new();
    registry.register("invoices", invoice_schema());
    assert!(registry.validate("vendors", &doc(json!({}))).is_ok());
}

#[test]
fn conforming_record_passes() {
    let registry = SchemaRegistry::new();
    registry.register("invoices", invoice_schema());
    let record = doc(json!({
        "customer": "Acme",
        "total": 1200.5,
        "dueDate": "2024-06-01T00:00:00.000Z",
    }));
    assert!(registry.validate("invoices", &record).is_ok());
}

#[test]
fn violations_name_each_broken_rule() {
    let registry = SchemaRegistry::new();
    registry.register("invoices", invoice_schema());

    let err = registry
        .validate(
            "invoices",
            &doc(json!({ "customer": null, "total": "lots", "lines": {} })),
        )
        .unwrap_err();

    assert_eq!(err.collection, "invoices");
    assert_eq!(
        err.violations,
        vec![
            Violation {
                field: "customer".into(),
                kind: ViolationKind::Missing,
            },
            Violation {
                field: "lines".into(),
                kind: ViolationKind::WrongType {
                    expected: FieldType::Array,
                    found: "object",
                },
            },
            Violation {
                field: "total".into(),
                kind: ViolationKind::WrongType {
                    expected: FieldType::Number,
                    found: "string",
                },
            },
        ]
    );
    let message = err.to_string();
    assert!(message.contains("customer is required"), "{message}");
    assert!(message.contains("total must be number, got string"), "{message}");
}

#[test]
fn custom_checks_run_after_field_rules() {
    let schema = SchemaDef::new()
        .required("hours", FieldType::Number)
        .with_check("hours", |record| {
            match record.get("hours").and_then(Value::as_f64) {
                Some(h) if h > 24.0 => Err("cannot exceed 24 per day".to_string()),
                _ => Ok(()),
            }
        });

    let violations = schema.violations(&doc(json!({ "hours": 30 })));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].to_string(), "hours: cannot exceed 24 per day");
    assert!(schema.violations(&doc(json!({ "hours": 8 }))).is_empty());
}

#[test]
fn nested_fields_use_dotted_paths() {
    let schema = SchemaDef::new().required("address.city", FieldType::String);
    assert!(schema
        .violations(&doc(json!({ "address": { "city": "Tulsa" } })))
        .is_empty());
    assert_eq!(schema.violations(&doc(json!({ "address": {} }))).len(), 1);
}

#[test]
fn schema_deserializes_from_config_shape() {
    let schema: SchemaDef = serde_json::from_value(json!({
        "fields": {
            "name": { "type": "string", "required": true },
            "rate": { "type": "number" },
        }
    }))
    .unwrap();
    assert_eq!(
        schema.fields["name"],
        FieldRule {
            ty: FieldType::String,
            required: true,
        }
    );
    assert!(!schema.fields["rate"].required);
}

#[test]
fn registry_clones_share_schemas() {
    let registry = SchemaRegistry::new();
    let other = registry.clone();
    registry.register("jobs", SchemaDef::new());
    assert_eq!(other.names(), vec!["jobs"]);
    assert!(other.get("jobs").is_some());

    let collected: SchemaRegistry = vec![("a".to_string(), SchemaDef::new())].into_iter().collect();
    assert_eq!(collected.names(), vec!["a"]);
}
