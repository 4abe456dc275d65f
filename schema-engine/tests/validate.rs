//! Integration-level `compile`/`validate` round trips, one test per keyword
//! group plus cross-cutting behavior ($ref, dynamic scoping, drafts).

use schema_engine::{compile, validate, Draft, NoResolve, Options, Registry};
use schema_uri::AbsoluteUri;
use serde_json::{json, Value};
use test_case::test_case;

fn base_uri() -> AbsoluteUri {
    AbsoluteUri::parse("https://example.test/schema").unwrap()
}

fn check(schema: Value, instance: &Value, draft: Draft, expect_valid: bool) {
    let mut registry = Registry::new();
    let options = Options::new().with_default_draft(draft).with_default_base_uri(base_uri());
    let key = compile(&mut registry, schema, &NoResolve, &options).expect("schema compiles");
    let results = validate(&registry, key, instance, &options).expect("evaluates");
    assert_eq!(
        results.is_valid(),
        expect_valid,
        "schema_location={} errors={:?}",
        results.schema_location,
        results.errors
    );
}

#[test_case(json!({"type": "string"}), json!("hi"), true; "type matches")]
#[test_case(json!({"type": "string"}), json!(1), false; "type mismatch")]
#[test_case(json!({"type": ["string", "null"]}), json!(null), true; "type union")]
#[test_case(json!({"enum": [1, 2, 3]}), json!(2), true; "enum member")]
#[test_case(json!({"enum": [1, 2, 3]}), json!(4), false; "enum non member")]
#[test_case(json!({"const": "fixed"}), json!("fixed"), true; "const matches")]
#[test_case(json!({"const": "fixed"}), json!("other"), false; "const mismatch")]
#[test_case(json!({"multipleOf": 2}), json!(4), true; "multiple of holds")]
#[test_case(json!({"multipleOf": 2}), json!(5), false; "multiple of fails")]
#[test_case(json!({"maxLength": 3}), json!("abcd"), false; "max length exceeded")]
#[test_case(json!({"minLength": 3}), json!("ab"), false; "min length not met")]
#[test_case(json!({"pattern": "^a+$"}), json!("aaa"), true; "pattern matches")]
#[test_case(json!({"pattern": "^a+$"}), json!("bbb"), false; "pattern mismatch")]
fn scalar_keywords(schema: Value, instance: Value, expect_valid: bool) {
    check(schema, &instance, Draft::Draft202012, expect_valid);
}

#[test_case(json!({"maximum": 5}), json!(5), true; "inclusive maximum at bound")]
#[test_case(json!({"maximum": 5, "exclusiveMaximum": true}), json!(5), false; "draft07 boolean exclusive maximum at bound")]
#[test_case(json!({"maximum": 5, "exclusiveMaximum": true}), json!(4), true; "draft07 boolean exclusive maximum below bound")]
#[test_case(json!({"minimum": 5, "exclusiveMinimum": true}), json!(5), false; "draft07 boolean exclusive minimum at bound")]
#[test_case(json!({"minimum": 5, "exclusiveMinimum": true}), json!(6), true; "draft07 boolean exclusive minimum above bound")]
fn draft07_boolean_exclusive_bounds(schema: Value, instance: Value, expect_valid: bool) {
    check(schema, &instance, Draft::Draft07, expect_valid);
}

#[test]
fn draft202012_numeric_exclusive_bounds() {
    check(json!({"exclusiveMaximum": 5}), &json!(5), Draft::Draft202012, false);
    check(json!({"exclusiveMaximum": 5}), &json!(4), Draft::Draft202012, true);
    check(json!({"exclusiveMinimum": 5}), &json!(5), Draft::Draft202012, false);
}

#[test_case(json!({"maxItems": 2}), json!([1, 2, 3]), false; "max items exceeded")]
#[test_case(json!({"minItems": 2}), json!([1]), false; "min items not met")]
#[test_case(json!({"uniqueItems": true}), json!([1, 2, 2]), false; "duplicate items")]
#[test_case(json!({"uniqueItems": true}), json!([1, 2, 3]), true; "unique items hold")]
#[test_case(json!({"prefixItems": [{"type": "string"}, {"type": "number"}]}), json!(["a", 1]), true; "prefix items match")]
#[test_case(json!({"prefixItems": [{"type": "string"}], "items": {"type": "number"}}), json!(["a", 1, 2]), true; "items covers remainder")]
#[test_case(json!({"prefixItems": [{"type": "string"}], "items": false}), json!(["a", 1]), false; "items false rejects remainder")]
#[test_case(json!({"contains": {"const": 1}}), json!([0, 1, 2]), true; "contains finds match")]
#[test_case(json!({"contains": {"const": 9}}), json!([0, 1, 2]), false; "contains finds nothing")]
fn array_keywords(schema: Value, instance: Value, expect_valid: bool) {
    check(schema, &instance, Draft::Draft202012, expect_valid);
}

#[test_case(json!({"required": ["a"]}), json!({"b": 1}), false; "required property missing")]
#[test_case(json!({"maxProperties": 1}), json!({"a": 1, "b": 2}), false; "max properties exceeded")]
#[test_case(json!({"minProperties": 2}), json!({"a": 1}), false; "min properties not met")]
#[test_case(json!({"properties": {"a": {"type": "string"}}}), json!({"a": 1}), false; "properties type mismatch")]
#[test_case(json!({"patternProperties": {"^a": {"type": "string"}}}), json!({"abc": 1}), false; "pattern properties type mismatch")]
#[test_case(json!({"propertyNames": {"pattern": "^[a-z]+$"}}), json!({"Bad": 1}), false; "property names pattern fails")]
#[test_case(json!({"dependentRequired": {"a": ["b"]}}), json!({"a": 1}), false; "dependent required missing sibling")]
fn object_keywords(schema: Value, instance: Value, expect_valid: bool) {
    check(schema, &instance, Draft::Draft202012, expect_valid);
}

#[test_case(json!({"dependencies": {"a": ["b"]}}), json!({"a": 1}), false; "legacy dependencies array form")]
#[test_case(json!({"dependencies": {"a": {"required": ["b"]}}}), json!({"a": 1}), false; "legacy dependencies schema form")]
fn draft07_legacy_dependencies(schema: Value, instance: Value, expect_valid: bool) {
    check(schema, &instance, Draft::Draft07, expect_valid);
}

#[test]
fn applicator_keywords() {
    check(
        json!({"allOf": [{"type": "string"}, {"maxLength": 4}]}),
        &json!("abcd"),
        Draft::Draft202012,
        true,
    );
    check(
        json!({"allOf": [{"type": "string"}, {"maxLength": 2}]}),
        &json!("abcd"),
        Draft::Draft202012,
        false,
    );
    check(
        json!({"anyOf": [{"type": "string"}, {"type": "number"}]}),
        &json!(1),
        Draft::Draft202012,
        true,
    );
    check(
        json!({"anyOf": [{"type": "string"}, {"const": 1}]}),
        &json!(true),
        Draft::Draft202012,
        false,
    );
    check(
        json!({"oneOf": [{"type": "number"}, {"const": 1}]}),
        &json!(1),
        Draft::Draft202012,
        false,
    );
    check(
        json!({"oneOf": [{"type": "string"}, {"const": 1}]}),
        &json!(1),
        Draft::Draft202012,
        true,
    );
    check(json!({"not": {"type": "string"}}), &json!(1), Draft::Draft202012, true);
    check(json!({"not": {"type": "string"}}), &json!("x"), Draft::Draft202012, false);
    check(
        json!({"if": {"type": "string"}, "then": {"minLength": 3}, "else": {"minimum": 10}}),
        &json!("ab"),
        Draft::Draft202012,
        false,
    );
    check(
        json!({"if": {"type": "string"}, "then": {"minLength": 3}, "else": {"minimum": 10}}),
        &json!(5),
        Draft::Draft202012,
        false,
    );
}

#[test]
fn same_document_ref_resolves_forward_reference() {
    let schema = json!({
        "$id": "https://example.test/root",
        "properties": {"a": {"$ref": "#/$defs/positive"}},
        "$defs": {"positive": {"type": "integer", "minimum": 0}},
    });
    check(schema.clone(), &json!({"a": 5}), Draft::Draft202012, true);
    check(schema, &json!({"a": -1}), Draft::Draft202012, false);
}

#[test]
fn cross_document_ref_resolves_through_static_resolve() {
    use schema_engine::resolve::StaticResolve;

    let shared_uri = AbsoluteUri::parse("https://example.test/shared").unwrap();
    let shared = json!({"$id": "https://example.test/shared", "type": "integer", "minimum": 0});
    let resolver = StaticResolve::new().with(shared_uri, shared);

    let root = json!({
        "$id": "https://example.test/root",
        "properties": {"a": {"$ref": "https://example.test/shared"}},
    });
    let mut registry = Registry::new();
    let options = Options::new().with_default_draft(Draft::Draft202012);
    let key = compile(&mut registry, root, &resolver, &options).unwrap();

    let ok = validate(&registry, key, &json!({"a": 3}), &options).unwrap();
    assert!(ok.is_valid());
    let bad = validate(&registry, key, &json!({"a": -1}), &options).unwrap();
    assert!(!bad.is_valid());
}

#[test]
fn dynamic_ref_follows_the_innermost_matching_anchor() {
    let schema = json!({
        "$id": "https://example.test/extensible",
        "$dynamicAnchor": "node",
        "properties": {
            "children": {"type": "array", "items": {"$dynamicRef": "#node"}}
        }
    });
    check(schema, &json!({"children": [{"children": []}]}), Draft::Draft202012, true);
}

#[test]
fn recursive_ref_follows_2019_09_recursive_anchor() {
    let schema = json!({
        "$id": "https://example.test/extensible",
        "$recursiveAnchor": true,
        "properties": {
            "children": {"type": "array", "items": {"$recursiveRef": "#"}}
        }
    });
    check(schema, &json!({"children": [{"children": []}]}), Draft::Draft201909, true);
    check(
        json!({
            "$id": "https://example.test/extensible",
            "$recursiveAnchor": true,
            "properties": {"children": {"type": "array", "items": {"$recursiveRef": "#"}}}
        }),
        &json!({"children": [{"children": "not an array"}]}),
        Draft::Draft201909,
        false,
    );
}

#[test]
fn unevaluated_properties_rejects_what_no_sibling_covered() {
    let schema = json!({
        "allOf": [{"properties": {"a": {"type": "string"}}}],
        "unevaluatedProperties": false
    });
    check(schema.clone(), &json!({"a": "x"}), Draft::Draft202012, true);
    check(schema, &json!({"a": "x", "b": 1}), Draft::Draft202012, false);
}

#[test]
fn unevaluated_items_rejects_what_no_sibling_covered() {
    let schema = json!({
        "prefixItems": [{"type": "string"}],
        "unevaluatedItems": false
    });
    check(schema.clone(), &json!(["a"]), Draft::Draft202012, true);
    check(schema, &json!(["a", 1]), Draft::Draft202012, false);
}

#[test]
fn format_is_annotation_only_unless_validate_formats_is_enabled() {
    let schema = json!({"type": "string", "format": "email"});
    let instance = json!("not-an-email");

    let mut registry = Registry::new();
    let lax = Options::new().with_default_draft(Draft::Draft202012);
    let key = compile(&mut registry, schema.clone(), &NoResolve, &lax).unwrap();
    assert!(validate(&registry, key, &instance, &lax).unwrap().is_valid());

    let mut strict_registry = Registry::new();
    let strict = Options::new()
        .with_default_draft(Draft::Draft202012)
        .with_validate_formats(true);
    let strict_key = compile(&mut strict_registry, schema, &NoResolve, &strict).unwrap();
    assert!(!validate(&strict_registry, strict_key, &instance, &strict).unwrap().is_valid());
}

#[test]
fn content_encoding_base64_is_assertion_only_when_formats_are_validated() {
    let schema = json!({"contentEncoding": "base64"});
    let instance = json!("not valid base64!!");

    let mut registry = Registry::new();
    let lax = Options::new().with_default_draft(Draft::Draft202012);
    let key = compile(&mut registry, schema.clone(), &NoResolve, &lax).unwrap();
    assert!(validate(&registry, key, &instance, &lax).unwrap().is_valid());

    let mut strict_registry = Registry::new();
    let strict = Options::new()
        .with_default_draft(Draft::Draft202012)
        .with_validate_formats(true);
    let strict_key = compile(&mut strict_registry, schema, &NoResolve, &strict).unwrap();
    assert!(!validate(&strict_registry, strict_key, &instance, &strict).unwrap().is_valid());
}

#[test]
fn validate_schema_rejects_a_malformed_document() {
    let options = Options::new()
        .with_default_draft(Draft::Draft202012)
        .with_validate_schema(true);
    let mut registry = Registry::new();
    let err = compile(&mut registry, json!({"required": "should be an array"}), &NoResolve, &options)
        .expect_err("required must be an array of strings per the stand-in meta-schema");
    assert!(matches!(err, schema_engine::CompileError::SchemaInvalid { .. }));
}

#[test]
fn validate_schema_accepts_a_well_formed_document() {
    let options = Options::new()
        .with_default_draft(Draft::Draft202012)
        .with_validate_schema(true);
    let mut registry = Registry::new();
    compile(&mut registry, json!({"type": "object", "required": ["a"]}), &NoResolve, &options)
        .expect("well-formed schema passes the stand-in meta-schema check");
}

#[test]
fn basic_output_reports_flattened_errors_with_locations() {
    let mut registry = Registry::new();
    let options = Options::new().with_default_draft(Draft::Draft202012);
    let key = compile(
        &mut registry,
        json!({"allOf": [{"type": "string"}, {"maxLength": 2}]}),
        &NoResolve,
        &options,
    )
    .unwrap();
    let results = validate(&registry, key, &json!("abcd"), &options).unwrap();
    let basic = results.to_basic();
    assert!(!basic.valid);
    assert!(basic.units.iter().any(|u| u.keyword == Some("maxLength")));
}

#[test]
fn basic_output_on_a_valid_root_does_not_leak_sibling_errors() {
    let mut registry = Registry::new();
    let options = Options::new().with_default_draft(Draft::Draft202012);
    let key = compile(
        &mut registry,
        json!({"anyOf": [{"type": "string"}, {"type": "number"}], "title": "n"}),
        &NoResolve,
        &options,
    )
    .unwrap();
    let results = validate(&registry, key, &json!(5), &options).unwrap();
    let basic = results.to_basic();
    assert!(basic.valid);
    assert!(basic.units.iter().all(|u| u.valid), "a valid root must only lift passing units: {basic:?}");
    assert!(basic.units.iter().any(|u| u.keyword == Some("title")));
}

#[test]
fn hierarchical_output_keys_errors_and_annotations_by_keyword() {
    let mut registry = Registry::new();
    let options = Options::new().with_default_draft(Draft::Draft202012);
    let key = compile(
        &mut registry,
        json!({"allOf": [{"type": "string"}, {"maxLength": 2}]}),
        &NoResolve,
        &options,
    )
    .unwrap();
    let results = validate(&registry, key, &json!("abcd"), &options).unwrap();
    let hierarchical = results.to_hierarchical();
    let serialized = serde_json::to_value(&hierarchical).unwrap();
    assert!(serialized["nested"].is_array());
    let max_length_node = hierarchical
        .nested
        .iter()
        .find(|n| n.errors.contains_key("maxLength"))
        .expect("the maxLength branch reports its own error");
    assert!(!max_length_node.errors["maxLength"].is_empty());
    assert!(serde_json::to_value(max_length_node).unwrap()["errors"].is_object());
}

#[test]
fn pre_2020_12_output_reports_keyword_and_absolute_locations() {
    let mut registry = Registry::new();
    let options = Options::new().with_default_draft(Draft::Draft202012);
    let key = compile(
        &mut registry,
        json!({"allOf": [{"type": "string"}, {"maxLength": 2}]}),
        &NoResolve,
        &options,
    )
    .unwrap();
    let results = validate(&registry, key, &json!("abcd"), &options).unwrap();
    let legacy = results.to_pre_2020_12();
    assert!(!legacy.valid);
    assert!(legacy.error.is_some());
    assert!(!legacy.errors.is_empty());
    let serialized = serde_json::to_value(&legacy).unwrap();
    let nested_error = serialized["errors"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["errors"].is_array())
        .expect("the maxLength branch nests as its own error node");
    let leaf = nested_error["errors"][0].as_object().unwrap();
    assert!(leaf["keywordLocation"].as_str().unwrap().ends_with("/maxLength"));
    assert!(leaf["absoluteKeywordLocation"].as_str().unwrap().ends_with("/maxLength"));
    assert_eq!(leaf["instanceLocation"], "");
}

#[test]
fn dependent_schemas_contributes_evaluated_properties() {
    let schema = json!({
        "dependentSchemas": {"a": {"properties": {"b": {}}}},
        "unevaluatedProperties": false
    });
    check(schema, &json!({"a": 1, "b": 2}), Draft::Draft202012, true);
}

#[test]
fn if_contributes_evaluated_properties_when_it_passes() {
    let schema = json!({
        "if": {"properties": {"a": {"const": 1}}, "required": ["a"]},
        "then": {"properties": {"b": {}}},
        "unevaluatedProperties": false
    });
    check(schema, &json!({"a": 1, "b": 2}), Draft::Draft202012, true);
}
