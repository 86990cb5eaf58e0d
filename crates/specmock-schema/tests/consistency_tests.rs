//! Generated examples validate against the schema they came from.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use specmock_core::Document;
use specmock_schema::*;
use std::sync::Arc;

fn store() -> Value {
    json!({
        "definitions": {
            "Category": {
                "type": "object",
                "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
            },
            "Tag": {
                "type": "object",
                "properties": {"label": {"type": "string", "minLength": 3, "maxLength": 8}},
                "required": ["label"]
            },
            "Pet": {
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "minimum": 1000},
                    "name": {"type": "string", "example": "doggie"},
                    "status": {"type": "string", "enum": ["available", "pending", "sold"]},
                    "born": {"type": "string", "format": "date-time"},
                    "weight": {"type": "number", "maximum": 2, "exclusiveMaximum": true},
                    "vaccinated": {"type": "boolean"},
                    "category": {"$ref": "#/definitions/Category"},
                    "tags": {"type": "array", "items": {"$ref": "#/definitions/Tag"}, "minItems": 2},
                    "attributes": {"type": "object", "additionalProperties": {"type": "integer"}}
                },
                "required": ["name", "category"]
            },
            "Tree": {
                "type": "object",
                "properties": {
                    "value": {"type": "integer"},
                    "children": {"type": "array", "items": {"$ref": "#/definitions/Tree"}},
                    "parent": {"$ref": "#/definitions/Tree"}
                },
                "required": ["value", "parent"]
            },
            "Husband": {
                "type": "object",
                "properties": {"wife": {"$ref": "#/definitions/Wife"}},
                "required": ["wife"]
            },
            "Wife": {
                "type": "object",
                "properties": {"husband": {"$ref": "#/definitions/Husband"}},
                "required": ["husband"]
            },
            "Alias": {"$ref": "#/definitions/Pet"}
        }
    })
}

fn document() -> Arc<Document> {
    Arc::new(Document::from_value(&store()).unwrap())
}

#[test]
fn test_every_definition_example_validates() {
    let doc = document();
    let validator = SchemaValidator::new(doc.clone(), ValidatorOptions::default());

    for selection in [PropertySelection::All, PropertySelection::Required] {
        for use_examples in [true, false] {
            let generator = ExampleGenerator::new(
                doc.clone(),
                GeneratorOptions {
                    properties: selection,
                    use_examples,
                },
            );
            for name in doc.definitions().keys() {
                let example = generator.generate_definition(name).unwrap();
                let result = validator.validate_definition(name, &example).unwrap();
                assert_eq!(result, ValidationResult::Valid, "{name}: {example}");
            }
        }
    }
}

#[test]
fn test_pet_example_shape() {
    let generator = ExampleGenerator::new(document(), GeneratorOptions::default());
    let pet = generator.generate_definition("Pet").unwrap();

    assert_eq!(pet["id"], json!(1000));
    assert_eq!(pet["name"], json!("doggie"));
    assert_eq!(pet["status"], json!("available"));
    assert_eq!(pet["born"], json!("2015-08-28T09:02:57.481Z"));
    assert_eq!(pet["vaccinated"], json!(true));
    assert_eq!(pet["tags"].as_array().unwrap().len(), 2);
    assert_eq!(pet["tags"][0], json!({"label": "string"}));
    assert_eq!(
        pet["attributes"],
        json!({"additionalProp1": 42, "additionalProp2": 42})
    );
    assert!(pet["weight"].as_f64().unwrap() < 2.0);
}

#[test]
fn test_alias_matches_target() {
    let generator = ExampleGenerator::new(document(), GeneratorOptions::default());
    assert_eq!(
        generator.generate_definition("Alias").unwrap(),
        generator.generate_definition("Pet").unwrap()
    );
}

#[test]
fn test_mutual_recursion_truncates() {
    let generator = ExampleGenerator::new(document(), GeneratorOptions::default());
    assert_eq!(
        generator.generate_definition("Husband").unwrap(),
        json!({"wife": {"husband": null}})
    );
}

#[test]
fn test_foo_scenario() {
    let doc = Arc::new(
        Document::from_value(&json!({
            "definitions": {
                "Foo": {
                    "type": "object",
                    "properties": {"foo": {"type": "string"}},
                    "required": ["foo"]
                }
            }
        }))
        .unwrap(),
    );
    let generator = ExampleGenerator::new(doc.clone(), GeneratorOptions::default());
    let validator = SchemaValidator::new(doc, ValidatorOptions::default());

    assert_eq!(generator.generate_definition("Foo").unwrap(), json!({"foo": "string"}));
    assert!(validator
        .validate_definition("Foo", &json!({"foo": "bar"}))
        .unwrap()
        .is_valid());

    let result = validator.validate_definition("Foo", &json!({})).unwrap();
    assert_eq!(result.violations().len(), 1);
    assert_eq!(result.violations()[0].kind, ViolationKind::MissingRequired);
    assert_eq!(result.violations()[0].path, "/foo");
}

#[test]
fn test_matching_definitions_for_generated_example() {
    let doc = document();
    let generator = ExampleGenerator::new(doc.clone(), GeneratorOptions::default());
    let validator = SchemaValidator::new(doc, ValidatorOptions::default());

    let tag = generator.generate_definition("Tag").unwrap();
    let names = validator.matching_definitions(&tag).unwrap();
    assert!(names.contains(&"Tag".to_string()));
    assert!(!names.contains(&"Pet".to_string()));
}

#[test]
fn test_shared_generator_across_threads() {
    let generator = Arc::new(ExampleGenerator::new(document(), GeneratorOptions::default()));
    let expected = generator.generate_definition("Tree").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let generator = generator.clone();
            std::thread::spawn(move || generator.generate_definition("Tree").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
