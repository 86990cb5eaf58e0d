//! Properties that must hold for every fixture document.

use pretty_assertions::assert_eq;
use serde_json::json;
use specmock_core::{Document, HttpMethod, SchemaNode};
use specmock_engine::{Engine, EngineOptions, PathMatcher, Request};
use specmock_schema::*;
use specmock_tests::{DocumentFixture, init_test_logging};
use std::sync::Arc;

fn option_grid() -> Vec<GeneratorOptions> {
    let mut grid = Vec::new();
    for properties in [PropertySelection::All, PropertySelection::Required] {
        for use_examples in [true, false] {
            grid.push(GeneratorOptions {
                properties,
                use_examples,
            });
        }
    }
    grid
}

#[test]
fn test_generated_definitions_validate() -> anyhow::Result<()> {
    init_test_logging();

    for fixture in DocumentFixture::all() {
        let document = fixture.build();
        let validator = SchemaValidator::new(document.clone(), ValidatorOptions::default());

        for options in option_grid() {
            let generator = ExampleGenerator::new(document.clone(), options.clone());
            for name in document.definitions().keys() {
                let example = generator.generate_definition(name)?;
                let result = validator.validate_definition(name, &example)?;
                assert!(
                    result.is_valid(),
                    "{}::{} with {:?} produced {} -> {:?}",
                    fixture.name,
                    name,
                    options,
                    example,
                    result.violations()
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_generated_responses_validate() -> anyhow::Result<()> {
    for fixture in DocumentFixture::all() {
        let engine = fixture.engine();
        let document = fixture.build();

        for operation in document.operations() {
            let examples = engine.enumerate_responses(&operation.path, operation.method)?;
            for (status, example) in &examples {
                let schema = operation.responses[status.as_str()]
                    .schema
                    .as_ref()
                    .expect("enumerated responses have schemas");
                let result = engine.validator().validate(schema, example)?;
                assert!(result.is_valid(), "{} {} {}", operation.operation_id, status, example);
            }

            let with_schema = operation
                .responses
                .values()
                .filter(|r| r.schema.is_some())
                .count();
            assert_eq!(examples.len(), with_schema);
        }
    }
    Ok(())
}

#[test]
fn test_generated_bodies_pass_request_validation() -> anyhow::Result<()> {
    let engine = DocumentFixture::pet_store().engine();

    let body = engine
        .example_request_body("/v2/pet", HttpMethod::Post)?
        .expect("addPet declares a body");
    let result = engine.validate_request(&Request::post("/v2/pet").body(body))?;
    assert_eq!(result, ValidationResult::Valid);

    let order = engine
        .example_request_body("/v2/store/order", HttpMethod::Post)?
        .expect("placeOrder declares a body");
    assert_eq!(order["shipDate"], json!("2015-08-28T09:02:57.481Z"));
    assert_eq!(order["complete"], json!(false));
    Ok(())
}

#[test]
fn test_recursive_definitions_terminate() -> anyhow::Result<()> {
    let document = DocumentFixture::recursive().build();
    let generator = ExampleGenerator::new(document, GeneratorOptions::default());

    assert_eq!(
        generator.generate_definition("ListNode")?,
        json!({"value": 42, "next": null})
    );
    assert_eq!(
        generator.generate_definition("TreeNode")?,
        json!({"label": "string", "children": []})
    );
    assert_eq!(
        generator.generate_definition("Employee")?,
        json!({"name": "string", "department": {"manager": null, "staff": []}})
    );
    Ok(())
}

#[test]
fn test_recursive_all_of_definitions_generate_and_validate() -> anyhow::Result<()> {
    init_test_logging();
    let document = DocumentFixture::recursive().build();
    let generator = ExampleGenerator::new(document.clone(), GeneratorOptions::default());
    let validator = SchemaValidator::new(document, ValidatorOptions::default());

    let category = generator.generate_definition("Category")?;
    assert_eq!(category, json!({"name": "string", "parent": null}));
    assert!(validator.validate_definition("Category", &category)?.is_valid());

    let folder = generator.generate_definition("Folder")?;
    assert_eq!(
        folder,
        json!({"name": "string", "owner": {"login": "string", "home": null}})
    );
    assert!(validator.validate_definition("Folder", &folder)?.is_valid());

    let nested = json!({"name": "docs", "parent": {"name": "root"}});
    assert!(validator.validate_definition("Category", &nested)?.is_valid());
    let broken = json!({"name": "docs", "parent": {"name": 7}});
    assert!(!validator.validate_definition("Category", &broken)?.is_valid());
    Ok(())
}

#[test]
fn test_reference_resolves_to_same_example_as_definition() -> anyhow::Result<()> {
    let document = DocumentFixture::pet_store().build();
    let generator = ExampleGenerator::new(document, GeneratorOptions::default());

    let direct = generator.generate_definition("Pet")?;
    let via_reference = generator.generate(&SchemaNode::reference("Pet"))?;
    assert_eq!(direct, via_reference);
    Ok(())
}

#[test]
fn test_memoized_examples_are_stable() -> anyhow::Result<()> {
    let document = DocumentFixture::pet_store().build();
    let generator = ExampleGenerator::new(document.clone(), GeneratorOptions::default());

    let names: Vec<&String> = document.definitions().keys().collect();
    let first = names
        .iter()
        .map(|name| generator.generate_definition(name))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(generator.cached(), names.len());

    for (name, expected) in names.iter().zip(&first) {
        assert_eq!(&generator.generate_definition(name)?, expected);
    }

    // Reverse request order on a cold generator yields the same values.
    let fresh = ExampleGenerator::new(document.clone(), GeneratorOptions::default());
    for (name, expected) in names.iter().zip(&first).rev() {
        assert_eq!(&fresh.generate_definition(name)?, expected);
    }
    Ok(())
}

#[test]
fn test_matcher_ignores_declaration_order() {
    let forward = Document::from_value(&json!({
        "paths": {
            "/users/{id}": {"get": {"responses": {}}},
            "/users/me": {"get": {"responses": {}}},
            "/{section}/me": {"get": {"responses": {}}}
        }
    }))
    .unwrap();
    let backward = Document::from_value(&json!({
        "paths": {
            "/{section}/me": {"get": {"responses": {}}},
            "/users/me": {"get": {"responses": {}}},
            "/users/{id}": {"get": {"responses": {}}}
        }
    }))
    .unwrap();

    for path in ["/users/me", "/users/7", "/teams/me"] {
        let a = PathMatcher::new(&forward).matches(path);
        let b = PathMatcher::new(&backward).matches(path);
        assert_eq!(a, b, "{path}");
    }
    assert_eq!(
        PathMatcher::new(&forward).matches("/users/me").map(|m| m.template),
        Some("/users/me".to_string())
    );
    assert_eq!(
        PathMatcher::new(&forward).matches("/teams/me").map(|m| m.template),
        Some("/{section}/me".to_string())
    );
}

#[test]
fn test_foo_scenario_end_to_end() -> anyhow::Result<()> {
    let engine = DocumentFixture::foo().engine();

    assert_eq!(
        engine.generator().generate_definition("Foo")?,
        json!({"foo": "string"})
    );

    let found = engine.matcher().matches("/foo").expect("/foo is declared");
    assert_eq!(found.template, "/foo");
    assert!(found.params.is_empty());

    let ok = engine.validate_request(&Request::post("/foo").body(json!({"foo": "bar"})))?;
    assert!(ok.is_valid());

    let missing = engine.validate_request(&Request::post("/foo").body(json!({})))?;
    assert_eq!(missing.violations().len(), 1);
    assert_eq!(missing.violations()[0].kind, ViolationKind::MissingRequired);
    assert!(missing.violations()[0].message.contains("foo"));
    Ok(())
}

#[test]
fn test_query_failures_accumulate() -> anyhow::Result<()> {
    let engine = DocumentFixture::pet_store().engine();

    let request = Request::get("/v2/pet/findByStatus?status=available,lost&limit=0");
    let result = engine.validate_request(&request)?;
    let paths: Vec<_> = result.violations().iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["/query/status/1", "/query/limit"]);

    let valid = engine.validate_request(&Request::get("/v2/pet/findByStatus?status=sold"))?;
    assert!(valid.is_valid());
    Ok(())
}

#[test]
fn test_engine_shared_across_threads() -> anyhow::Result<()> {
    let engine = Arc::new(Engine::new(
        DocumentFixture::pet_store().build(),
        EngineOptions::default(),
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let path = format!("/v2/pet/{}", i + 1);
                engine.enumerate_responses(&path, HttpMethod::Get)
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        let responses = handle.join().expect("worker panicked")?;
        results.push(responses);
    }
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(results[0].keys().collect::<Vec<_>>(), vec!["200", "404"]);
    Ok(())
}
