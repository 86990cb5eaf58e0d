//! Sample documents.

use serde_json::{Value, json};
use specmock_core::Document;
use specmock_engine::{Engine, EngineOptions};
use std::sync::Arc;

/// A named raw document.
#[derive(Debug, Clone)]
pub struct DocumentFixture {
    pub name: &'static str,
    pub raw: Value,
}

impl DocumentFixture {
    /// Build the document. Fixtures are well formed, so failure panics.
    pub fn build(&self) -> Arc<Document> {
        match Document::from_value(&self.raw) {
            Ok(document) => Arc::new(document),
            Err(e) => panic!("fixture {} is malformed: {}", self.name, e),
        }
    }

    pub fn engine(&self) -> Engine {
        Engine::new(self.build(), EngineOptions::default())
    }

    /// Every fixture, for properties that must hold across documents.
    pub fn all() -> Vec<DocumentFixture> {
        vec![
            Self::foo(),
            Self::pet_store(),
            Self::recursive(),
            Self::constrained(),
        ]
    }

    /// One definition and one operation consuming it.
    pub fn foo() -> Self {
        Self {
            name: "foo",
            raw: json!({
                "swagger": "2.0",
                "definitions": {
                    "Foo": {
                        "type": "object",
                        "properties": {"foo": {"type": "string"}},
                        "required": ["foo"]
                    }
                },
                "paths": {
                    "/foo": {
                        "post": {
                            "parameters": [
                                {"name": "body", "in": "body", "required": true, "schema": {"$ref": "#/definitions/Foo"}}
                            ],
                            "responses": {"200": {"description": "ok", "schema": {"$ref": "#/definitions/Foo"}}}
                        }
                    }
                }
            }),
        }
    }

    /// A small store with composition, shared parameters and responses.
    pub fn pet_store() -> Self {
        Self {
            name: "pet_store",
            raw: json!({
                "swagger": "2.0",
                "basePath": "/v2",
                "parameters": {
                    "petId": {"name": "petId", "in": "path", "type": "integer", "format": "int64"},
                    "limit": {"name": "limit", "in": "query", "type": "integer", "minimum": 1, "maximum": 100}
                },
                "responses": {
                    "NotFound": {"description": "not found", "schema": {"$ref": "#/definitions/ApiError"}}
                },
                "definitions": {
                    "ApiError": {
                        "type": "object",
                        "properties": {"code": {"type": "integer", "format": "int32"}, "message": {"type": "string"}},
                        "required": ["code", "message"]
                    },
                    "Category": {
                        "type": "object",
                        "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
                    },
                    "Tag": {
                        "type": "object",
                        "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
                    },
                    "Pet": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer", "format": "int64"},
                            "category": {"$ref": "#/definitions/Category"},
                            "name": {"type": "string", "example": "doggie"},
                            "photoUrls": {"type": "array", "items": {"type": "string", "format": "uri"}},
                            "tags": {"type": "array", "items": {"$ref": "#/definitions/Tag"}},
                            "status": {"type": "string", "enum": ["available", "pending", "sold"]}
                        },
                        "required": ["name", "photoUrls"]
                    },
                    "Dog": {
                        "allOf": [
                            {"$ref": "#/definitions/Pet"},
                            {"type": "object", "properties": {"packSize": {"type": "integer", "minimum": 0}}, "required": ["packSize"]}
                        ]
                    },
                    "Order": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer"},
                            "petId": {"type": "integer"},
                            "quantity": {"type": "integer", "minimum": 1},
                            "shipDate": {"type": "string", "format": "date-time"},
                            "complete": {"type": "boolean", "default": false},
                            "notes": {"type": "object", "additionalProperties": {"type": "string"}}
                        }
                    }
                },
                "paths": {
                    "/pet": {
                        "post": {
                            "operationId": "addPet",
                            "consumes": ["application/json"],
                            "parameters": [
                                {"name": "body", "in": "body", "required": true, "schema": {"$ref": "#/definitions/Pet"}}
                            ],
                            "responses": {"200": {"description": "ok", "schema": {"$ref": "#/definitions/Pet"}}, "405": {"description": "invalid"}}
                        }
                    },
                    "/pet/findByStatus": {
                        "get": {
                            "operationId": "findPetsByStatus",
                            "parameters": [
                                {"name": "status", "in": "query", "required": true, "type": "array", "items": {"type": "string", "enum": ["available", "pending", "sold"]}, "collectionFormat": "csv"},
                                {"$ref": "#/parameters/limit"}
                            ],
                            "responses": {"200": {"description": "ok", "schema": {"type": "array", "items": {"$ref": "#/definitions/Pet"}}}}
                        }
                    },
                    "/pet/{petId}": {
                        "parameters": [{"$ref": "#/parameters/petId"}],
                        "get": {
                            "operationId": "getPetById",
                            "responses": {
                                "200": {"description": "ok", "schema": {"$ref": "#/definitions/Pet"}},
                                "404": {"$ref": "#/responses/NotFound"}
                            }
                        },
                        "delete": {
                            "parameters": [{"name": "api_key", "in": "header", "type": "string"}],
                            "responses": {"400": {"description": "bad id"}}
                        }
                    },
                    "/store/order": {
                        "post": {
                            "operationId": "placeOrder",
                            "parameters": [
                                {"name": "body", "in": "body", "required": true, "schema": {"$ref": "#/definitions/Order"}}
                            ],
                            "responses": {"200": {"description": "ok", "schema": {"$ref": "#/definitions/Order"}}}
                        }
                    }
                }
            }),
        }
    }

    /// Self- and mutually-referential definitions.
    pub fn recursive() -> Self {
        Self {
            name: "recursive",
            raw: json!({
                "swagger": "2.0",
                "definitions": {
                    "ListNode": {
                        "type": "object",
                        "properties": {"value": {"type": "integer"}, "next": {"$ref": "#/definitions/ListNode"}},
                        "required": ["value", "next"]
                    },
                    "TreeNode": {
                        "type": "object",
                        "properties": {
                            "label": {"type": "string"},
                            "children": {"type": "array", "items": {"$ref": "#/definitions/TreeNode"}}
                        },
                        "required": ["label", "children"]
                    },
                    "Employee": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}, "department": {"$ref": "#/definitions/Department"}},
                        "required": ["department"]
                    },
                    "Department": {
                        "type": "object",
                        "properties": {
                            "manager": {"$ref": "#/definitions/Employee"},
                            "staff": {"type": "array", "items": {"$ref": "#/definitions/Employee"}}
                        }
                    },
                    "Category": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "parent": {"allOf": [{"$ref": "#/definitions/Category"}], "description": "enclosing category"}
                        },
                        "required": ["name"]
                    },
                    "Folder": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "owner": {"allOf": [{"$ref": "#/definitions/User"}]}
                        }
                    },
                    "User": {
                        "type": "object",
                        "properties": {
                            "login": {"type": "string"},
                            "home": {"allOf": [{"$ref": "#/definitions/Folder"}, {"required": ["name"]}]}
                        }
                    }
                },
                "paths": {
                    "/tree": {
                        "get": {"responses": {"200": {"description": "ok", "schema": {"$ref": "#/definitions/TreeNode"}}}}
                    }
                }
            }),
        }
    }

    /// Bounds, enums and formats on every primitive kind.
    pub fn constrained() -> Self {
        Self {
            name: "constrained",
            raw: json!({
                "swagger": "2.0",
                "definitions": {
                    "Reading": {
                        "type": "object",
                        "properties": {
                            "sensor": {"type": "string", "format": "uuid"},
                            "code": {"type": "string", "minLength": 12, "maxLength": 16},
                            "short": {"type": "string", "maxLength": 3},
                            "level": {"type": "integer", "minimum": 50, "exclusiveMinimum": true, "maximum": 60},
                            "ratio": {"type": "number", "minimum": 0, "maximum": 1},
                            "offset": {"type": "number", "maximum": -10},
                            "unit": {"type": "string", "enum": ["c", "f"]},
                            "enabled": {"type": "boolean", "enum": [false]},
                            "samples": {"type": "array", "items": {"type": "number"}, "minItems": 3, "maxItems": 5},
                            "metadata": {}
                        },
                        "required": ["sensor", "level"]
                    }
                },
                "paths": {}
            }),
        }
    }
}
