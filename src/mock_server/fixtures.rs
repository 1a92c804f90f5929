//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data, shaped like
//! the JSON the authoring API returns.

use serde_json::{json, Value};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Project Fixtures
    // =========================================================================

    /// Create a project with a single group.
    pub fn project(id: i64, name: &str, group_id: i64, group_name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "groups": [{"id": group_id, "name": group_name}]
        })
    }

    /// Create a project without groups, which cannot be activated.
    pub fn project_without_groups(id: i64, name: &str) -> Value {
        json!({"id": id, "name": name, "groups": []})
    }

    // =========================================================================
    // Specification Fixtures
    // =========================================================================

    /// Create a specification.
    pub fn specification(id: i64, prefix: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "prefix": prefix,
            "author": "alice",
            "docType": "REQUIREMENTS",
            "elementType": "REQUIREMENT",
            "checkInStatus": "CHECKED_IN",
            "parentId": null
        })
    }

    // =========================================================================
    // Element Fixtures
    // =========================================================================

    /// Create an element.
    pub fn element(id: i64, code: &str, name: &str) -> Value {
        json!({
            "id": id,
            "code": code,
            "name": name,
            "description": format!("<p>{name}</p>"),
            "status": "APPROVED",
            "owner": {"id": 7, "username": "alice"}
        })
    }

    // =========================================================================
    // Attribute Fixtures
    // =========================================================================

    /// The requirement-type attribute as attached to an element.
    pub fn requirement_type_attribute(value: &str) -> Value {
        json!({
            "id": 40,
            "name": "isRequirement",
            "description": "Requirement type",
            "baseType": "ENUMERATED",
            "isMultivalued": false,
            "values": [value]
        })
    }

    /// A multi-valued priority attribute.
    pub fn priority_attribute(values: &[&str]) -> Value {
        json!({
            "id": 41,
            "name": "Priority",
            "description": "Priority",
            "baseType": "ENUMERATED",
            "isMultivalued": true,
            "values": values
        })
    }

    /// The attribute types every default project defines.
    pub fn attribute_types() -> Vec<Value> {
        vec![
            json!({
                "id": 40,
                "name": "isRequirement",
                "baseType": "ENUMERATED",
                "isMultivalued": false,
                "enumValues": [
                    {"id": 1, "name": "Heading"},
                    {"id": 2, "name": "Item"},
                    {"id": 3, "name": "Text"}
                ]
            }),
            json!({
                "id": 41,
                "name": "Priority",
                "baseType": "ENUMERATED",
                "isMultivalued": true,
                "enumValues": [
                    {"id": 11, "name": "High"},
                    {"id": 12, "name": "Low"}
                ]
            }),
            json!({
                "id": 42,
                "name": "Rationale",
                "baseType": "TEXT",
                "isMultivalued": false
            }),
        ]
    }

    // =========================================================================
    // Relationship Fixtures
    // =========================================================================

    /// Create a relationship type.
    pub fn relationship_type(id: i64, name: &str) -> Value {
        json!({"id": id, "name": name, "direction": "FORWARD"})
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// Create a complete default scenario with related data.
    pub fn default_scenario() -> DefaultScenario {
        let projects = vec![
            Self::project(1, "Braking System", 10, "Authors"),
            Self::project(2, "Steering", 20, "Reviewers"),
        ];

        let specifications = vec![
            (1, Self::specification(100, "SYS", "System Requirements")),
            (1, Self::specification(101, "SW", "Software Requirements")),
            (2, Self::specification(200, "STR", "Steering Requirements")),
        ];

        let elements = vec![
            (100, Self::element(1001, "SYS-1", "Braking distance")),
            (100, Self::element(1002, "SYS-2", "Pedal force")),
            (100, Self::element(1003, "SYS-3", "Warning lamp")),
            (101, Self::element(1101, "SW-1", "ABS controller")),
        ];

        let element_attributes = elements
            .iter()
            .filter_map(|(_, e)| e.get("id").and_then(Value::as_i64))
            .map(|id| {
                (
                    id,
                    vec![
                        Self::requirement_type_attribute("Item"),
                        Self::priority_attribute(&["High"]),
                    ],
                )
            })
            .collect();

        DefaultScenario {
            projects,
            specifications,
            elements,
            element_attributes,
            attribute_types: vec![(1, Self::attribute_types()), (2, Self::attribute_types())],
            relationship_types: vec![
                Self::relationship_type(7, "Satisfies"),
                Self::relationship_type(8, "Verifies"),
            ],
        }
    }
}

/// A default test scenario with related entities.
pub struct DefaultScenario {
    pub projects: Vec<Value>,
    /// `(project id, specification)`
    pub specifications: Vec<(i64, Value)>,
    /// `(specification id, element)`
    pub elements: Vec<(i64, Value)>,
    pub element_attributes: Vec<(i64, Vec<Value>)>,
    pub attribute_types: Vec<(i64, Vec<Value>)>,
    pub relationship_types: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario() {
        let scenario = Fixtures::default_scenario();

        assert_eq!(scenario.projects.len(), 2);
        assert_eq!(scenario.specifications.len(), 3);
        assert_eq!(scenario.elements.len(), 4);
        assert_eq!(scenario.element_attributes.len(), 4);
        assert_eq!(scenario.relationship_types[0]["name"], "Satisfies");
    }

    #[test]
    fn test_requirement_type_enum_values() {
        let types = Fixtures::attribute_types();
        let names: Vec<&str> = types[0]["enumValues"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Heading", "Item", "Text"]);
    }
}
