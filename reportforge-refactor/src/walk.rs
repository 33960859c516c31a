//! Tree-walk primitives over visual documents.
//!
//! Visual queries are deep, loosely-schematized JSON. The walkers here visit
//! every object node generically (so unknown shapes pass through untouched)
//! and pair that with typed extraction for the two shapes the refactoring
//! engine understands: field-reference nodes and projection nodes.
//!
//! Traversal depth is capped at [`MAX_DEPTH`]. Well-formed documents stay
//! under 10 levels; the cap only exists so a hand-edited, self-nested
//! document cannot blow the stack.

use serde_json::{Map, Value};

/// Hard ceiling on traversal depth.
pub const MAX_DEPTH: usize = 32;

/// Visit every object node in the tree, outermost first.
pub fn visit_objects<F>(value: &Value, visit: &mut F)
where
    F: FnMut(&Map<String, Value>),
{
    visit_objects_at(value, 0, visit);
}

fn visit_objects_at<F>(value: &Value, depth: usize, visit: &mut F)
where
    F: FnMut(&Map<String, Value>),
{
    if depth >= MAX_DEPTH {
        return;
    }
    match value {
        Value::Object(map) => {
            visit(map);
            for child in map.values() {
                visit_objects_at(child, depth + 1, visit);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit_objects_at(item, depth + 1, visit);
            }
        }
        _ => {}
    }
}

/// Visit every object node mutably, outermost first.
pub fn visit_objects_mut<F>(value: &mut Value, visit: &mut F)
where
    F: FnMut(&mut Map<String, Value>),
{
    visit_objects_mut_at(value, 0, visit);
}

fn visit_objects_mut_at<F>(value: &mut Value, depth: usize, visit: &mut F)
where
    F: FnMut(&mut Map<String, Value>),
{
    if depth >= MAX_DEPTH {
        return;
    }
    match value {
        Value::Object(map) => {
            visit(map);
            for child in map.values_mut() {
                visit_objects_mut_at(child, depth + 1, visit);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit_objects_mut_at(item, depth + 1, visit);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Typed extraction
// ---------------------------------------------------------------------------

/// A field-reference node:
/// `{"Expression": {"SourceRef": {"Entity": ...}}, "Property": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNode<'a> {
    pub entity: Option<&'a str>,
    pub property: &'a str,
}

/// Recognize a field-reference node. `entity` is `None` when the node has a
/// `Property` but no readable `Expression.SourceRef.Entity` (seen in
/// hand-edited documents).
pub fn as_field_node(map: &Map<String, Value>) -> Option<FieldNode<'_>> {
    let property = map.get("Property")?.as_str()?;
    let entity = map
        .get("Expression")
        .and_then(|e| e.get("SourceRef"))
        .and_then(|s| s.get("Entity"))
        .and_then(Value::as_str);
    Some(FieldNode { entity, property })
}

/// A projection node carrying display metadata:
/// `{"displayName": ..., "nativeQueryRef": ..., ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionNode<'a> {
    pub display_name: &'a str,
    pub native_query_ref: &'a str,
}

pub fn as_projection_node(map: &Map<String, Value>) -> Option<ProjectionNode<'_>> {
    Some(ProjectionNode {
        display_name: map.get("displayName")?.as_str()?,
        native_query_ref: map.get("nativeQueryRef")?.as_str()?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn visits_nested_objects_in_arrays() {
        let doc = json!({"a": [{"b": {"c": 1}}, {"d": 2}], "e": {"f": 3}});
        let mut keys = Vec::new();
        visit_objects(&doc, &mut |map| {
            keys.extend(map.keys().cloned());
        });
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn depth_cap_stops_descent() {
        // Build a chain deeper than MAX_DEPTH.
        let mut doc = json!({"leaf": true});
        for _ in 0..(MAX_DEPTH + 10) {
            doc = json!({"next": doc});
        }
        let mut count = 0usize;
        visit_objects(&doc, &mut |_| count += 1);
        assert!(count <= MAX_DEPTH, "visited {count} nodes past the cap");
    }

    #[test]
    fn field_node_extraction() {
        let doc = json!({
            "Expression": {"SourceRef": {"Entity": "Sales"}},
            "Property": "Amount"
        });
        let node = as_field_node(doc.as_object().unwrap()).unwrap();
        assert_eq!(node.entity, Some("Sales"));
        assert_eq!(node.property, "Amount");
    }

    #[test]
    fn field_node_without_entity() {
        let doc = json!({"Property": "Amount"});
        let node = as_field_node(doc.as_object().unwrap()).unwrap();
        assert_eq!(node.entity, None);
    }

    #[test]
    fn non_field_objects_are_ignored() {
        let doc = json!({"Property": 42});
        assert!(as_field_node(doc.as_object().unwrap()).is_none());
        let doc = json!({"displayName": "x"});
        assert!(as_projection_node(doc.as_object().unwrap()).is_none());
    }

    #[test]
    fn mutation_through_visitor() {
        let mut doc = json!({"outer": {"Property": "Old", "Expression": {"SourceRef": {"Entity": "T"}}}});
        visit_objects_mut(&mut doc, &mut |map| {
            if map.get("Property").and_then(Value::as_str) == Some("Old") {
                map.insert("Property".to_owned(), json!("New"));
            }
        });
        assert_eq!(doc["outer"]["Property"], "New");
    }
}
