//! # Field Resolution
//!
//! Turns a field-map key into the value the visitor submitted. Field map keys are
//! form field ids (`"2"`), sub-input ids of composite fields (`"1.3"`) or entry meta
//! keys (`"date_created"`). Absence is a valid outcome and resolves to `None`.

use crate::engine::form::{Entry, EntryValue, FieldDefinition, FormSchema, InputType};
use std::collections::BTreeMap;

/// Resolve the submitted value for `field_id`
pub fn resolve(schema: &FormSchema, entry: &Entry, field_id: &str) -> Option<String> {
    let field_id = field_id.trim();
    if field_id.is_empty() {
        return None;
    }

    match entry.value(field_id) {
        Some(EntryValue::Text(value)) => return Some(value.clone()),
        Some(EntryValue::Composite(parts)) => {
            return Some(join_composite(schema.field(field_id), parts));
        }
        None => {}
    }

    // Composite field stored flat: "1" mapped, entry holds "1.3" and "1.6"
    if let Some(field) = schema.field(field_id).filter(|field| field.is_composite()) {
        let parts: BTreeMap<String, String> = field
            .inputs
            .iter()
            .filter_map(|input| match entry.value(&input.id) {
                Some(EntryValue::Text(value)) => Some((input.id.clone(), value.clone())),
                _ => None,
            })
            .collect();

        if !parts.is_empty() {
            return Some(join_composite(Some(field), &parts));
        }
    }

    // Sub-input mapped, entry holds the parent as a composite object
    if let Some(parent) = schema.parent_of(field_id) {
        if let Some(EntryValue::Composite(parts)) = entry.value(&parent.id) {
            return parts.get(field_id).cloned();
        }
    }

    entry.meta(field_id)
}

/// Flatten a composite value, following the schema's input order when it is known
fn join_composite(field: Option<&FieldDefinition>, parts: &BTreeMap<String, String>) -> String {
    let separator = field
        .map(|f| f.input_type)
        .unwrap_or(InputType::Other)
        .join_separator();

    let ordered: Vec<&str> = match field.filter(|f| f.is_composite()) {
        Some(field) => field
            .inputs
            .iter()
            .filter_map(|input| parts.get(&input.id))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect(),
        None => parts
            .values()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect(),
    };

    ordered.join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::form::FieldInput;

    fn schema() -> FormSchema {
        FormSchema {
            id: 1,
            title: "Contact".to_string(),
            fields: vec![
                FieldDefinition {
                    id: "1".to_string(),
                    label: "Name".to_string(),
                    input_type: InputType::Name,
                    supports_conditional_logic: false,
                    inputs: vec![
                        FieldInput {
                            id: "1.2".to_string(),
                            label: "Prefix".to_string(),
                        },
                        FieldInput {
                            id: "1.3".to_string(),
                            label: "First".to_string(),
                        },
                        FieldInput {
                            id: "1.6".to_string(),
                            label: "Last".to_string(),
                        },
                    ],
                },
                FieldDefinition {
                    id: "2".to_string(),
                    label: "Email".to_string(),
                    input_type: InputType::Email,
                    supports_conditional_logic: true,
                    inputs: vec![],
                },
                FieldDefinition {
                    id: "4".to_string(),
                    label: "Interests".to_string(),
                    input_type: InputType::Checkbox,
                    supports_conditional_logic: true,
                    inputs: vec![
                        FieldInput {
                            id: "4.1".to_string(),
                            label: "Rust".to_string(),
                        },
                        FieldInput {
                            id: "4.2".to_string(),
                            label: "Go".to_string(),
                        },
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_plain_value() {
        let entry = Entry::new(1, 1).with_value("2", "jane@example.com");
        assert_eq!(
            resolve(&schema(), &entry, "2").as_deref(),
            Some("jane@example.com")
        );
    }

    #[test]
    fn test_empty_field_id() {
        let entry = Entry::new(1, 1).with_value("2", "jane@example.com");
        assert_eq!(resolve(&schema(), &entry, ""), None);
        assert_eq!(resolve(&schema(), &entry, "   "), None);
    }

    #[test]
    fn test_missing_field() {
        let entry = Entry::new(1, 1);
        assert_eq!(resolve(&schema(), &entry, "2"), None);
        assert_eq!(resolve(&schema(), &entry, "1"), None);
        assert_eq!(resolve(&schema(), &entry, "99"), None);
    }

    #[test]
    fn test_flat_name_is_joined_in_input_order() {
        let entry = Entry::new(1, 1)
            .with_value("1.6", "Doe")
            .with_value("1.3", "Jane");
        assert_eq!(resolve(&schema(), &entry, "1").as_deref(), Some("Jane Doe"));
        assert_eq!(resolve(&schema(), &entry, "1.3").as_deref(), Some("Jane"));
    }

    #[test]
    fn test_composite_name_object() {
        let mut parts = BTreeMap::new();
        parts.insert("1.3".to_string(), "Jane".to_string());
        parts.insert("1.6".to_string(), "Doe".to_string());
        parts.insert("1.2".to_string(), "".to_string());
        let entry = Entry::new(1, 1).with_value("1", EntryValue::Composite(parts));

        assert_eq!(resolve(&schema(), &entry, "1").as_deref(), Some("Jane Doe"));
        assert_eq!(resolve(&schema(), &entry, "1.6").as_deref(), Some("Doe"));
        assert_eq!(resolve(&schema(), &entry, "1.2").as_deref(), Some(""));
    }

    #[test]
    fn test_checkbox_is_comma_joined() {
        let entry = Entry::new(1, 1)
            .with_value("4.1", "Rust")
            .with_value("4.2", "Go");
        assert_eq!(resolve(&schema(), &entry, "4").as_deref(), Some("Rust, Go"));
    }

    #[test]
    fn test_entry_meta_keys() {
        let mut entry = Entry::new(55, 1);
        entry.ip = Some("127.0.0.1".to_string());
        assert_eq!(resolve(&schema(), &entry, "id").as_deref(), Some("55"));
        assert_eq!(resolve(&schema(), &entry, "ip").as_deref(), Some("127.0.0.1"));
    }
}
