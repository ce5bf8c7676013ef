use crate::engine::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of input a form field renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Email,
    Name,
    Select,
    Radio,
    Checkbox,
    Hidden,
    Textarea,
    #[serde(other)]
    Other,
}

impl InputType {
    /// Separator used when a composite value of this type is flattened
    pub fn join_separator(&self) -> &'static str {
        match self {
            InputType::Name => " ",
            _ => ", ",
        }
    }
}

/// A sub-input of a composite field, e.g. `1.3` (first name) of name field `1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInput {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    #[serde(default)]
    pub supports_conditional_logic: bool,
    /// Sub-inputs, in display order. Empty for simple fields.
    #[serde(default)]
    pub inputs: Vec<FieldInput>,
}

impl FieldDefinition {
    pub fn is_composite(&self) -> bool {
        !self.inputs.is_empty()
    }
}

/// The form definition a submission was made against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl FormSchema {
    // Load a form schema from JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(FeedError::from_serde)
    }

    /// Finds the field with the given id
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Finds the composite field owning the given sub-input id
    pub fn parent_of(&self, input_id: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|field| field.inputs.iter().any(|input| input.id == input_id))
    }
}

/// A submitted value: either plain text or a composite keyed by sub-input id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Text(String),
    Composite(BTreeMap<String, String>),
}

impl From<&str> for EntryValue {
    fn from(value: &str) -> Self {
        EntryValue::Text(value.to_string())
    }
}

impl From<String> for EntryValue {
    fn from(value: String) -> Self {
        EntryValue::Text(value)
    }
}

/// One form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    #[serde(default)]
    pub form_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, EntryValue>,
}

impl Entry {
    pub fn new(id: u64, form_id: u64) -> Self {
        Self {
            id,
            form_id,
            ..Default::default()
        }
    }

    // Load an entry from JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(FeedError::from_serde)
    }

    /// Adds a submitted value, builder style
    pub fn with_value(mut self, field_id: impl Into<String>, value: impl Into<EntryValue>) -> Self {
        self.values.insert(field_id.into(), value.into());
        self
    }

    pub fn value(&self, field_id: &str) -> Option<&EntryValue> {
        self.values.get(field_id)
    }

    /// Entry meta addressable through a field map, the way form fields are
    pub fn meta(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.to_string()),
            "form_id" => Some(self.form_id.to_string()),
            "date_created" => self.date_created.clone(),
            "source_url" => self.source_url.clone(),
            "ip" => self.ip.clone(),
            _ => None,
        }
    }
}
