use crate::engine::error::{FeedError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Symbolic roles mapped to form field ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    /// Field whose submitted value is a tag *name*, resolved against the remote tag list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Saved configuration binding one form to one ConvertKit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Feeds on the same form are processed in ascending priority
    #[serde(default)]
    pub priority: u32,
    /// Remote ConvertKit form subscribers are added to. A feed cannot exist without one.
    #[serde(deserialize_with = "deserialize_required_id")]
    pub remote_form_id: u64,
    /// Tag applied to every subscriber created through this feed
    #[serde(default, deserialize_with = "deserialize_id")]
    pub tag_id: Option<u64>,
    #[serde(default)]
    pub field_map: FieldMap,
    /// ConvertKit custom field key -> form field id
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
}

fn default_active() -> bool {
    true
}

/// Remote ids are saved either as JSON numbers or as numeric strings; an empty
/// string or `null` means "not configured".
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id: {number}"))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {s}"))),
        other => Err(serde::de::Error::custom(format!("invalid id: {other}"))),
    }
}

fn deserialize_required_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_id(deserializer)?
        .filter(|id| *id != 0)
        .ok_or_else(|| serde::de::Error::custom("no ConvertKit form selected"))
}

impl FeedConfig {
    pub fn new(id: u64, remote_form_id: u64) -> Self {
        FeedConfig {
            id,
            name: String::new(),
            is_active: true,
            priority: 0,
            remote_form_id,
            tag_id: None,
            field_map: FieldMap::default(),
            custom_fields: BTreeMap::new(),
        }
    }

    // Load feed from JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(FeedError::from_serde)
    }

    // Load feed from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json_str = fs::read_to_string(path).map_err(FeedError::from_io)?;
        Self::from_json(&json_str)
    }

    /// Field id mapped to the dynamic tag, if one is mapped
    pub fn tag_field(&self) -> Option<&str> {
        self.field_map
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
