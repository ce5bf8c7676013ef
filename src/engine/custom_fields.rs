//! # Custom Field Mapping
//!
//! Builds the `fields` payload of a subscribe call by walking the custom fields
//! ConvertKit currently defines and picking the ones the feed maps to a form field.
//! Remote fields without a mapping are skipped; mapped keys ConvertKit no longer
//! knows about are dropped with them.

use crate::engine::api::{CustomFieldsPayload, RemoteCustomField, SubscriberApi};
use crate::engine::error::MapperError;
use crate::engine::form::{Entry, FormSchema};
use crate::engine::resolver;
use log::debug;
use std::collections::BTreeMap;

/// Fetch the remote custom fields and build the payload for this entry.
///
/// An empty mapping needs no remote metadata and returns an empty payload directly.
pub async fn build(
    api: &dyn SubscriberApi,
    mapping: &BTreeMap<String, String>,
    schema: &FormSchema,
    entry: &Entry,
) -> Result<CustomFieldsPayload, MapperError> {
    if mapping.is_empty() {
        return Ok(CustomFieldsPayload::new());
    }

    let remote = api.list_custom_fields().await.map_err(MapperError)?;
    Ok(map_custom_fields(&remote, mapping, schema, entry))
}

/// Cross-reference remote custom fields against the feed mapping
pub fn map_custom_fields(
    remote: &[RemoteCustomField],
    mapping: &BTreeMap<String, String>,
    schema: &FormSchema,
    entry: &Entry,
) -> CustomFieldsPayload {
    let mut payload = CustomFieldsPayload::new();

    for custom_field in remote {
        let Some(field_id) = mapping.get(&custom_field.key) else {
            continue;
        };

        let value = resolver::resolve(schema, entry, field_id).unwrap_or_default();
        debug!(
            "Custom field {} mapped from form field {}",
            custom_field.key, field_id
        );
        payload.insert(custom_field.key.clone(), value);
    }

    payload
}
