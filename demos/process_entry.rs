//! # Process Entry Example
//!
//! Sends one form entry through a ConvertKit feed and prints the resulting note.
//!
//! The entry is resolved against a small contact form schema with a composite name
//! field, a custom field mapping and a dynamic tag taken from a dropdown.
//!
//! Configuration comes from the environment:
//! - `CONVERTKIT_API_KEY` (required)
//! - `CONVERTKIT_API_SECRET` (optional, enables account verification)
//! - `CONVERTKIT_DEBUG=1` logs request and response bodies
//! - `CONVERTKIT_FORM_ID` selects the ConvertKit form to subscribe to
//!
//! Run with: `RUST_LOG=debug cargo run --example process_entry`

use convertkit_feed::{
    ConvertKitClient, Entry, EntryValue, FeedConfig, FeedProcessor, FormSchema, MemoryNoteSink,
    Settings, SubscriberApi,
};
use std::collections::BTreeMap;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = Settings::from_env()?;
    let client = Arc::new(ConvertKitClient::new(&settings)?);

    let account = client
        .verify_credentials(&settings.api_key, &settings.api_secret)
        .await?;
    println!(
        "Connected to ConvertKit account {}",
        account.name.as_deref().unwrap_or("(key only)")
    );

    let forms = client.list_forms().await?;
    for form in &forms {
        println!("  form {:>8}  {}", form.id, form.name);
    }

    let remote_form_id = std::env::var("CONVERTKIT_FORM_ID")
        .ok()
        .and_then(|id| id.parse::<u64>().ok())
        .or_else(|| forms.first().map(|form| form.id))
        .ok_or("No ConvertKit form available")?;

    let schema = FormSchema::from_json(
        r#"{
            "id": 3,
            "title": "Contact us",
            "fields": [
                {"id": "1", "label": "Name", "type": "name", "inputs": [
                    {"id": "1.3", "label": "First"},
                    {"id": "1.6", "label": "Last"}
                ]},
                {"id": "2", "label": "Email", "type": "email"},
                {"id": "4", "label": "Interests", "type": "checkbox"},
                {"id": "5", "label": "Segment", "type": "select"}
            ]
        }"#,
    )?;

    let feed = FeedConfig::from_json(&format!(
        r#"{{
            "id": 1,
            "name": "Contact form to ConvertKit",
            "remote_form_id": "{remote_form_id}",
            "tag_id": "",
            "field_map": {{"email": "2", "name": "1.3", "tag": "5"}},
            "custom_fields": {{"last_name": "1.6", "interests": "4"}}
        }}"#
    ))?;

    let interests: BTreeMap<String, String> = [
        ("4.1".to_string(), "Rust".to_string()),
        ("4.2".to_string(), "Databases".to_string()),
    ]
    .into_iter()
    .collect();

    let entry = Entry::new(1001, 3)
        .with_value("1.3", "Jane")
        .with_value("1.6", "Doe")
        .with_value("2", "jane.doe@example.com")
        .with_value("4", EntryValue::Composite(interests))
        .with_value("5", "Customer");

    let notes = Arc::new(MemoryNoteSink::new());
    let processor = FeedProcessor::new(client, notes.clone());
    let outcome = processor.process(&feed, &schema, &entry).await;

    println!("State: {:?}", outcome.state);
    println!("Custom fields: {:?}", outcome.custom_fields);
    println!("Tags applied: {:?}", outcome.applied_tags);
    for note in notes.notes_for(entry.id) {
        println!("[{:?}] {}", note.kind, note.message);
    }

    Ok(())
}
