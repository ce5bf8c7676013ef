/*!
# convertkit-feed

Feed processing core that sends form-builder submissions to ConvertKit.

## Overview

A *feed* binds one form to one ConvertKit form. When an entry is submitted, the
[`FeedProcessor`] resolves the mapped email and name, validates the address, builds the
custom fields payload, resolves tags, creates the subscriber and applies the tags. Every
processed entry receives exactly one [`OutcomeNote`] through the configured [`NoteSink`].

## Key Components

* **SubscriberApi**: the remote operations the processor needs; [`ConvertKitClient`] implements it over HTTP
* **Field resolver**: maps field-map keys, composite name fields and entry meta to submitted values
* **Custom field mapper**: builds the `fields` payload from the remote custom field list
* **Tag resolution**: combines the feed's static tag with a tag named by a form field
* **FeedProcessor**: orchestrates the above and records the outcome

## Failure handling

Subscriber creation is the only step whose failure ends processing with an error note.
If custom fields or the tag list cannot be fetched the subscriber is still created
(the note is then a `partial-error`), and a failed tag application never stops the
remaining tags.

## Usage Example

```rust,no_run
use convertkit_feed::{
    ConvertKitClient, Entry, FeedConfig, FeedProcessor, FormSchema, MemoryNoteSink, Settings,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    let client = Arc::new(ConvertKitClient::new(&settings)?);
    let notes = Arc::new(MemoryNoteSink::new());

    let feed = FeedConfig::from_json(
        r#"{
            "id": 1,
            "name": "Newsletter",
            "remote_form_id": "1234",
            "tag_id": "",
            "field_map": {"email": "2", "name": "1.3"}
        }"#,
    )?;
    let schema = FormSchema::from_json(r#"{"id": 1, "fields": []}"#)?;
    let entry = Entry::new(42, 1)
        .with_value("1.3", "Jane")
        .with_value("2", "jane@example.com");

    let processor = FeedProcessor::new(client, notes.clone());
    let outcome = processor.process(&feed, &schema, &entry).await;

    println!("{:?}: {:?}", outcome.state, notes.notes_for(42));
    Ok(())
}
```
*/

pub mod engine;

// Re-export all public APIs for easier access
pub use engine::error::{
    ApiError, ApiResult, FeedError, MapperError, Result, TagLookupError, ValidationError, Warning,
};
pub use engine::{
    ConvertKitClient, Entry, EntryValue, FailureKind, FeedConfig, FeedOutcome, FeedProcessor,
    FieldDefinition, FieldInput, FieldMap, FormSchema, InputType, MemoryNoteSink, NoReviewRequest,
    NoteKind, NoteSink, OutcomeNote, ProcessingState, ResolvedTag, ReviewRequest, Settings,
    SubscriberApi, TagResolution, TagSource,
};
