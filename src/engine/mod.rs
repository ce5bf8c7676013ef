pub mod api;
pub mod custom_fields;
pub mod error;
pub mod feed;
pub mod form;
pub mod notes;
pub mod processor;
pub mod resolver;
pub mod settings;
pub mod tags;
pub mod validation;

// Re-export key types for easier access
pub use api::{ConvertKitClient, SubscriberApi};
pub use feed::{FeedConfig, FieldMap};
pub use form::{Entry, EntryValue, FieldDefinition, FieldInput, FormSchema, InputType};
pub use notes::{MemoryNoteSink, NoReviewRequest, NoteKind, NoteSink, OutcomeNote, ReviewRequest};
pub use processor::{FailureKind, FeedOutcome, FeedProcessor, ProcessingState};
pub use settings::Settings;
pub use tags::{ResolvedTag, TagResolution, TagSource};
