//! # Feed Processing Module
//!
//! This module takes one submitted entry through one feed:
//!
//! `Start -> EmailResolved -> Validated -> SubscriberCreated -> TagsApplied -> Done`
//!
//! with an exit to `Failed` from validation or subscriber creation. Subscriber
//! creation is the only remote step whose failure is terminal. Custom fields,
//! the tag list and individual tag applications degrade gracefully, and nothing
//! already done is rolled back.

use crate::engine::api::{CustomFieldsPayload, SubscriberApi, SubscriberRef};
use crate::engine::custom_fields;
use crate::engine::error::{ApiError, ValidationError, Warning};
use crate::engine::feed::FeedConfig;
use crate::engine::form::{Entry, FormSchema};
use crate::engine::notes::{NoReviewRequest, NoteKind, NoteSink, OutcomeNote, ReviewRequest};
use crate::engine::resolver;
use crate::engine::tags::{self, TagResolution};
use crate::engine::validation::validate_email;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;

/// Why processing stopped early
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum FailureKind {
    Validation(ValidationError),
    Remote(ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    /// Feed inactive; nothing was attempted
    Skipped,
    Start,
    EmailResolved,
    Validated,
    SubscriberCreated,
    TagsApplied,
    Done,
    Failed(FailureKind),
}

/// Everything that happened while processing one entry through one feed
#[derive(Debug, Clone, Serialize)]
pub struct FeedOutcome {
    pub feed_id: u64,
    pub entry_id: u64,
    pub state: ProcessingState,
    /// The terminal note; `None` only for skipped feeds
    pub note: Option<OutcomeNote>,
    pub subscriber: Option<SubscriberRef>,
    pub custom_fields: CustomFieldsPayload,
    pub tags: TagResolution,
    /// Tags the remote service accepted, in application order
    pub applied_tags: Vec<u64>,
    pub warnings: Vec<Warning>,
}

impl FeedOutcome {
    fn new(feed: &FeedConfig, entry: &Entry) -> Self {
        Self {
            feed_id: feed.id,
            entry_id: entry.id,
            state: ProcessingState::Start,
            note: None,
            subscriber: None,
            custom_fields: CustomFieldsPayload::new(),
            tags: TagResolution::NoTags,
            applied_tags: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn transition(&mut self, state: ProcessingState) {
        debug!(
            "Feed {} entry {}: {:?} -> {:?}",
            self.feed_id, self.entry_id, self.state, state
        );
        self.state = state;
    }

    pub fn is_success(&self) -> bool {
        self.state == ProcessingState::Done
    }

    pub fn kind(&self) -> Option<NoteKind> {
        self.note.as_ref().map(|note| note.kind)
    }
}

/// Pushes form entries to the remote subscriber API according to feed configuration.
///
/// Holds its collaborators by `Arc` so one processor can be shared by every request
/// of a process; it keeps no per-request state of its own.
pub struct FeedProcessor {
    api: Arc<dyn SubscriberApi>,
    notes: Arc<dyn NoteSink>,
    review: Arc<dyn ReviewRequest>,
}

impl FeedProcessor {
    pub fn new(api: Arc<dyn SubscriberApi>, notes: Arc<dyn NoteSink>) -> Self {
        Self {
            api,
            notes,
            review: Arc::new(NoReviewRequest),
        }
    }

    /// Set the hook signalled after each successful subscription
    pub fn with_review_request(mut self, review: Arc<dyn ReviewRequest>) -> Self {
        self.review = review;
        self
    }

    /// Process one entry through every given feed, lowest priority value first.
    ///
    /// Feeds are independent: a failure in one does not affect the others.
    pub async fn process_feeds(
        &self,
        feeds: &[FeedConfig],
        schema: &FormSchema,
        entry: &Entry,
    ) -> Vec<FeedOutcome> {
        let mut ordered: Vec<&FeedConfig> = feeds.iter().collect();
        ordered.sort_by_key(|feed| (feed.priority, feed.id));

        let mut outcomes = Vec::with_capacity(ordered.len());
        for feed in ordered {
            outcomes.push(self.process(feed, schema, entry).await);
        }
        outcomes
    }

    /// Process one entry through one feed
    ///
    /// This method:
    /// 1. Resolves and validates the email address (no remote call on failure)
    /// 2. Builds the custom fields payload and resolves tags concurrently
    /// 3. Creates the subscriber (terminal on failure)
    /// 4. Applies each resolved tag, best effort
    /// 5. Records exactly one outcome note
    pub async fn process(
        &self,
        feed: &FeedConfig,
        schema: &FormSchema,
        entry: &Entry,
    ) -> FeedOutcome {
        let mut outcome = FeedOutcome::new(feed, entry);

        if !feed.is_active {
            debug!("Skipping feed {} - feed is inactive", feed.id);
            outcome.transition(ProcessingState::Skipped);
            return outcome;
        }

        let email = resolver::resolve(schema, entry, &feed.field_map.email);
        let name = resolver::resolve(schema, entry, &feed.field_map.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        outcome.transition(ProcessingState::EmailResolved);

        let email = match validate_email(email.as_deref()) {
            Ok(email) => email,
            Err(e) => return self.fail_validation(outcome, e),
        };
        let form_id = feed.remote_form_id;
        outcome.transition(ProcessingState::Validated);

        let dynamic_tag = feed
            .tag_field()
            .and_then(|field_id| resolver::resolve(schema, entry, field_id));

        let api = self.api.as_ref();
        let (custom_fields, (tags, tag_lookup_error)) = tokio::join!(
            custom_fields::build(api, &feed.custom_fields, schema, entry),
            tags::resolve_tags(api, feed.tag_id, dynamic_tag.as_deref()),
        );

        let mut degraded = false;
        outcome.custom_fields = match custom_fields {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Feed {}: {e}; subscribing without custom fields", feed.id);
                outcome.warnings.push(Warning::from_mapper(&e));
                degraded = true;
                CustomFieldsPayload::new()
            }
        };
        if let Some(e) = tag_lookup_error {
            outcome.warnings.push(Warning::from_tag_lookup(&e));
            degraded = true;
        }
        outcome.tags = tags;

        let subscriber = self
            .api
            .create_subscriber(form_id, &email, name.as_deref(), &outcome.custom_fields)
            .await;

        match subscriber {
            Ok(subscriber) => {
                outcome.subscriber = Some(subscriber);
                outcome.transition(ProcessingState::SubscriberCreated);
            }
            Err(e) => {
                error!(
                    "Feed {}: subscribing {email} to form {form_id} failed: {e}",
                    feed.id
                );
                let message = format!(
                    "Error subscribing {email} to ConvertKit form {form_id}: {}",
                    e.remote_message()
                );
                outcome.transition(ProcessingState::Failed(FailureKind::Remote(e)));
                self.record(&mut outcome, NoteKind::RemoteError, message);
                return outcome;
            }
        }

        for tag_id in outcome.tags.ids() {
            match self.api.apply_tag(tag_id, &email).await {
                Ok(()) => outcome.applied_tags.push(tag_id),
                Err(e) => {
                    warn!("Feed {}: tag {tag_id} not applied to {email}: {e}", feed.id);
                    outcome.warnings.push(Warning::tag_not_applied(tag_id, &e));
                }
            }
        }
        outcome.transition(ProcessingState::TagsApplied);

        let mut message = format!("Subscribed {email} to ConvertKit form {form_id}.");
        if !outcome.applied_tags.is_empty() {
            let ids: Vec<String> = outcome.applied_tags.iter().map(u64::to_string).collect();
            message.push_str(&format!(" Tags applied: {}.", ids.join(", ")));
        }

        let kind = if degraded {
            for warning in outcome
                .warnings
                .iter()
                .filter(|w| w.code != Warning::TAG_NOT_APPLIED)
            {
                message.push(' ');
                message.push_str(&warning.message);
            }
            NoteKind::PartialError
        } else {
            NoteKind::Success
        };

        outcome.transition(ProcessingState::Done);
        self.record(&mut outcome, kind, message);
        info!("Feed {} processed entry {}", feed.id, entry.id);

        self.review.request_review();
        outcome
    }

    fn fail_validation(&self, mut outcome: FeedOutcome, error: ValidationError) -> FeedOutcome {
        warn!(
            "Feed {} entry {}: {error}",
            outcome.feed_id, outcome.entry_id
        );
        let message = error.to_string();
        outcome.transition(ProcessingState::Failed(FailureKind::Validation(error)));
        self.record(&mut outcome, NoteKind::ValidationError, message);
        outcome
    }

    fn record(&self, outcome: &mut FeedOutcome, kind: NoteKind, message: String) {
        let note = OutcomeNote::new(outcome.entry_id, outcome.feed_id, kind, message);
        self.notes.add_note(&note);
        outcome.note = Some(note);
    }
}
