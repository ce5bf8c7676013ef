//! # Tag Resolution
//!
//! A subscriber can receive tags from two independent sources:
//!
//! * the static tag selected on the feed, applied to every subscriber;
//! * a form field whose submitted value is a tag *name*, matched exactly
//!   (case-sensitive) against the remote tag list.
//!
//! An unmatched name is not an error: select options can go stale and free text
//! can be anything. A failure fetching the tag list only disables the dynamic
//! source; the static tag is still resolved.

use crate::engine::api::{RemoteTag, SubscriberApi};
use crate::engine::error::TagLookupError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Where a resolved tag came from. Used for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TagSource {
    Static,
    Field { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTag {
    pub id: u64,
    #[serde(flatten)]
    pub source: TagSource,
}

/// Final, ordered and de-duplicated list of tags to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagResolution {
    NoTags,
    Tags(Vec<ResolvedTag>),
}

impl TagResolution {
    pub fn ids(&self) -> Vec<u64> {
        match self {
            TagResolution::NoTags => Vec::new(),
            TagResolution::Tags(tags) => tags.iter().map(|tag| tag.id).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TagResolution::NoTags)
    }
}

/// Resolve the tags for one subscriber.
///
/// Returns the resolution together with the tag-list lookup failure, if one
/// happened, so the caller can report it without losing the static tag.
pub async fn resolve_tags(
    api: &dyn SubscriberApi,
    static_tag: Option<u64>,
    dynamic_name: Option<&str>,
) -> (TagResolution, Option<TagLookupError>) {
    let mut lookup_error = None;

    let dynamic = match dynamic_name.filter(|name| !name.trim().is_empty()) {
        Some(name) => match api.list_tags().await {
            Ok(remote) => {
                let found = find_tag_id(&remote, name);
                if found.is_none() {
                    debug!("Tag '{name}' does not exist in ConvertKit, skipping");
                }
                found.map(|id| ResolvedTag {
                    id,
                    source: TagSource::Field {
                        name: name.to_string(),
                    },
                })
            }
            Err(e) => {
                warn!("Tag list unavailable, resolving static tag only: {e}");
                lookup_error = Some(TagLookupError(e));
                None
            }
        },
        None => None,
    };

    let static_tag = static_tag.map(|id| ResolvedTag {
        id,
        source: TagSource::Static,
    });

    (collect_tags(static_tag, dynamic), lookup_error)
}

/// Exact, case-sensitive name match
pub fn find_tag_id(tags: &[RemoteTag], name: &str) -> Option<u64> {
    tags.iter().find(|tag| tag.name == name).map(|tag| tag.id)
}

/// Combine the static and dynamic candidates, keeping first-seen order
pub fn collect_tags(static_tag: Option<ResolvedTag>, dynamic: Option<ResolvedTag>) -> TagResolution {
    let mut tags: Vec<ResolvedTag> = Vec::with_capacity(2);

    for candidate in [static_tag, dynamic].into_iter().flatten() {
        if candidate.id == 0 || tags.iter().any(|tag| tag.id == candidate.id) {
            continue;
        }
        tags.push(candidate);
    }

    if tags.is_empty() {
        TagResolution::NoTags
    } else {
        TagResolution::Tags(tags)
    }
}
