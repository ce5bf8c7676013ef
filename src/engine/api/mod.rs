//! # Remote Subscriber API
//!
//! [`SubscriberApi`] is the seam between the feed processor and ConvertKit. The
//! processor only ever talks to this trait; [`ConvertKitClient`] is the HTTP
//! implementation and tests substitute in-memory doubles.
//!
//! Every call is a single attempt. Failures come back as
//! [`ApiError`](crate::engine::error::ApiError) values and
//! never leave partial state behind.

pub mod client;
pub mod types;

pub use client::ConvertKitClient;
pub use types::{
    AccountInfo, CustomFieldsPayload, RemoteCustomField, RemoteForm, RemoteTag, SubscriberRef,
};

use crate::engine::error::ApiResult;
use async_trait::async_trait;

/// Operations the feed processor needs from the remote service
#[async_trait]
pub trait SubscriberApi: Send + Sync {
    /// Check an API key (and secret, when given) against the account
    async fn verify_credentials(&self, api_key: &str, api_secret: &str)
    -> ApiResult<AccountInfo>;

    async fn list_forms(&self) -> ApiResult<Vec<RemoteForm>>;

    async fn list_tags(&self) -> ApiResult<Vec<RemoteTag>>;

    async fn list_custom_fields(&self) -> ApiResult<Vec<RemoteCustomField>>;

    /// Subscribe `email` to the remote form, with optional first name and custom fields
    async fn create_subscriber(
        &self,
        form_id: u64,
        email: &str,
        name: Option<&str>,
        custom_fields: &CustomFieldsPayload,
    ) -> ApiResult<SubscriberRef>;

    async fn apply_tag(&self, tag_id: u64, email: &str) -> ApiResult<()>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording double used by the unit tests of the processing modules

    use super::*;
    use crate::engine::error::ApiError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        VerifyCredentials,
        ListForms,
        ListTags,
        ListCustomFields,
        CreateSubscriber {
            form_id: u64,
            email: String,
            name: Option<String>,
            custom_fields: CustomFieldsPayload,
        },
        ApplyTag {
            tag_id: u64,
            email: String,
        },
    }

    #[derive(Default)]
    pub struct MockApi {
        pub tags: Vec<RemoteTag>,
        pub custom_fields: Vec<RemoteCustomField>,
        pub tags_error: Option<ApiError>,
        pub custom_fields_error: Option<ApiError>,
        pub subscribe_error: Option<ApiError>,
        pub failing_tags: HashSet<u64>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_tag(mut self, id: u64, name: &str) -> Self {
            self.tags.push(RemoteTag {
                id,
                name: name.to_string(),
            });
            self
        }

        pub fn with_custom_field(mut self, id: u64, key: &str) -> Self {
            self.custom_fields.push(RemoteCustomField {
                id,
                name: format!("ck_field_{id}_{key}"),
                key: key.to_string(),
                label: key.to_string(),
            });
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn applied_tags(&self) -> Vec<u64> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::ApplyTag { tag_id, .. } => Some(tag_id),
                    _ => None,
                })
                .collect()
        }

        pub fn subscribe_calls(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|call| matches!(call, Call::CreateSubscriber { .. }))
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl SubscriberApi for MockApi {
        async fn verify_credentials(&self, _: &str, _: &str) -> ApiResult<AccountInfo> {
            self.record(Call::VerifyCredentials);
            Ok(AccountInfo::default())
        }

        async fn list_forms(&self) -> ApiResult<Vec<RemoteForm>> {
            self.record(Call::ListForms);
            Ok(vec![])
        }

        async fn list_tags(&self) -> ApiResult<Vec<RemoteTag>> {
            self.record(Call::ListTags);
            match &self.tags_error {
                Some(err) => Err(err.clone()),
                None => Ok(self.tags.clone()),
            }
        }

        async fn list_custom_fields(&self) -> ApiResult<Vec<RemoteCustomField>> {
            self.record(Call::ListCustomFields);
            match &self.custom_fields_error {
                Some(err) => Err(err.clone()),
                None => Ok(self.custom_fields.clone()),
            }
        }

        async fn create_subscriber(
            &self,
            form_id: u64,
            email: &str,
            name: Option<&str>,
            custom_fields: &CustomFieldsPayload,
        ) -> ApiResult<SubscriberRef> {
            self.record(Call::CreateSubscriber {
                form_id,
                email: email.to_string(),
                name: name.map(str::to_string),
                custom_fields: custom_fields.clone(),
            });
            match &self.subscribe_error {
                Some(err) => Err(err.clone()),
                None => Ok(SubscriberRef {
                    subscription_id: Some(1),
                    subscriber_id: Some(100),
                    state: Some("inactive".to_string()),
                }),
            }
        }

        async fn apply_tag(&self, tag_id: u64, email: &str) -> ApiResult<()> {
            self.record(Call::ApplyTag {
                tag_id,
                email: email.to_string(),
            });
            if self.failing_tags.contains(&tag_id) {
                return Err(ApiError::api("Not Found", format!("Tag {tag_id} not found")));
            }
            Ok(())
        }
    }
}
