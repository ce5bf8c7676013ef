use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Custom field key -> submitted value, sent as `fields` on subscribe
pub type CustomFieldsPayload = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plan_type: Option<String>,
    #[serde(default)]
    pub primary_email_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteForm {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTag {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCustomField {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub label: String,
}

/// Reference to the subscription created by a form subscribe call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberRef {
    pub subscription_id: Option<u64>,
    pub subscriber_id: Option<u64>,
    pub state: Option<String>,
}

// Response envelopes. A missing list key decodes to an empty list.

#[derive(Debug, Deserialize)]
pub(crate) struct FormsResponse {
    #[serde(default)]
    pub forms: Vec<RemoteForm>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub tags: Vec<RemoteTag>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomFieldsResponse {
    #[serde(default)]
    pub custom_fields: Vec<RemoteCustomField>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionResponse {
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Subscription {
    pub id: Option<u64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub subscriber: Option<SubscriberId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriberId {
    pub id: u64,
}

impl From<SubscriptionResponse> for SubscriberRef {
    fn from(response: SubscriptionResponse) -> Self {
        match response.subscription {
            Some(subscription) => SubscriberRef {
                subscription_id: subscription.id,
                subscriber_id: subscription.subscriber.map(|s| s.id),
                state: subscription.state,
            },
            None => SubscriberRef::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscription_response() {
        let response: SubscriptionResponse = serde_json::from_value(json!({
            "subscription": {
                "id": 1,
                "state": "inactive",
                "created_at": "2016-02-28T08:07:00Z",
                "source": null,
                "referrer": null,
                "subscribable_id": 1,
                "subscribable_type": "form",
                "subscriber": {"id": 42}
            }
        }))
        .unwrap();

        let subscriber = SubscriberRef::from(response);
        assert_eq!(subscriber.subscription_id, Some(1));
        assert_eq!(subscriber.subscriber_id, Some(42));
        assert_eq!(subscriber.state.as_deref(), Some("inactive"));
    }

    #[test]
    fn test_missing_list_key_is_empty() {
        let response: TagsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.tags.is_empty());

        let response: CustomFieldsResponse = serde_json::from_value(json!({
            "custom_fields": [
                {"id": 1, "name": "ck_field_1_last_name", "key": "last_name", "label": "Last name"}
            ]
        }))
        .unwrap();
        assert_eq!(response.custom_fields[0].key, "last_name");
    }
}
