use crate::engine::api::SubscriberApi;
use crate::engine::api::types::{
    AccountInfo, CustomFieldsPayload, CustomFieldsResponse, FormsResponse, RemoteCustomField,
    RemoteForm, RemoteTag, SubscriberRef, SubscriptionResponse, TagsResponse,
};
use crate::engine::error::{ApiError, ApiResult, FeedError, Result};
use crate::engine::settings::Settings;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, StatusCode, header::ACCEPT};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// ConvertKit v3 REST client.
///
/// Uses the async reqwest client with a fixed timeout and no retries. The API key
/// travels as the `api_key` query credential on every request.
pub struct ConvertKitClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    debug: bool,
}

impl ConvertKitClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
            debug: settings.debug,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v3/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn require_key(&self) -> ApiResult<&str> {
        if self.api_key.trim().is_empty() {
            return Err(ApiError::MissingCredentials(
                "No API Key is configured".to_string(),
            ));
        }
        Ok(&self.api_key)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<T> {
        self.request(Method::GET, path, query, None).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &Value,
    ) -> ApiResult<T> {
        self.request(Method::POST, path, query, Some(body)).await
    }

    /// Perform one request and interpret the response.
    ///
    /// An `error` / `message` pair in the decoded body wins over the status code,
    /// so the remote explanation reaches the caller verbatim.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> ApiResult<T> {
        let url = self.url(path);
        if self.debug {
            debug!("ConvertKit request: {method} {url}");
        }

        let mut request = self
            .client
            .request(method, &url)
            .header(ACCEPT, "application/json")
            .query(query);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(format!("HTTP request timed out: {e}"))
            } else if e.is_connect() {
                ApiError::http(0, format!("Connection error: {e}"))
            } else {
                ApiError::http(
                    e.status().map_or(0, |s| s.as_u16()),
                    format!("HTTP request failed: {e}"),
                )
            }
        })?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| ApiError::http(status.as_u16(), format!("Failed to read response body: {e}")))?;

        if self.debug {
            debug!("ConvertKit response: {} {}", status.as_u16(), response_body);
        }

        let decoded = serde_json::from_str::<Value>(&response_body).ok();

        if let Some(err) = decoded.as_ref().and_then(error_pair) {
            return Err(err);
        }

        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), status_message(status)));
        }

        let value = decoded.ok_or_else(ApiError::parse_failed)?;
        serde_json::from_value(value).map_err(|_| ApiError::parse_failed())
    }
}

/// Generic message for a failed response whose body carried no error pair
fn status_message(status: StatusCode) -> String {
    match status.as_u16() {
        429 => "ConvertKit API Error: Rate limit hit".to_string(),
        500 => "ConvertKit API Error: Internal server error".to_string(),
        502 => "ConvertKit API Error: Bad gateway".to_string(),
        _ => format!(
            "ConvertKit API Error: {}",
            status.canonical_reason().unwrap_or("Unknown error")
        ),
    }
}

/// Extract an `error` / `message` pair from a decoded response
fn error_pair(value: &Value) -> Option<ApiError> {
    let code = value.get("error")?;
    let message = value.get("message")?;

    let as_text = |v: &Value| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Some(ApiError::api(as_text(code), as_text(message)))
}

#[async_trait]
impl SubscriberApi for ConvertKitClient {
    async fn verify_credentials(&self, api_key: &str, api_secret: &str) -> ApiResult<AccountInfo> {
        if api_key.trim().is_empty() {
            return Err(ApiError::MissingCredentials(
                "No API Key was specified".to_string(),
            ));
        }

        // The key is always checked on its own; the account endpoint only sees the secret.
        let _: FormsResponse = self.get("forms", &[("api_key", api_key)]).await?;
        if api_secret.trim().is_empty() {
            return Ok(AccountInfo::default());
        }

        self.get("account", &[("api_secret", api_secret)]).await
    }

    async fn list_forms(&self) -> ApiResult<Vec<RemoteForm>> {
        let api_key = self.require_key()?;
        let response: FormsResponse = self.get("forms", &[("api_key", api_key)]).await?;
        Ok(response.forms)
    }

    async fn list_tags(&self) -> ApiResult<Vec<RemoteTag>> {
        let api_key = self.require_key()?;
        let response: TagsResponse = self.get("tags", &[("api_key", api_key)]).await?;
        Ok(response.tags)
    }

    async fn list_custom_fields(&self) -> ApiResult<Vec<RemoteCustomField>> {
        let api_key = self.require_key()?;
        let response: CustomFieldsResponse =
            self.get("custom_fields", &[("api_key", api_key)]).await?;
        Ok(response.custom_fields)
    }

    async fn create_subscriber(
        &self,
        form_id: u64,
        email: &str,
        name: Option<&str>,
        custom_fields: &CustomFieldsPayload,
    ) -> ApiResult<SubscriberRef> {
        let api_key = self.require_key()?;

        let mut body = json!({ "email": email });
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            body["first_name"] = json!(name);
        }
        if !custom_fields.is_empty() {
            body["fields"] = json!(custom_fields);
        }

        let response: SubscriptionResponse = self
            .post(
                &format!("forms/{form_id}/subscribe"),
                &[("api_key", api_key)],
                &body,
            )
            .await?;
        Ok(response.into())
    }

    async fn apply_tag(&self, tag_id: u64, email: &str) -> ApiResult<()> {
        let api_key = self.require_key()?;
        let _: Value = self
            .post(
                &format!("tags/{tag_id}/subscribe"),
                &[("api_key", api_key)],
                &json!({ "email": email }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_pair() {
        let value = json!({"error": "Authorization Failed", "message": "API Key not valid"});
        assert_eq!(
            error_pair(&value),
            Some(ApiError::api("Authorization Failed", "API Key not valid"))
        );

        assert_eq!(error_pair(&json!({"error": "Only an error"})), None);
        assert_eq!(error_pair(&json!({"forms": []})), None);
    }

    #[test]
    fn test_url_building() {
        let client =
            ConvertKitClient::new(&Settings::new("key").with_base_url("http://localhost:8080/"))
                .unwrap();
        assert_eq!(client.url("forms"), "http://localhost:8080/v3/forms");
        assert_eq!(
            client.url("/tags/5/subscribe"),
            "http://localhost:8080/v3/tags/5/subscribe"
        );
    }

    #[test]
    fn test_status_message() {
        assert_eq!(
            status_message(StatusCode::INTERNAL_SERVER_ERROR),
            "ConvertKit API Error: Internal server error"
        );
        assert_eq!(
            status_message(StatusCode::TOO_MANY_REQUESTS),
            "ConvertKit API Error: Rate limit hit"
        );
        assert_eq!(
            status_message(StatusCode::NOT_FOUND),
            "ConvertKit API Error: Not Found"
        );
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("convertkit-feed/"));
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        // Unroutable base URL: any request would fail with a connection error instead
        let client =
            ConvertKitClient::new(&Settings::new("  ").with_base_url("http://127.0.0.1:9")).unwrap();

        let result = client.list_tags().await;
        assert!(matches!(result, Err(ApiError::MissingCredentials(_))));

        let result = client.verify_credentials("", "").await;
        assert!(matches!(result, Err(ApiError::MissingCredentials(_))));
    }
}
