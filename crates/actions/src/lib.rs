//! Composio action client.
//!
//! Workflows reach the outside world (Gmail, Google Calendar, WhatsApp)
//! through Composio's hosted action execution API. Each helper wraps one
//! action and normalizes its payload into a small DTO.

use chrono::{Duration, SecondsFormat, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

const GMAIL_FETCH_EMAILS: &str = "GMAIL_FETCH_EMAILS";
const GMAIL_SEND_EMAIL: &str = "GMAIL_SEND_EMAIL";
const CALENDAR_FIND_EVENT: &str = "GOOGLECALENDAR_FIND_EVENT";
const WHATSAPP_SEND_MESSAGE: &str = "WHATSAPP_SEND_MESSAGE";

/// Failures executing a Composio action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Action client not configured: {0}")]
    NotConfigured(String),

    #[error("Action request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse action response: {0}")]
    Parse(String),
}

/// An unread email, as surfaced to workflows.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, rename = "from")]
    pub from: String,
    #[serde(default)]
    pub snippet: String,
}

/// A calendar event, as surfaced to workflows.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
}

/// Google Calendar timestamps: `date_time` for timed events, absent for
/// all-day ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventTime {
    #[serde(default, rename = "dateTime")]
    pub date_time: Option<String>,
}

/// HTTP client for Composio's action execution endpoint.
#[derive(Debug)]
pub struct ActionClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ActionClient {
    /// Create a client against the production Composio endpoint.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ActionError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ActionError::NotConfigured("Empty Composio API key".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ActionError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Execute one named action and return its `data` payload.
    async fn execute(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ActionError> {
        let url = format!("{}/actions/{}/execute", self.base_url, action);

        debug!(action, "Executing Composio action");

        let response = self
            .client
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "input": params }))
            .send()
            .await
            .map_err(|e| ActionError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            warn!(action, status, body = %body, "Composio action failed");
            return Err(ActionError::Api {
                status_code: status,
                message: body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ActionError::Parse(e.to_string()))?;

        Ok(body.get("data").cloned().unwrap_or_default())
    }

    /// Fetch emails from Gmail.
    pub async fn fetch_emails(
        &self,
        max_results: u32,
        query: &str,
    ) -> Result<Vec<EmailSummary>, ActionError> {
        let data = self
            .execute(
                GMAIL_FETCH_EMAILS,
                serde_json::json!({
                    "max_results": max_results,
                    "q": query,
                    "user_id": "me",
                }),
            )
            .await?;

        let messages = data.get("messages").cloned().unwrap_or_default();
        serde_json::from_value(messages).map_err(|e| ActionError::Parse(e.to_string()))
    }

    /// Fetch calendar events starting within the next `hours_ahead` hours.
    pub async fn fetch_calendar_events(
        &self,
        hours_ahead: i64,
    ) -> Result<Vec<CalendarEvent>, ActionError> {
        let now = Utc::now();
        let time_max = now + Duration::hours(hours_ahead);

        let data = self
            .execute(
                CALENDAR_FIND_EVENT,
                serde_json::json!({
                    "time_min": now.to_rfc3339_opts(SecondsFormat::Secs, true),
                    "time_max": time_max.to_rfc3339_opts(SecondsFormat::Secs, true),
                    "max_results": 10,
                }),
            )
            .await?;

        let items = data.get("items").cloned().unwrap_or_default();
        serde_json::from_value(items).map_err(|e| ActionError::Parse(e.to_string()))
    }

    /// Send an email via Gmail. Returns true if the API assigned an id.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<bool, ActionError> {
        let data = self
            .execute(
                GMAIL_SEND_EMAIL,
                serde_json::json!({
                    "recipient_email": to_email,
                    "subject": subject,
                    "body": body,
                    "user_id": "me",
                }),
            )
            .await?;

        Ok(data.get("id").and_then(|v| v.as_str()).is_some())
    }

    /// Send a WhatsApp message.
    pub async fn send_whatsapp(&self, phone_number: &str, message: &str) -> Result<(), ActionError> {
        self.execute(
            WHATSAPP_SEND_MESSAGE,
            serde_json::json!({
                "to": phone_number,
                "message": message,
            }),
        )
        .await?;
        Ok(())
    }
}
