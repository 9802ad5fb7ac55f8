//! Provider capability trait and call types.

use std::fmt;

use serde::Serialize;

use crate::error::Result;

/// Caller id used when `VOICE_FROM_NUMBER` is unset.
pub const DEFAULT_FROM_NUMBER: &str = "+15555550000";

/// What the callee hears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "body", rename_all = "lowercase")]
pub enum CallContent {
    /// Plain text read by the provider's TTS voice.
    Text(String),
    /// SSML markup.
    Ssml(String),
}

impl CallContent {
    pub fn body(&self) -> &str {
        match self {
            CallContent::Text(s) | CallContent::Ssml(s) => s,
        }
    }
}

/// An outbound call to place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: String,
    pub content: CallContent,
    /// Receives call status events, where the provider supports it.
    pub webhook_url: Option<String>,
}

impl CallRequest {
    pub fn text(to: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            content: CallContent::Text(message.into()),
            webhook_url: None,
        }
    }

    pub fn ssml(to: impl Into<String>, ssml: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            content: CallContent::Ssml(ssml.into()),
            webhook_url: None,
        }
    }

    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}

/// State of a call as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallStatus {
    pub call_id: String,
    /// Provider status string, e.g. `queued`, `in-progress`, `completed`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Call length in seconds, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl CallStatus {
    pub fn new(call_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            status: status.into(),
            to: None,
            duration: None,
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.call_id, self.status)?;
        if let Some(duration) = self.duration {
            write!(f, " ({}s)", duration)?;
        }
        Ok(())
    }
}

/// Operations every voice provider supports.
pub trait VoiceProvider {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Place a call.
    fn initiate_call(&mut self, request: &CallRequest) -> Result<CallStatus>;

    /// Query a call.
    fn get_status(&mut self, call_id: &str) -> Result<CallStatus>;

    /// End a call.
    fn hangup(&mut self, call_id: &str) -> Result<CallStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let mut status = CallStatus::new("CA1", "completed");
        assert_eq!(status.to_string(), "CA1: completed");
        status.duration = Some(30);
        assert_eq!(status.to_string(), "CA1: completed (30s)");
    }

    #[test]
    fn test_request_builders() {
        let req = CallRequest::ssml("+1", "<speak>hi</speak>").with_webhook("https://hook");
        assert_eq!(req.content.body(), "<speak>hi</speak>");
        assert_eq!(req.webhook_url.as_deref(), Some("https://hook"));
        assert!(matches!(CallRequest::text("+1", "hi").content, CallContent::Text(_)));
    }
}
