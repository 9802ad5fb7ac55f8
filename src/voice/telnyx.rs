//! Telnyx Call Control v2.

use reqwest::blocking::Client;
use serde_json::{json, Value};

use super::provider::{CallContent, CallRequest, CallStatus, VoiceProvider};
use crate::error::{Error, Result};
use crate::http::{check_status, create_client};

const API_BASE: &str = "https://api.telnyx.com/v2";
const SERVICE: &str = "Telnyx";

/// JSON body for creating a call.
pub fn call_payload(request: &CallRequest, from: &str, connection_id: &str) -> Value {
    let tts = match &request.content {
        CallContent::Text(text) => json!({"text": text, "voice": "female"}),
        CallContent::Ssml(ssml) => json!({"ssml": ssml}),
    };
    let mut payload = json!({
        "from": from,
        "to": request.to,
        "connection_id": connection_id,
        "media_type": "audio",
        "tts": tts,
    });
    if let Some(url) = &request.webhook_url {
        payload["webhook_url"] = json!(url);
    }
    payload
}

fn data(body: &Value) -> Result<&Value> {
    body.get("data")
        .ok_or_else(|| Error::UnexpectedResponse(format!("Telnyx response without data: {}", body)))
}

/// Status of a call resource. Falls back to `is_alive` when no status is sent.
pub fn parse_status(call_id: &str, body: &Value) -> Result<CallStatus> {
    let data = data(body)?;
    let status = match data.get("status").and_then(Value::as_str) {
        Some(s) => s.to_string(),
        None => match data.get("is_alive").and_then(Value::as_bool) {
            Some(true) => "active".to_string(),
            Some(false) => "completed".to_string(),
            None => "unknown".to_string(),
        },
    };
    let mut call = CallStatus::new(call_id, status);
    call.duration = data
        .get("call_duration")
        .and_then(Value::as_u64)
        .and_then(|d| u32::try_from(d).ok());
    Ok(call)
}

/// Telnyx provider.
pub struct TelnyxProvider {
    http: Client,
    base_url: String,
    api_key: String,
    connection_id: String,
    from_number: String,
}

impl TelnyxProvider {
    pub fn new(
        api_key: impl Into<String>,
        connection_id: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let connection_id = connection_id.into();
        if api_key.is_empty() || connection_id.is_empty() {
            return Err(Error::Config("Telnyx credentials not configured".into()));
        }
        Ok(Self {
            http: create_client()?,
            base_url: API_BASE.to_string(),
            api_key,
            connection_id,
            from_number: from_number.into(),
        })
    }

    /// Override the API base URL (`https://api.telnyx.com/v2`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn calls_url(&self) -> String {
        format!("{}/calls", self.base_url)
    }
}

impl VoiceProvider for TelnyxProvider {
    fn name(&self) -> &'static str {
        "telnyx"
    }

    fn initiate_call(&mut self, request: &CallRequest) -> Result<CallStatus> {
        let payload = call_payload(request, &self.from_number, &self.connection_id);
        let response = self
            .http
            .post(self.calls_url())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        let body: Value = check_status(SERVICE, response)?.json()?;
        let call_id = data(&body)?
            .get("id")
            .or_else(|| body["data"].get("call_control_id"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::UnexpectedResponse(format!("Telnyx call without id: {}", body)))?;

        log::info!("Telnyx call {} to {}", call_id, request.to);
        let mut status = CallStatus::new(call_id, "active");
        status.to = Some(request.to.clone());
        Ok(status)
    }

    fn get_status(&mut self, call_id: &str) -> Result<CallStatus> {
        let response = self
            .http
            .get(format!("{}/{}", self.calls_url(), call_id))
            .bearer_auth(&self.api_key)
            .send()?;
        parse_status(call_id, &check_status(SERVICE, response)?.json::<Value>()?)
    }

    fn hangup(&mut self, call_id: &str) -> Result<CallStatus> {
        let response = self
            .http
            .post(format!("{}/{}/actions/hangup", self.calls_url(), call_id))
            .bearer_auth(&self.api_key)
            .json(&json!({}))
            .send()?;
        check_status(SERVICE, response)?;
        Ok(CallStatus::new(call_id, "completed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::run_blocking;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_text_payload() {
        let req = CallRequest::text("+15555550123", "hello");
        let payload = call_payload(&req, "+15555550000", "conn-1");
        assert_eq!(
            payload,
            json!({
                "from": "+15555550000",
                "to": "+15555550123",
                "connection_id": "conn-1",
                "media_type": "audio",
                "tts": {"text": "hello", "voice": "female"}
            })
        );
    }

    #[test]
    fn test_ssml_payload_with_webhook() {
        let req = CallRequest::ssml("+1", "<speak>hi</speak>").with_webhook("https://hook");
        let payload = call_payload(&req, "+2", "c");
        assert_eq!(payload["tts"], json!({"ssml": "<speak>hi</speak>"}));
        assert_eq!(payload["webhook_url"], "https://hook");
    }

    #[test]
    fn test_parse_status() {
        let status = parse_status("v3:abc", &json!({"data": {"status": "answered"}})).unwrap();
        assert_eq!(status.status, "answered");

        let alive = parse_status("v3:abc", &json!({"data": {"is_alive": false, "call_duration": 12}}))
            .unwrap();
        assert_eq!(alive.status, "completed");
        assert_eq!(alive.duration, Some(12));

        assert!(parse_status("x", &json!({"errors": []})).is_err());
    }

    #[test]
    fn test_missing_credentials() {
        assert!(TelnyxProvider::new("key", "", "+1").err().unwrap().is_config());
    }

    #[tokio::test]
    async fn test_initiate_call_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calls"))
            .and(header("authorization", "Bearer key-1"))
            .and(body_json(json!({
                "from": "+15555550000",
                "to": "+15555550123",
                "connection_id": "conn-1",
                "media_type": "audio",
                "tts": {"text": "hello", "voice": "female"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"call_control_id": "v3:ctl"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let base = server.uri();
        let status = run_blocking(move || {
            let mut provider =
                TelnyxProvider::new("key-1", "conn-1", "+15555550000")?.with_base_url(base);
            provider.initiate_call(&CallRequest::text("+15555550123", "hello"))
        })
        .await
        .unwrap();

        assert_eq!(status.call_id, "v3:ctl");
        assert_eq!(status.status, "active");
        assert_eq!(status.to.as_deref(), Some("+15555550123"));
    }

    #[tokio::test]
    async fn test_status_hangup_and_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calls/call-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"is_alive": true}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/calls/call-1/actions/hangup"))
            .and(header("authorization", "Bearer key-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/calls/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let base = server.uri();
        let (status, ended, missing) = run_blocking(move || {
            let mut provider = TelnyxProvider::new("key-1", "conn-1", "+1")?.with_base_url(base);
            Ok::<_, Error>((
                provider.get_status("call-1")?,
                provider.hangup("call-1")?,
                provider.get_status("gone").unwrap_err(),
            ))
        })
        .await
        .unwrap();

        assert_eq!(status.status, "active");
        assert_eq!(ended.status, "completed");
        assert!(matches!(missing, Error::Api { service: "Telnyx", status: 404, .. }));
    }
}
