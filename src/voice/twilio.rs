//! Twilio Programmable Voice over its REST API.

use reqwest::blocking::Client;
use serde_json::Value;

use super::provider::{CallContent, CallRequest, CallStatus, VoiceProvider};
use crate::error::{Error, Result};
use crate::http::{check_status, create_client};

const API_BASE: &str = "https://api.twilio.com/2010-04-01";
const SERVICE: &str = "Twilio";

/// Escape text placed inside a TwiML element.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// TwiML document for a call. SSML is embedded as-is.
pub fn twiml(content: &CallContent) -> String {
    match content {
        CallContent::Text(message) => {
            format!("<Response><Say>{}</Say></Response>", escape_xml(message))
        }
        CallContent::Ssml(ssml) => format!("<Response>{}</Response>", ssml),
    }
}

/// Read a call resource. Twilio sends `duration` as a string.
pub fn parse_call(body: &Value) -> Result<CallStatus> {
    let field = |name: &str| body.get(name).and_then(Value::as_str);
    let sid = field("sid")
        .ok_or_else(|| Error::UnexpectedResponse(format!("Twilio call without sid: {}", body)))?;
    let mut status = CallStatus::new(sid, field("status").unwrap_or("unknown"));
    status.to = field("to").map(str::to_string);
    status.duration = match body.get("duration") {
        Some(Value::String(s)) => s.parse().ok(),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    };
    Ok(status)
}

/// Twilio provider.
pub struct TwilioProvider {
    http: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioProvider {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Result<Self> {
        let account_sid = account_sid.into();
        let auth_token = auth_token.into();
        if account_sid.is_empty() || auth_token.is_empty() {
            return Err(Error::Config("Twilio credentials not configured".into()));
        }
        Ok(Self {
            http: create_client()?,
            base_url: API_BASE.to_string(),
            account_sid,
            auth_token,
            from_number: from_number.into(),
        })
    }

    /// Override the API base URL (`https://api.twilio.com/2010-04-01`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn calls_url(&self) -> String {
        format!("{}/Accounts/{}/Calls.json", self.base_url, self.account_sid)
    }

    fn call_url(&self, call_id: &str) -> String {
        format!(
            "{}/Accounts/{}/Calls/{}.json",
            self.base_url, self.account_sid, call_id
        )
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<CallStatus> {
        let response = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()?;
        parse_call(&check_status(SERVICE, response)?.json::<Value>()?)
    }
}

impl VoiceProvider for TwilioProvider {
    fn name(&self) -> &'static str {
        "twilio"
    }

    fn initiate_call(&mut self, request: &CallRequest) -> Result<CallStatus> {
        let twiml = twiml(&request.content);
        let mut form = vec![
            ("To", request.to.as_str()),
            ("From", self.from_number.as_str()),
            ("Twiml", twiml.as_str()),
        ];
        if let Some(url) = &request.webhook_url {
            form.push(("StatusCallback", url.as_str()));
        }
        let status = self.post_form(&self.calls_url(), &form)?;
        log::info!("Twilio call {} to {} is {}", status.call_id, request.to, status.status);
        Ok(status)
    }

    fn get_status(&mut self, call_id: &str) -> Result<CallStatus> {
        let response = self
            .http
            .get(self.call_url(call_id))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()?;
        parse_call(&check_status(SERVICE, response)?.json::<Value>()?)
    }

    fn hangup(&mut self, call_id: &str) -> Result<CallStatus> {
        let mut status = self.post_form(&self.call_url(call_id), &[("Status", "completed")])?;
        status.status = "completed".to_string();
        Ok(status)
    }
}
