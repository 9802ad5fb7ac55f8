//! In-process provider that simulates calls without placing them.

use std::collections::HashMap;

use super::provider::{CallRequest, CallStatus, VoiceProvider};
use crate::error::{Error, Result};

/// Duration reported once a mock call completes.
pub const MOCK_DURATION_SECS: u32 = 30;

#[derive(Debug, Clone)]
struct MockCall {
    to: String,
    status: &'static str,
    duration: Option<u32>,
}

impl MockCall {
    fn snapshot(&self, call_id: &str) -> CallStatus {
        CallStatus {
            call_id: call_id.to_string(),
            status: self.status.to_string(),
            to: Some(self.to.clone()),
            duration: self.duration,
        }
    }
}

/// Mock provider. Calls live only as long as the provider value.
#[derive(Debug, Default)]
pub struct MockProvider {
    from_number: String,
    calls: HashMap<String, MockCall>,
}

impl MockProvider {
    pub fn new(from_number: impl Into<String>) -> Self {
        Self {
            from_number: from_number.into(),
            calls: HashMap::new(),
        }
    }

    pub fn from_number(&self) -> &str {
        &self.from_number
    }

    /// `MOCK_<timestamp>`, with a `_<n>` suffix for later calls in the same second.
    fn next_call_id(&self) -> String {
        let base = format!("MOCK_{}", chrono::Local::now().format("%Y%m%d%H%M%S"));
        if !self.calls.contains_key(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let id = format!("{}_{}", base, n);
            if !self.calls.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    fn call_mut(&mut self, call_id: &str) -> Result<&mut MockCall> {
        self.calls
            .get_mut(call_id)
            .ok_or_else(|| Error::CallNotFound(call_id.to_string()))
    }
}

impl VoiceProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn initiate_call(&mut self, request: &CallRequest) -> Result<CallStatus> {
        let call_id = self.next_call_id();
        log::info!(
            "[mock] call {} to {} from {}: {}",
            call_id,
            request.to,
            self.from_number,
            request.content.body()
        );
        let call = MockCall {
            to: request.to.clone(),
            status: "queued",
            duration: None,
        };
        let status = call.snapshot(&call_id);
        self.calls.insert(call_id, call);
        Ok(status)
    }

    /// Each query advances the call one step toward `completed`.
    fn get_status(&mut self, call_id: &str) -> Result<CallStatus> {
        let call = self.call_mut(call_id)?;
        match call.status {
            "queued" => call.status = "in-progress",
            "in-progress" => {
                call.status = "completed";
                call.duration = Some(MOCK_DURATION_SECS);
            }
            _ => {}
        }
        Ok(call.snapshot(call_id))
    }

    fn hangup(&mut self, call_id: &str) -> Result<CallStatus> {
        let call = self.call_mut(call_id)?;
        call.status = "completed";
        log::info!("[mock] call {} ended", call_id);
        Ok(call.snapshot(call_id))
    }
}
