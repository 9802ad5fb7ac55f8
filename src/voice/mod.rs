//! Outbound voice calls.
//!
//! The provider is chosen once from [`VoiceConfig`]; everything after that
//! goes through the [`VoiceProvider`] trait.

pub mod config;
pub mod mock;
pub mod provider;
pub mod telnyx;
pub mod twilio;

pub use config::{ProviderKind, VoiceConfig};
pub use mock::MockProvider;
pub use provider::{CallContent, CallRequest, CallStatus, VoiceProvider, DEFAULT_FROM_NUMBER};
pub use telnyx::TelnyxProvider;
pub use twilio::TwilioProvider;

use crate::error::{Error, Result};

/// The configured provider.
pub enum Provider {
    Mock(MockProvider),
    Twilio(TwilioProvider),
    Telnyx(TelnyxProvider),
}

impl Provider {
    /// Build the provider named by `config`.
    ///
    /// Plivo and unknown names fall back to the mock provider with a warning.
    /// Missing credentials for a real provider are a configuration error.
    pub fn from_config(config: &VoiceConfig) -> Result<Self> {
        let from = config.from_number.clone();
        match &config.provider {
            ProviderKind::Mock => Ok(Provider::Mock(MockProvider::new(from))),
            ProviderKind::Twilio => {
                let (sid, token) = match (&config.twilio_account_sid, &config.twilio_auth_token) {
                    (Some(sid), Some(token)) => (sid, token),
                    _ => return Err(missing("Twilio", "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN")),
                };
                Ok(Provider::Twilio(TwilioProvider::new(sid.as_str(), token.as_str(), from)?))
            }
            ProviderKind::Telnyx => {
                let (key, conn) = match (&config.telnyx_api_key, &config.telnyx_connection_id) {
                    (Some(key), Some(conn)) => (key, conn),
                    _ => return Err(missing("Telnyx", "TELNYX_API_KEY and TELNYX_CONNECTION_ID")),
                };
                Ok(Provider::Telnyx(TelnyxProvider::new(key.as_str(), conn.as_str(), from)?))
            }
            ProviderKind::Plivo => {
                log::warn!("Plivo provider not yet implemented. Using mock.");
                Ok(Provider::Mock(MockProvider::new(from)))
            }
            ProviderKind::Unknown(name) => {
                log::warn!("Unknown provider: {}. Using mock.", name);
                Ok(Provider::Mock(MockProvider::new(from)))
            }
        }
    }

    /// Build the provider from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&VoiceConfig::from_env())
    }

    fn inner(&mut self) -> &mut dyn VoiceProvider {
        match self {
            Provider::Mock(p) => p,
            Provider::Twilio(p) => p,
            Provider::Telnyx(p) => p,
        }
    }
}

fn missing(provider: &str, vars: &str) -> Error {
    Error::Config(format!("{} credentials not configured (set {})", provider, vars))
}

impl VoiceProvider for Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::Mock(p) => p.name(),
            Provider::Twilio(p) => p.name(),
            Provider::Telnyx(p) => p.name(),
        }
    }

    fn initiate_call(&mut self, request: &CallRequest) -> Result<CallStatus> {
        self.inner().initiate_call(request)
    }

    fn get_status(&mut self, call_id: &str) -> Result<CallStatus> {
        self.inner().get_status(call_id)
    }

    fn hangup(&mut self, call_id: &str) -> Result<CallStatus> {
        self.inner().hangup(call_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mock() {
        let provider = Provider::from_config(&VoiceConfig::default()).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn test_plivo_and_unknown_fall_back_to_mock() {
        for kind in [ProviderKind::Plivo, ProviderKind::Unknown("vonage".into())] {
            let config = VoiceConfig::default().with_provider(kind);
            let provider = Provider::from_config(&config).unwrap();
            assert!(matches!(provider, Provider::Mock(_)));
        }
    }

    #[test]
    fn test_missing_credentials_are_config_errors() {
        for kind in [ProviderKind::Twilio, ProviderKind::Telnyx] {
            let config = VoiceConfig::default().with_provider(kind);
            let err = Provider::from_config(&config).err().unwrap();
            assert!(err.is_config(), "{}", err);
        }
    }

    #[test]
    fn test_twilio_selected_with_credentials() {
        let mut config = VoiceConfig::default().with_provider(ProviderKind::Twilio);
        config.twilio_account_sid = Some("AC1".into());
        config.twilio_auth_token = Some("tok".into());
        let provider = Provider::from_config(&config).unwrap();
        assert_eq!(provider.name(), "twilio");
    }

    #[test]
    fn test_dispatch_through_enum() {
        let mut provider = Provider::from_config(&VoiceConfig::default()).unwrap();
        let call = provider
            .initiate_call(&CallRequest::text("+15555550123", "hi"))
            .unwrap();
        assert_eq!(provider.get_status(&call.call_id).unwrap().status, "in-progress");
        assert_eq!(provider.hangup(&call.call_id).unwrap().status, "completed");
    }
}
