//! Voice provider configuration from the environment.

use std::fmt;

use super::provider::DEFAULT_FROM_NUMBER;

/// Provider names understood by `VOICE_PROVIDER`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Mock,
    Twilio,
    Telnyx,
    /// Recognised but not implemented; served by the mock provider.
    Plivo,
    Unknown(String),
}

impl ProviderKind {
    /// Case-insensitive parse. Never fails; unknown names are kept.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "mock" => ProviderKind::Mock,
            "twilio" => ProviderKind::Twilio,
            "telnyx" => ProviderKind::Telnyx,
            "plivo" => ProviderKind::Plivo,
            other => ProviderKind::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Mock => f.write_str("mock"),
            ProviderKind::Twilio => f.write_str("twilio"),
            ProviderKind::Telnyx => f.write_str("telnyx"),
            ProviderKind::Plivo => f.write_str("plivo"),
            ProviderKind::Unknown(name) => f.write_str(name),
        }
    }
}

/// Everything needed to construct a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceConfig {
    pub provider: ProviderKind,
    pub from_number: String,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub telnyx_api_key: Option<String>,
    pub telnyx_connection_id: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Mock,
            from_number: DEFAULT_FROM_NUMBER.to_string(),
            twilio_account_sid: None,
            twilio_auth_token: None,
            telnyx_api_key: None,
            telnyx_connection_id: None,
        }
    }
}

impl VoiceConfig {
    /// Read `VOICE_PROVIDER`, `VOICE_FROM_NUMBER` and provider credentials.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`VoiceConfig::from_env`] with a custom variable source.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            provider: ProviderKind::parse(&get("VOICE_PROVIDER").unwrap_or_default()),
            from_number: get("VOICE_FROM_NUMBER").unwrap_or_else(|| DEFAULT_FROM_NUMBER.to_string()),
            twilio_account_sid: get("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: get("TWILIO_AUTH_TOKEN"),
            telnyx_api_key: get("TELNYX_API_KEY"),
            telnyx_connection_id: get("TELNYX_CONNECTION_ID"),
        }
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_from_number(mut self, number: impl Into<String>) -> Self {
        self.from_number = number.into();
        self
    }
}
