//! Plain-text email over implicit-TLS SMTP.

use lettre::message::{header::ContentType, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};

use crate::error::{Error, Result};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_SENDER_NAME: &str = "PopeBot Agent";

pub const USER_ENV: &str = "POPEBOT_EMAIL_USER";
pub const PASS_ENV: &str = "POPEBOT_EMAIL_PASS";

/// SMTP account and server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub sender_name: String,
}

impl EmailConfig {
    /// Config for the default server. Fails when either credential is empty.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let user = user.into();
        let password = password.into();
        if user.trim().is_empty() || password.trim().is_empty() {
            return Err(Error::Config(format!(
                "SMTP credentials not configured. Set {} and {}. For Gmail, use an App Password.",
                USER_ENV, PASS_ENV
            )));
        }
        Ok(Self {
            user,
            password,
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            sender_name: DEFAULT_SENDER_NAME.to_string(),
        })
    }

    /// Credentials from `POPEBOT_EMAIL_USER` and `POPEBOT_EMAIL_PASS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(
            lookup(USER_ENV).unwrap_or_default(),
            lookup(PASS_ENV).unwrap_or_default(),
        )
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }

    /// `From` mailbox: sender name plus account address.
    pub fn sender(&self) -> Result<Mailbox> {
        Ok(Mailbox::new(Some(self.sender_name.clone()), self.user.parse()?))
    }
}

/// Build the message without sending it.
pub fn build_message(config: &EmailConfig, to: &str, subject: &str, body: &str) -> Result<Message> {
    let to: Mailbox = to.parse()?;
    Ok(Message::builder()
        .from(config.sender()?)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?)
}

/// Send a plain-text message.
pub fn send_email(config: &EmailConfig, to: &str, subject: &str, body: &str) -> Result<()> {
    let message = build_message(config, to, subject, body)?;
    let mailer = SmtpTransport::relay(&config.host)?
        .port(config.port)
        .credentials(Credentials::new(config.user.clone(), config.password.clone()))
        .build();

    log::debug!("sending email to {} via {}:{}", to, config.host, config.port);
    mailer.send(&message)?;
    log::info!("email sent to {}", to);
    Ok(())
}
