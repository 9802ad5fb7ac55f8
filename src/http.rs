//! Blocking HTTP client factory shared by the REST-backed skills.

use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::error::{Error, Result};

/// User-Agent string for all HTTP requests.
pub const USER_AGENT: &str = concat!("pi-skills/", env!("CARGO_PKG_VERSION"));

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for image generation, which can take minutes.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(300);

/// Creates a blocking HTTP client with default configuration.
pub fn create_client() -> Result<Client> {
    create_client_with_timeout(DEFAULT_TIMEOUT)
}

/// Creates a blocking HTTP client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Turn a non-success response into [`Error::Api`], passing others through.
pub fn check_status(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    Err(Error::Api {
        service,
        status: status.as_u16(),
        body,
    })
}

/// Blocking clients must be built, used and dropped off the async runtime
/// that drives the mock server.
#[cfg(test)]
pub(crate) async fn run_blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_create_client_succeeds() {
        assert!(create_client().is_ok());
        assert!(create_client_with_timeout(IMAGE_TIMEOUT).is_ok());
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("pi-skills/"));
    }

    #[tokio::test]
    async fn test_check_status_maps_failure_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
            .mount(&server)
            .await;

        let url = format!("{}/missing", server.uri());
        let err = run_blocking(move || {
            let response = create_client()?.get(url).send()?;
            check_status("Test", response).map(|_| ())
        })
        .await
        .unwrap_err();

        match err {
            Error::Api {
                service,
                status,
                body,
            } => {
                assert_eq!(service, "Test");
                assert_eq!(status, 404);
                assert_eq!(body, "no such thing");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
