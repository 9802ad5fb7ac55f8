//! Blocking client for the OpenAI Images API.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::request::ImageRequest;
use crate::error::{Error, Result};
use crate::http::{check_status, create_client_with_timeout, IMAGE_TIMEOUT};

/// Generation endpoint.
pub const IMAGES_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const SERVICE: &str = "OpenAI Images";

/// Characters of the response body kept in error messages.
const ERROR_BODY_CHARS: usize = 400;

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Where the image bytes of a response live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    Base64(String),
    Url(String),
}

/// Parse a generation response body. Inline base64 wins over a URL.
pub fn parse_response(body: &str) -> Result<ImagePayload> {
    let parsed: ImagesResponse = serde_json::from_str(body)?;
    let datum = parsed.data.into_iter().next();
    match datum {
        Some(ImageDatum {
            b64_json: Some(b64),
            ..
        }) if !b64.is_empty() => Ok(ImagePayload::Base64(b64)),
        Some(ImageDatum { url: Some(url), .. }) if !url.is_empty() => Ok(ImagePayload::Url(url)),
        _ => Err(Error::UnexpectedResponse(format!(
            "No image data in response: {}",
            truncate_chars(body, ERROR_BODY_CHARS)
        ))),
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// OpenAI Images API client.
pub struct ImagesClient {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl ImagesClient {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(Error::Config(format!("{} is not set", API_KEY_ENV)));
        }
        Ok(Self {
            http: create_client_with_timeout(IMAGE_TIMEOUT)?,
            api_key,
            endpoint: IMAGES_ENDPOINT.to_string(),
        })
    }

    /// Create a client from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(std::env::var(API_KEY_ENV).unwrap_or_default())
    }

    /// Override the generation endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Generate one image and return its bytes.
    pub fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        log::debug!("requesting {} image ({})", request.model, request.size);
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()?;
        let body = check_status(SERVICE, response)?.text()?;

        match parse_response(&body)? {
            ImagePayload::Base64(b64) => Ok(BASE64.decode(b64.trim())?),
            ImagePayload::Url(url) => self.download(&url),
        }
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("downloading image from {}", url);
        let response = check_status(SERVICE, self.http.get(url).send()?)?;
        Ok(response.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::run_blocking;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ImageRequest {
        ImageRequest::new("dall-e-3", "a lighthouse", "", "", "", "", "")
    }

    #[test]
    fn test_parse_prefers_base64() {
        let body = r#"{"data":[{"b64_json":"aGk=","url":"https://x/y.png"}]}"#;
        assert_eq!(
            parse_response(body).unwrap(),
            ImagePayload::Base64("aGk=".into())
        );
    }

    #[test]
    fn test_parse_url_fallback() {
        let body = r#"{"data":[{"url":"https://x/y.png"}]}"#;
        assert_eq!(
            parse_response(body).unwrap(),
            ImagePayload::Url("https://x/y.png".into())
        );
    }

    #[test]
    fn test_parse_missing_data_truncates_body() {
        let body = format!(r#"{{"data":[],"note":"{}"}}"#, "x".repeat(1000));
        match parse_response(&body).unwrap_err() {
            Error::UnexpectedResponse(msg) => {
                assert!(msg.starts_with("No image data in response"));
                assert!(msg.len() < 500);
            }
            other => panic!("expected UnexpectedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(parse_response("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_empty_key_is_config_error() {
        let err = ImagesClient::new("  ").err().unwrap();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_generate_decodes_inline_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_string_contains(r#""prompt":"a lighthouse""#))
            .and(body_string_contains(r#""model":"dall-e-3""#))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"b64_json": BASE64.encode(b"png-bytes")}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = format!("{}/v1/images/generations", server.uri());
        let bytes = run_blocking(move || {
            ImagesClient::new("sk-test")?
                .with_endpoint(endpoint)
                .generate(&request())
        })
        .await
        .unwrap();

        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn test_generate_downloads_url() {
        let server = MockServer::start().await;
        let image_url = format!("{}/files/image.png", server.uri());
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"url": image_url}]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/image.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"remote-png".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = format!("{}/v1/images/generations", server.uri());
        let bytes = run_blocking(move || {
            ImagesClient::new("sk-test")?
                .with_endpoint(endpoint)
                .generate(&request())
        })
        .await
        .unwrap();

        assert_eq!(bytes, b"remote-png");
    }

    #[tokio::test]
    async fn test_generate_rejected_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_api_key"}"#),
            )
            .mount(&server)
            .await;

        let endpoint = format!("{}/v1/images/generations", server.uri());
        let err = run_blocking(move || {
            ImagesClient::new("sk-bad")?
                .with_endpoint(endpoint)
                .generate(&request())
        })
        .await
        .unwrap_err();

        match err {
            Error::Api { status, body, .. } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_api_key"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
