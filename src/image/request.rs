//! Images API request bodies and per-model defaults.

use serde::Serialize;

/// Default model id.
pub const DEFAULT_MODEL: &str = "dall-e-3";

/// Default image size for every model.
pub const DEFAULT_SIZE: &str = "1024x1024";

/// Model family, which decides defaults and accepted parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    DallE2,
    DallE3,
    /// `gpt-image-*` and any other model id.
    Gpt,
}

impl ModelFamily {
    /// Family of a model id.
    pub fn of(model: &str) -> Self {
        match model {
            "dall-e-2" => ModelFamily::DallE2,
            "dall-e-3" => ModelFamily::DallE3,
            _ => ModelFamily::Gpt,
        }
    }

    /// Default quality for the family.
    pub fn default_quality(&self) -> &'static str {
        match self {
            ModelFamily::DallE2 | ModelFamily::DallE3 => "standard",
            ModelFamily::Gpt => "high",
        }
    }
}

/// Whether a model id accepts `background` and `output_format`.
pub fn is_gpt_image(model: &str) -> bool {
    model.starts_with("gpt-image")
}

/// JSON body of `POST /v1/images/generations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl ImageRequest {
    /// Build a single-image request, dropping parameters the model does not
    /// accept. Empty strings count as unset; size and quality fall back to
    /// the model defaults.
    pub fn new(
        model: &str,
        prompt: &str,
        size: &str,
        quality: &str,
        background: &str,
        output_format: &str,
        style: &str,
    ) -> Self {
        let family = ModelFamily::of(model);
        let gpt_image = is_gpt_image(model);
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        let quality = if quality.is_empty() {
            family.default_quality()
        } else {
            quality
        };

        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            size: if size.is_empty() { DEFAULT_SIZE } else { size }.to_string(),
            n: 1,
            quality: (family != ModelFamily::DallE2).then(|| quality.to_string()),
            background: non_empty(background).filter(|_| gpt_image),
            output_format: non_empty(output_format).filter(|_| gpt_image),
            style: non_empty(style).filter(|_| family == ModelFamily::DallE3),
        }
    }

    /// File extension of the generated image.
    pub fn file_extension(&self) -> &str {
        self.output_format.as_deref().unwrap_or("png")
    }
}
