//! Image generation through the OpenAI Images API.
//!
//! Each run writes the images, a `prompts.json` manifest and an `index.html`
//! gallery into one output directory.
//!
//! ```no_run
//! use pi_skills::image::{generate, ImageOptions, ImagesClient};
//!
//! let client = ImagesClient::from_env()?;
//! let options = ImageOptions::new("a lighthouse at dusk").with_count(2);
//! let run = generate(&client, &options, |_, _| {})?;
//! println!("Gallery: {}", run.gallery.display());
//! # Ok::<(), pi_skills::Error>(())
//! ```

pub mod client;
pub mod gallery;
pub mod request;

use std::fs;
use std::path::{Path, PathBuf};

pub use client::{ImagesClient, API_KEY_ENV, IMAGES_ENDPOINT};
pub use gallery::{image_filename, slugify, GalleryItem};
pub use request::{ImageRequest, ModelFamily, DEFAULT_MODEL, DEFAULT_SIZE};

use crate::error::Result;

/// Anything that can turn a request into image bytes.
pub trait ImageSource {
    fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>>;
}

impl ImageSource for ImagesClient {
    fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        ImagesClient::generate(self, request)
    }
}

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct ImageOptions {
    pub prompt: String,
    pub count: usize,
    pub model: String,
    /// Empty means the model default.
    pub size: String,
    /// Empty means the model default.
    pub quality: String,
    pub background: String,
    pub output_format: String,
    pub style: String,
    /// `None` means [`default_out_dir`].
    pub out_dir: Option<PathBuf>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            count: 1,
            model: DEFAULT_MODEL.to_string(),
            size: String::new(),
            quality: String::new(),
            background: String::new(),
            output_format: String::new(),
            style: String::new(),
            out_dir: None,
        }
    }
}

impl ImageOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Request body sent for every image of the run.
    pub fn request(&self) -> ImageRequest {
        ImageRequest::new(
            &self.model,
            &self.prompt,
            &self.size,
            &self.quality,
            &self.background,
            &self.output_format,
            &self.style,
        )
    }
}

/// Files written by a run.
#[derive(Debug, Clone)]
pub struct ImageRun {
    pub out_dir: PathBuf,
    pub items: Vec<GalleryItem>,
    pub prompts: PathBuf,
    pub gallery: PathBuf,
}

/// `~/Projects/tmp` when it exists, else `./tmp`, plus a timestamped
/// `image-gen-*` directory.
pub fn default_out_dir() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let base = dirs::home_dir()
        .map(|home| home.join("Projects").join("tmp"))
        .filter(|p| p.is_dir())
        .unwrap_or_else(|| PathBuf::from("./tmp"));
    base.join(format!("image-gen-{}", stamp))
}

/// Generate `options.count` images one request at a time.
///
/// `on_progress(done, total)` is called before each request and once at the
/// end. The manifest and gallery are written after the last image; the first
/// failure aborts the run.
pub fn generate<S, F>(source: &S, options: &ImageOptions, mut on_progress: F) -> Result<ImageRun>
where
    S: ImageSource + ?Sized,
    F: FnMut(usize, usize),
{
    let out_dir = options.out_dir.clone().unwrap_or_else(default_out_dir);
    fs::create_dir_all(&out_dir)?;

    if options.model == "dall-e-3" && options.count > 1 {
        log::warn!(
            "DALL-E 3 only supports 1 image per request. Generating {} sequential requests.",
            options.count
        );
    }

    let request = options.request();
    let ext = request.file_extension().to_string();
    let mut items = Vec::with_capacity(options.count);

    for i in 0..options.count {
        on_progress(i, options.count);
        let bytes = source.generate(&request)?;
        let file = image_filename(i + 1, &options.prompt, &ext);
        fs::write(out_dir.join(&file), bytes)?;
        log::info!("wrote {}", file);
        items.push(GalleryItem {
            prompt: options.prompt.clone(),
            file,
        });
    }
    on_progress(options.count, options.count);

    finish_run(&out_dir, items)
}

fn finish_run(out_dir: &Path, items: Vec<GalleryItem>) -> Result<ImageRun> {
    let prompts = gallery::write_prompts(out_dir, &items)?;
    let gallery = gallery::write_gallery(out_dir, &items)?;
    Ok(ImageRun {
        out_dir: out_dir.to_path_buf(),
        items,
        prompts,
        gallery,
    })
}
