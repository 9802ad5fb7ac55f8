//! # pi-skills
//!
//! Agent skills as a Rust library: natural-language PDF edits, PDF page
//! manipulation, image generation, outbound voice calls and email.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pi_skills::edit_pdf;
//!
//! fn main() -> pi_skills::Result<()> {
//!     // Replace text on every page, writing a new file
//!     let report = edit_pdf(
//!         "proposal.pdf",
//!         "replace 'Draft' with 'Final'",
//!         "all",
//!         Some("proposal-final.pdf".as_ref()),
//!     )?;
//!     for page in &report.pages {
//!         println!("{}", page);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Instruction interpreter**: replace / change / title / date phrasing
//! - **PDF editing**: text replacement inside page content streams
//! - **PDF operations**: info, page listing, merge, split, extract
//! - **Image generation**: OpenAI Images API with a local HTML gallery
//! - **Voice calls**: mock, Twilio and Telnyx providers
//! - **Email**: plain-text messages over SMTP

pub mod edit;
pub mod email;
pub mod error;
pub mod http;
pub mod image;
pub mod pdf;
pub mod voice;

// Re-export commonly used types
pub use edit::{interpret, EditKind, InstructionInterpreter, PageTarget, ParsedEdit};
pub use email::{send_email, EmailConfig};
pub use error::{Error, Result};
pub use image::{ImageOptions, ImageRun, ImagesClient};
pub use pdf::{
    edit_file, EditOptions, EditReport, LopdfBackend, PageOutcome, PageRanges, PdfBackend,
    TextBlock,
};
pub use voice::{CallRequest, CallStatus, Provider, VoiceConfig, VoiceProvider};

use std::path::Path;

/// Apply a natural-language edit to a PDF.
///
/// `page` is a zero-based page index or `all`. It is validated against the
/// document before any page is touched. Without `output` the input file is
/// overwritten.
pub fn edit_pdf<P: AsRef<Path>>(
    input: P,
    instruction: &str,
    page: &str,
    output: Option<&Path>,
) -> Result<EditReport> {
    let mut options = EditOptions::new(PageTarget::parse(page)?);
    if let Some(path) = output {
        options = options.with_output(path);
    }
    edit_file(input, instruction, &options)
}

/// Generate images with the API key from `OPENAI_API_KEY`.
pub fn generate_images(options: &ImageOptions) -> Result<ImageRun> {
    let client = ImagesClient::from_env()?;
    image::generate(&client, options, |done, total| {
        if done < total {
            log::info!("Generating image {}/{}...", done + 1, total);
        }
    })
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_pdf_rejects_bad_page_before_io() {
        let err = edit_pdf("/nonexistent.pdf", "replace 'a' with 'b'", "first", None).unwrap_err();
        assert!(matches!(err, Error::InvalidPageSpec(_)));
    }

    #[test]
    fn test_edit_pdf_missing_file() {
        let err = edit_pdf("/nonexistent.pdf", "replace 'a' with 'b'", "0", None).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_reexported_interpreter() {
        assert_eq!(interpret("replace 'a' with 'b'").kind(), EditKind::Replace);
        assert_eq!(interpret("make it pop").kind(), EditKind::Unrecognized);
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
