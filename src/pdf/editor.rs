//! Applies a [`ParsedEdit`] to the pages of a document.
//!
//! Pages are visited in ascending order, one at a time. Each page yields a
//! [`PageOutcome`]; a page without matches is reported, not treated as an
//! error. Nothing is rolled back: pages already edited stay edited.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::edit::{interpret, PageTarget, ParsedEdit};
use crate::error::{Error, Result};

use super::backend::{LopdfBackend, PdfBackend, TextBlock};

/// Number of text blocks listed for an unrecognized instruction.
pub const FALLBACK_BLOCK_LIMIT: usize = 10;

/// Characters shown per listed text block.
pub const FALLBACK_PREVIEW_CHARS: usize = 100;

/// What happened on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    /// `old` was found and substituted `occurrences` times.
    Replaced {
        page: u32,
        old: String,
        new: String,
        occurrences: usize,
        title_guess: bool,
    },
    /// `old` does not occur on the page; the page is unchanged.
    NoMatch {
        page: u32,
        old: String,
        title_guess: bool,
    },
    /// The edit kind cannot be applied yet; the page is unchanged.
    Unsupported { page: u32, reason: String },
    /// The instruction was not understood; the first blocks of the page are
    /// listed so a more specific instruction can be written.
    Listing {
        page: u32,
        total_blocks: usize,
        blocks: Vec<TextBlock>,
    },
}

impl PageOutcome {
    /// Zero-based page index.
    pub fn page(&self) -> u32 {
        match self {
            PageOutcome::Replaced { page, .. }
            | PageOutcome::NoMatch { page, .. }
            | PageOutcome::Unsupported { page, .. }
            | PageOutcome::Listing { page, .. } => *page,
        }
    }

    /// Whether the page content was modified.
    pub fn modified(&self) -> bool {
        matches!(self, PageOutcome::Replaced { .. })
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageOutcome::Replaced {
                page,
                old,
                new,
                occurrences,
                title_guess,
            } => {
                if *title_guess {
                    write!(
                        f,
                        "Title change (best effort): replaced '{}' with '{}' on page {} ({} occurrence(s))",
                        old, new, page, occurrences
                    )
                } else {
                    write!(
                        f,
                        "Replaced '{}' with '{}' on page {} ({} occurrence(s))",
                        old, new, page, occurrences
                    )
                }
            }
            PageOutcome::NoMatch {
                page,
                old,
                title_guess,
            } => {
                if *title_guess {
                    write!(
                        f,
                        "Title change requested but no '{}' text found on page {}",
                        old, page
                    )
                } else {
                    write!(f, "No occurrences of '{}' found on page {}", old, page)
                }
            }
            PageOutcome::Unsupported { page, reason } => {
                write!(f, "Page {}: {}", page, reason)
            }
            PageOutcome::Listing {
                page,
                total_blocks,
                blocks,
            } => {
                write!(f, "Found {} text blocks on page {}", total_blocks, page)?;
                for block in blocks {
                    let preview = block.preview(FALLBACK_PREVIEW_CHARS);
                    let ellipsis = if preview.len() < block.text.len() {
                        "..."
                    } else {
                        ""
                    };
                    write!(f, "\n  {}: {}{}", block.index, preview, ellipsis)?;
                }
                Ok(())
            }
        }
    }
}

/// Result of editing a document.
#[derive(Debug, Clone, Serialize)]
pub struct EditReport {
    pub edit: ParsedEdit,
    pub pages: Vec<PageOutcome>,
    /// Where the document was written.
    pub output: PathBuf,
}

impl EditReport {
    /// Total occurrences replaced across all pages.
    pub fn total_replacements(&self) -> usize {
        self.pages
            .iter()
            .map(|p| match p {
                PageOutcome::Replaced { occurrences, .. } => *occurrences,
                _ => 0,
            })
            .sum()
    }
}

/// Apply `edit` to one page of `backend`.
pub fn apply_to_page<B: PdfBackend>(
    backend: &mut B,
    page: u32,
    edit: &ParsedEdit,
) -> Result<PageOutcome> {
    match edit {
        ParsedEdit::Replace { old, new } => replace_on_page(backend, page, old, new, false),
        ParsedEdit::Change {
            old,
            new,
            title_guess,
        } => replace_on_page(backend, page, old, new, *title_guess),
        ParsedEdit::UpdateDate { new } => Ok(PageOutcome::Unsupported {
            page,
            reason: format!(
                "date update to '{}' requested, but locating the current date on the page is not yet supported",
                new
            ),
        }),
        ParsedEdit::Unrecognized => {
            let mut blocks = backend.text_blocks(page)?;
            let total_blocks = blocks.len();
            blocks.truncate(FALLBACK_BLOCK_LIMIT);
            Ok(PageOutcome::Listing {
                page,
                total_blocks,
                blocks,
            })
        }
    }
}

fn replace_on_page<B: PdfBackend>(
    backend: &mut B,
    page: u32,
    old: &str,
    new: &str,
    title_guess: bool,
) -> Result<PageOutcome> {
    let occurrences = match backend.replace_text(page, old, new) {
        Ok(n) => n,
        Err(Error::Unencodable { font, .. }) => {
            return Ok(PageOutcome::Unsupported {
                page,
                reason: format!(
                    "replacement '{}' cannot be encoded in font {}; page left unchanged",
                    new, font
                ),
            })
        }
        Err(e) => return Err(e),
    };
    if occurrences == 0 {
        return Ok(PageOutcome::NoMatch {
            page,
            old: old.to_string(),
            title_guess,
        });
    }
    Ok(PageOutcome::Replaced {
        page,
        old: old.to_string(),
        new: new.to_string(),
        occurrences,
        title_guess,
    })
}

/// Apply `edit` to every page of `target`, in ascending order.
///
/// The target is validated against the page count before any page is
/// touched.
pub fn apply_edit<B: PdfBackend>(
    backend: &mut B,
    target: PageTarget,
    edit: &ParsedEdit,
) -> Result<Vec<PageOutcome>> {
    let pages = target.resolve(backend.page_count())?;
    let mut outcomes = Vec::with_capacity(pages.len());
    for page in pages {
        let outcome = apply_to_page(backend, page, edit)?;
        log::debug!("page {}: {:?}", page, outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Options for [`edit_file`].
#[derive(Debug, Clone)]
pub struct EditOptions {
    /// Pages to edit.
    pub target: PageTarget,
    /// Output path; `None` overwrites the input.
    pub output: Option<PathBuf>,
}

impl EditOptions {
    /// Create options for a page target, overwriting the input.
    pub fn new(target: PageTarget) -> Self {
        Self {
            target,
            output: None,
        }
    }

    /// Write the result to `path` instead of overwriting the input.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }
}

impl Default for EditOptions {
    fn default() -> Self {
        Self::new(PageTarget::All)
    }
}

/// Interpret `instruction` and apply it to the PDF at `input`.
///
/// # Example
///
/// ```no_run
/// use pi_skills::edit::PageTarget;
/// use pi_skills::pdf::{edit_file, EditOptions};
///
/// let report = edit_file(
///     "report.pdf",
///     "replace 'Q2' with 'Q3'",
///     &EditOptions::new(PageTarget::All).with_output("report-q3.pdf"),
/// )?;
/// for page in &report.pages {
///     println!("{}", page);
/// }
/// # Ok::<(), pi_skills::Error>(())
/// ```
pub fn edit_file<P: AsRef<Path>>(
    input: P,
    instruction: &str,
    options: &EditOptions,
) -> Result<EditReport> {
    let input = input.as_ref();
    let edit = interpret(instruction);
    log::info!("instruction interpreted as {}", edit.kind());

    let mut backend = LopdfBackend::load_file(input)?;
    let pages = apply_edit(&mut backend, options.target, &edit)?;

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| input.to_path_buf());
    backend.save(&output)?;

    Ok(EditReport {
        edit,
        pages,
        output,
    })
}
