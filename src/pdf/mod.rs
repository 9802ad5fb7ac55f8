//! PDF skills: natural-language page edits and page manipulation.

pub mod backend;
pub mod detect;
pub mod editor;
pub mod external;
pub mod ops;
pub mod pages;

pub use backend::{LopdfBackend, PdfBackend, TextBlock};
pub use detect::{is_pdf, pdf_version_from_bytes, pdf_version_from_path};
pub use editor::{apply_edit, apply_to_page, edit_file, EditOptions, EditReport, PageOutcome};
pub use external::NanoPdf;
pub use ops::{
    extract, info, list_pages, merge, split, split_with_progress, MergeReport, PageSummary,
    PdfInfo,
};
pub use pages::PageRanges;
