//! Whole-document operations: info, page listing, merge, split and extract.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use serde::Serialize;

use crate::error::{Error, Result};

use super::backend::{LopdfBackend, PdfBackend};
use super::pages::PageRanges;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Maximum characters shown for a page's first line.
const FIRST_LINE_MAX_CHARS: usize = 80;

/// Document information.
#[derive(Debug, Clone, Serialize)]
pub struct PdfInfo {
    pub path: PathBuf,
    pub version: String,
    pub page_count: u32,
    /// Non-empty `Info` dictionary entries (Title, Author, ...).
    pub metadata: BTreeMap<String, String>,
}

/// Short description of one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    /// Zero-based page index.
    pub index: u32,
    pub first_line: Option<String>,
}

/// Outcome of a merge.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    pub added: Vec<PathBuf>,
    /// Inputs that did not exist.
    pub skipped: Vec<PathBuf>,
    pub page_count: u32,
}

/// Read document information.
pub fn info<P: AsRef<Path>>(path: P) -> Result<PdfInfo> {
    let path = path.as_ref();
    let backend = LopdfBackend::load_file(path)?;
    Ok(PdfInfo {
        path: path.to_path_buf(),
        version: backend.version().to_string(),
        page_count: backend.page_count(),
        metadata: backend.metadata(),
    })
}

/// List every page with its first line of text.
pub fn list_pages<P: AsRef<Path>>(path: P) -> Result<Vec<PageSummary>> {
    let backend = LopdfBackend::load_file(path)?;
    let summaries = (0..backend.page_count())
        .map(|index| {
            let first_line = match backend.page_text(index) {
                Ok(text) => text
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .map(|l| l.chars().take(FIRST_LINE_MAX_CHARS).collect()),
                Err(e) => {
                    log::debug!("could not extract text from page {}: {}", index, e);
                    None
                }
            };
            PageSummary { index, first_line }
        })
        .collect();
    Ok(summaries)
}

/// Merge PDFs in order into `output`.
///
/// Inputs that do not exist are skipped with a warning. Fails when no input
/// could be loaded.
pub fn merge<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Result<MergeReport> {
    let mut report = MergeReport::default();
    let mut documents = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if !input.exists() {
            log::warn!("File not found, skipping: {}", input.display());
            report.skipped.push(input.to_path_buf());
            continue;
        }
        documents.push(LopdfBackend::load_file(input)?.into_inner());
        report.added.push(input.to_path_buf());
    }

    if documents.is_empty() {
        return Err(Error::Pdf("no input documents to merge".to_string()));
    }

    let mut merged = merge_documents(documents)?;
    report.page_count = merged.get_pages().len() as u32;
    merged.save(output)?;
    log::info!(
        "merged {} file(s), {} page(s) into {}",
        report.added.len(),
        report.page_count,
        output.display()
    );
    Ok(report)
}

/// Split a PDF into one file per page (`page_001.pdf`, ...).
pub fn split<P: AsRef<Path>>(input: P, out_dir: &Path) -> Result<Vec<PathBuf>> {
    split_with_progress(input, out_dir, |_, _| {})
}

/// Split a PDF, calling `on_page(done, total)` after each written page.
pub fn split_with_progress<P, F>(input: P, out_dir: &Path, mut on_page: F) -> Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    F: FnMut(u32, u32),
{
    let doc = LopdfBackend::load_file(input)?.into_inner();
    let total = doc.get_pages().len() as u32;
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(total as usize);
    for page in 1..=total {
        let mut single = keep_pages(&doc, &[page]);
        let path = out_dir.join(format!("page_{:03}.pdf", page));
        single.save(&path)?;
        written.push(path);
        on_page(page, total);
    }
    Ok(written)
}

/// Copy the selected one-based pages into `output`.
///
/// Pages beyond the end of the document are skipped. Returns the pages
/// written, in document order.
pub fn extract<P: AsRef<Path>>(input: P, ranges: &PageRanges, output: &Path) -> Result<Vec<u32>> {
    let input = input.as_ref();
    let doc = LopdfBackend::load_file(input)?.into_inner();
    let total = doc.get_pages().len() as u32;
    let selected = ranges.within(total);
    if selected.is_empty() {
        return Err(Error::InvalidPageRange(format!(
            "no selected page exists in {} ({} pages)",
            input.display(),
            total
        )));
    }

    let mut extracted = keep_pages(&doc, &selected);
    extracted.save(output)?;
    Ok(selected)
}

/// Clone `doc` keeping only the given one-based pages.
fn keep_pages(doc: &LopdfDocument, keep: &[u32]) -> LopdfDocument {
    let mut copy = doc.clone();
    let drop: Vec<u32> = copy
        .get_pages()
        .keys()
        .copied()
        .filter(|n| !keep.contains(n))
        .collect();
    copy.delete_pages(&drop);
    copy.prune_objects();
    copy.compress();
    copy
}

/// Page dictionary with inherited attributes copied in from its ancestors.
fn flattened_page(doc: &LopdfDocument, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc.get_dictionary(page_id)?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        depth += 1;
        if depth > 64 {
            return Err(Error::Pdf("page tree too deep".to_string()));
        }
        let node = doc.get_dictionary(parent_id)?;
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}

/// Concatenate the pages of `documents` into one document.
fn merge_documents(documents: Vec<LopdfDocument>) -> Result<LopdfDocument> {
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;
        for page_id in doc.get_pages().into_values() {
            pages.push((page_id, flattened_page(&doc, page_id)?));
        }
        objects.extend(doc.objects);
    }

    let mut merged = LopdfDocument::with_version("1.5");
    let mut catalog: Option<(ObjectId, Dictionary)> = None;
    let mut page_tree: Option<(ObjectId, Dictionary)> = None;

    for (id, object) in objects {
        let kind = object.type_name().unwrap_or_default().to_string();
        match kind.as_str() {
            "Catalog" => {
                if catalog.is_none() {
                    catalog = Some((id, object.as_dict()?.clone()));
                }
            }
            "Pages" => {
                if page_tree.is_none() {
                    page_tree = Some((id, object.as_dict()?.clone()));
                }
            }
            "Page" | "Outlines" | "Outline" => {}
            _ => {
                merged.objects.insert(id, object);
            }
        }
    }

    let (catalog_id, mut catalog) =
        catalog.ok_or_else(|| Error::Pdf("document catalog not found".to_string()))?;
    let (tree_id, mut tree) =
        page_tree.ok_or_else(|| Error::Pdf("page tree not found".to_string()))?;

    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    for (id, mut page) in pages {
        page.set("Parent", tree_id);
        merged.objects.insert(id, Object::Dictionary(page));
    }

    tree.remove(b"Parent");
    tree.set("Count", kids.len() as i64);
    tree.set("Kids", kids);
    merged.objects.insert(tree_id, Object::Dictionary(tree));

    catalog.set("Pages", tree_id);
    catalog.remove(b"Outlines");
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));

    merged.trailer.set("Root", catalog_id);
    merged.max_id = merged.objects.keys().map(|(n, _)| *n).max().unwrap_or(0);
    merged.renumber_objects();
    merged.compress();
    Ok(merged)
}
