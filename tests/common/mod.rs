//! Shared helpers: small PDFs built in memory with lopdf.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

/// Build a document with one text block per line, top to bottom.
pub fn build_pdf(pages: &[&[&str]], title: Option<&str>) -> Document {
    let contents = pages
        .iter()
        .map(|lines| {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                let y = 700 - 30 * i as i64;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 24.into()]));
                operations.push(Operation::new("Td", vec![100.into(), y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            operations
        })
        .collect();
    build_pdf_with_operations(contents, title)
}

/// Build a document from raw content operations, one list per page. Font
/// `F1` is WinAnsi Helvetica.
pub fn build_pdf_with_operations(pages: Vec<Vec<Operation>>, title: Option<&str>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal(""),
        });
        doc.trailer.set("Info", info_id);
    }
    doc
}

/// Write a document built by [`build_pdf`] into `dir`.
pub fn write_pdf(dir: &Path, name: &str, pages: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    build_pdf(pages, None).save(&path).unwrap();
    path
}

/// A temp dir holding a three-page sample document.
pub fn sample() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = write_pdf(
        dir.path(),
        "sample.pdf",
        &[
            &["Project Title", "Status: Draft"],
            &["Budget Draft", "Total: 100"],
            &["Appendix"],
        ],
    );
    (dir, path)
}
