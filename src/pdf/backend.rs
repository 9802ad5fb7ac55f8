//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the page operations the skills need
//! (text blocks, text search and replacement, saving), isolating the concrete
//! PDF library (lopdf) from the edit logic.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use serde::Serialize;

use crate::error::{Error, Result};

use super::detect::pdf_version_from_path;

/// TJ adjustment (thousandths of text space) treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A positioned span of text on one page.
///
/// One block corresponds to one `BT ... ET` text object of the page content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    /// Sequence index of the block on its page.
    pub index: usize,
    /// Origin x in PDF user space.
    pub x: f32,
    /// Origin y in PDF user space.
    pub y: f32,
    /// Extracted text.
    pub text: String,
}

impl TextBlock {
    /// Block text truncated to `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self.text[..byte_idx],
            None => &self.text,
        }
    }
}

/// Abstract interface for page-level PDF access.
///
/// Pages are addressed by zero-based index.
pub trait PdfBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Text blocks of a page, in content-stream order.
    fn text_blocks(&self, page: u32) -> Result<Vec<TextBlock>>;

    /// Replace every occurrence of `old` with `new` on a page.
    ///
    /// The page text is searched block by block, as [`text_blocks`] reports
    /// it, so an occurrence may span several text-showing operators. Returns
    /// the number of occurrences replaced. Matching is exact and
    /// case-sensitive. Fails with [`Error::Unencodable`], leaving the page
    /// unchanged, when `new` cannot be written in the font in use.
    ///
    /// [`text_blocks`]: PdfBackend::text_blocks
    fn replace_text(&mut self, page: u32, old: &str, new: &str) -> Result<usize>;

    /// Write the document to `path`.
    fn save(&mut self, path: &Path) -> Result<()>;

    /// Plain text of a page, one block per line.
    fn page_text(&self, page: u32) -> Result<String> {
        let blocks = self.text_blocks(page)?;
        Ok(blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Inverse of the Latin-1 branch of [`decode_text_simple`].
///
/// Characters outside Latin-1 become `?`.
pub fn encode_text_simple(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        pdf_version_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        Self { doc }
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Consume the backend and return the document.
    pub fn into_inner(self) -> LopdfDocument {
        self.doc
    }

    /// PDF version string.
    pub fn version(&self) -> &str {
        &self.doc.version
    }

    /// Non-empty entries of the document `Info` dictionary, in key order.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        let info = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => self.doc.get_dictionary(*id).ok(),
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        };

        if let Some(info) = info {
            for (key, value) in info.iter() {
                let value = match value {
                    Object::String(bytes, _) => decode_text_simple(bytes),
                    Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
                    Object::Integer(i) => i.to_string(),
                    Object::Real(r) => r.to_string(),
                    Object::Boolean(b) => b.to_string(),
                    _ => continue,
                };
                if !value.trim().is_empty() {
                    out.insert(String::from_utf8_lossy(key).into_owned(), value);
                }
            }
        }
        out
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        let pages = self.doc.get_pages();
        pages
            .get(&(page + 1))
            .copied()
            .ok_or(Error::PageOutOfRange(page, pages.len() as u32))
    }

    fn page_operations(&self, page_id: ObjectId) -> Result<Vec<Operation>> {
        let data = self.doc.get_page_content(page_id)?;
        Ok(Content::decode(&data)?.operations)
    }

    fn page_fonts(&self, page_id: ObjectId) -> Result<BTreeMap<Vec<u8>, &Dictionary>> {
        Ok(self.doc.get_page_fonts(page_id)?)
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    fn text_blocks(&self, page: u32) -> Result<Vec<TextBlock>> {
        let page_id = self.page_id(page)?;
        let fonts = self.page_fonts(page_id)?;
        let codec = FontCodec {
            doc: &self.doc,
            fonts: &fonts,
        };
        let operations = self.page_operations(page_id)?;
        Ok(collect_text_blocks(&operations, &codec))
    }

    fn replace_text(&mut self, page: u32, old: &str, new: &str) -> Result<usize> {
        if old.is_empty() {
            return Ok(0);
        }

        let page_id = self.page_id(page)?;
        let (count, encoded) = {
            let fonts = self.page_fonts(page_id)?;
            let codec = FontCodec {
                doc: &self.doc,
                fonts: &fonts,
            };
            let mut operations = self.page_operations(page_id)?;
            let count = replace_in_operations(&mut operations, &codec, old, new)?;
            if count == 0 {
                return Ok(0);
            }
            let encoded = Content { operations }.encode()?;
            (count, encoded)
        };

        self.doc.change_page_content(page_id, encoded)?;
        log::debug!("replaced {} occurrence(s) on page {}", count, page);
        Ok(count)
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.doc.save(path)?;
        Ok(())
    }
}

/// Decodes and encodes string operands with the page's font encodings.
struct FontCodec<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
}

impl FontCodec<'_> {
    fn decode(&self, font: &[u8], bytes: &[u8]) -> String {
        if let Some(font_dict) = self.fonts.get(font) {
            if let Ok(enc) = font_dict.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn encode_raw(&self, font: &[u8], text: &str) -> Vec<u8> {
        if let Some(font_dict) = self.fonts.get(font) {
            if let Ok(enc) = font_dict.get_font_encoding(self.doc) {
                return LopdfDocument::encode_text(&enc, text);
            }
        }
        encode_text_simple(text)
    }

    /// Encode `text`, failing when the font cannot represent all of it.
    fn encode(&self, font: &[u8], text: &str) -> Result<Vec<u8>> {
        let bytes = self.encode_raw(font, text);
        if self.decode(font, &bytes) != text {
            return Err(Error::Unencodable {
                text: text.to_string(),
                font: String::from_utf8_lossy(font).into_owned(),
            });
        }
        Ok(bytes)
    }
}

/// 2D text line matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Index of the string operand of a text-showing operator, if any.
fn show_string_operand(op: &Operation) -> Option<usize> {
    match op.operator.as_str() {
        "Tj" | "'" => Some(0),
        "\"" => Some(2),
        _ => None,
    }
}

/// Where a piece of block text comes from.
#[derive(Debug, Clone, PartialEq)]
enum RunSource {
    /// String operand of operation `op`; `item` indexes into a `TJ` array.
    Operand {
        op: usize,
        item: Option<usize>,
        font: Vec<u8>,
    },
    /// Space inserted for a line change or a wide `TJ` gap.
    Gap,
}

#[derive(Debug, Clone)]
struct TextRun {
    text: String,
    source: RunSource,
}

impl TextRun {
    fn gap() -> Self {
        Self {
            text: " ".to_string(),
            source: RunSource::Gap,
        }
    }
}

/// One `BT ... ET` text object, kept as the runs it was shown in.
#[derive(Debug, Default)]
struct RawBlock {
    origin: Option<(f32, f32)>,
    end: (f32, f32),
    last_y: Option<f32>,
    runs: Vec<TextRun>,
}

impl RawBlock {
    fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn last_char(&self) -> Option<char> {
        self.runs.iter().rev().find_map(|r| r.text.chars().last())
    }

    /// Called before each text-showing operator.
    fn begin_show(&mut self, matrix: &TextMatrix) {
        if self.origin.is_none() {
            self.origin = Some((matrix.e, matrix.f));
        }
        if self
            .last_y
            .is_some_and(|y| (y - matrix.f).abs() > f32::EPSILON)
            && self.last_char().is_some_and(|c| c != ' ')
        {
            self.runs.push(TextRun::gap());
        }
        self.last_y = Some(matrix.f);
    }
}

/// Walk the content stream and return its text objects in order.
fn walk_text(operations: &[Operation], codec: &FontCodec<'_>) -> Vec<RawBlock> {
    let mut blocks = Vec::new();
    let mut font: Vec<u8> = Vec::new();
    let mut leading = 0.0f32;
    let mut matrix = TextMatrix::default();
    let mut block = RawBlock::default();

    let flush = |blocks: &mut Vec<RawBlock>, block: &mut RawBlock, matrix: &TextMatrix| {
        let mut done = std::mem::take(block);
        if !done.runs.is_empty() {
            done.end = (matrix.e, matrix.f);
            blocks.push(done);
        }
    };

    for (idx, op) in operations.iter().enumerate() {
        match op.operator.as_str() {
            "BT" => {
                flush(&mut blocks, &mut block, &matrix);
                matrix = TextMatrix::default();
            }
            "ET" => flush(&mut blocks, &mut block, &matrix),
            "Tf" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    font = name.clone();
                }
            }
            "TL" => {
                leading = op.operands.first().and_then(get_number).unwrap_or(leading);
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        leading = -ty;
                    }
                    matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let n = |i: usize| get_number(&op.operands[i]).unwrap_or(0.0);
                    matrix = TextMatrix {
                        a: n(0),
                        b: n(1),
                        c: n(2),
                        d: n(3),
                        e: n(4),
                        f: n(5),
                    };
                }
            }
            "T*" => matrix.translate(0.0, -leading),
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    block.begin_show(&matrix);
                    let mut shown_last: Option<char> = None;
                    for (item, object) in items.iter().enumerate() {
                        match object {
                            Object::String(bytes, _) => {
                                let text = codec.decode(&font, bytes);
                                if let Some(c) = text.chars().last() {
                                    shown_last = Some(c);
                                }
                                block.runs.push(TextRun {
                                    text,
                                    source: RunSource::Operand {
                                        op: idx,
                                        item: Some(item),
                                        font: font.clone(),
                                    },
                                });
                            }
                            other => {
                                let gap = get_number(other).map(|n| -n).unwrap_or(0.0);
                                if gap > TJ_SPACE_THRESHOLD && shown_last.is_some_and(|c| c != ' ') {
                                    block.runs.push(TextRun::gap());
                                    shown_last = Some(' ');
                                }
                            }
                        }
                    }
                }
            }
            _ => {
                if let Some(operand) = show_string_operand(op) {
                    if op.operator != "Tj" {
                        matrix.translate(0.0, -leading);
                    }
                    if let Some(Object::String(bytes, _)) = op.operands.get(operand) {
                        block.begin_show(&matrix);
                        block.runs.push(TextRun {
                            text: codec.decode(&font, bytes),
                            source: RunSource::Operand {
                                op: idx,
                                item: None,
                                font: font.clone(),
                            },
                        });
                    }
                }
            }
        }
    }
    flush(&mut blocks, &mut block, &matrix);

    blocks
}

fn collect_text_blocks(operations: &[Operation], codec: &FontCodec<'_>) -> Vec<TextBlock> {
    walk_text(operations, codec)
        .into_iter()
        .filter_map(|block| {
            let text = block.text().trim().to_string();
            if text.is_empty() {
                return None;
            }
            let (x, y) = block.origin.unwrap_or(block.end);
            Some((x, y, text))
        })
        .enumerate()
        .map(|(index, (x, y, text))| TextBlock { index, x, y, text })
        .collect()
}

/// Changes to the string operands of a page, computed before any is applied.
#[derive(Debug, Default)]
struct PageEdits {
    /// New bytes for a string operand, by operation and `TJ` item.
    strings: Vec<(usize, Option<usize>, Vec<u8>)>,
    /// `TJ` items to remove, by operation and item.
    dropped: BTreeSet<(usize, usize)>,
    count: usize,
}

/// Find every occurrence of `old` in the text of each block and plan the
/// operand changes that turn it into `new`.
///
/// An occurrence spanning several operands is written into the first of
/// them; the rest lose the matched part, and `TJ` items emptied or skipped
/// over by it are dropped. Nothing is planned when a changed operand cannot
/// be encoded in its font.
fn plan_replacements(
    operations: &[Operation],
    codec: &FontCodec<'_>,
    old: &str,
    new: &str,
) -> Result<PageEdits> {
    let mut edits = PageEdits::default();

    for block in walk_text(operations, codec) {
        let runs = &block.runs;
        let joined = block.text();
        let mut ranges = Vec::with_capacity(runs.len());
        let mut pos = 0;
        for run in runs {
            ranges.push((pos, pos + run.text.len()));
            pos += run.text.len();
        }
        let is_operand = |i: usize| matches!(runs[i].source, RunSource::Operand { .. });
        let overlaps = |i: usize, start: usize, end: usize| {
            let (rs, re) = ranges[i];
            start < re && end > rs
        };

        // (start, end, run receiving the new text)
        let hits: Vec<(usize, usize, usize)> = joined
            .match_indices(old)
            .filter_map(|(start, m)| {
                let end = start + m.len();
                (0..runs.len())
                    .find(|&i| is_operand(i) && overlaps(i, start, end))
                    .map(|anchor| (start, end, anchor))
            })
            .collect();
        if hits.is_empty() {
            continue;
        }
        edits.count += hits.len();

        for &(start, end, _) in &hits {
            let touched: Vec<(usize, usize)> = (0..runs.len())
                .filter(|&i| overlaps(i, start, end))
                .filter_map(|i| match runs[i].source {
                    RunSource::Operand {
                        op, item: Some(item), ..
                    } => Some((op, item)),
                    _ => None,
                })
                .collect();
            for pair in touched.windows(2) {
                let ((op_a, item_a), (op_b, item_b)) = (pair[0], pair[1]);
                if op_a == op_b {
                    edits.dropped.extend((item_a + 1..item_b).map(|item| (op_a, item)));
                }
            }
        }

        for (i, run) in runs.iter().enumerate() {
            let RunSource::Operand { op, item, font } = &run.source else {
                continue;
            };
            let (rs, re) = ranges[i];
            let mut text = String::new();
            let mut cursor = rs;
            let mut touched = false;
            for &(start, end, anchor) in &hits {
                if !overlaps(i, start, end) {
                    continue;
                }
                text.push_str(&joined[cursor..start.max(rs)]);
                if anchor == i {
                    text.push_str(new);
                }
                cursor = end.min(re);
                touched = true;
            }
            if !touched {
                continue;
            }
            text.push_str(&joined[cursor..re]);

            match item {
                Some(item) if text.is_empty() => {
                    edits.dropped.insert((*op, *item));
                }
                _ => edits.strings.push((*op, *item, codec.encode(font, &text)?)),
            }
        }
    }

    Ok(edits)
}

fn apply_edits(operations: &mut [Operation], edits: PageEdits) {
    for (op, item, bytes) in edits.strings {
        let Some(operation) = operations.get_mut(op) else {
            continue;
        };
        let target = match item {
            None => show_string_operand(operation).and_then(|idx| operation.operands.get_mut(idx)),
            Some(item) => match operation.operands.first_mut() {
                Some(Object::Array(items)) => items.get_mut(item),
                _ => None,
            },
        };
        if let Some(Object::String(old_bytes, _)) = target {
            *old_bytes = bytes;
        }
    }

    let ops: BTreeSet<usize> = edits.dropped.iter().map(|(op, _)| *op).collect();
    for op in ops {
        if let Some(Object::Array(items)) = operations.get_mut(op).and_then(|o| o.operands.first_mut()) {
            let mut item = 0;
            items.retain(|_| {
                let keep = !edits.dropped.contains(&(op, item));
                item += 1;
                keep
            });
        }
    }
}

/// Replace every occurrence of `old` in the page text. Returns the count;
/// the operations are left untouched on error.
fn replace_in_operations(
    operations: &mut [Operation],
    codec: &FontCodec<'_>,
    old: &str,
    new: &str,
) -> Result<usize> {
    let edits = plan_replacements(operations, codec, old, new)?;
    let count = edits.count;
    apply_edits(operations, edits);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_encode_text_simple() {
        assert_eq!(encode_text_simple("Hellé"), vec![0x48, 0x65, 0x6C, 0x6C, 0xE9]);
        assert_eq!(encode_text_simple("€"), vec![b'?']);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let block = TextBlock {
            index: 0,
            x: 0.0,
            y: 0.0,
            text: "héllo wörld".to_string(),
        };
        assert_eq!(block.preview(4), "héll");
        assert_eq!(block.preview(100), "héllo wörld");
    }

    #[test]
    fn test_collect_blocks_without_fonts() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let codec = FontCodec {
            doc: &doc,
            fonts: &fonts,
        };
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal("Quarterly")]),
            Operation::new("Td", vec![0.into(), (-14).into()]),
            Operation::new("Tj", vec![Object::string_literal("Report")]),
            Operation::new("ET", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("ET", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("Td", vec![72.into(), 100.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Page"),
                    Object::Integer(-250),
                    Object::string_literal("1"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ];

        let blocks = collect_text_blocks(&ops, &codec);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "Quarterly Report");
        assert_eq!((blocks[0].x, blocks[0].y), (72.0, 700.0));
        assert_eq!(blocks[1].index, 1);
        assert_eq!(blocks[1].text, "Page 1");
    }

    #[test]
    fn test_replace_in_operations_counts_all() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let codec = FontCodec {
            doc: &doc,
            fonts: &fonts,
        };
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tj", vec![Object::string_literal("Draft one, Draft two")]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Dr"),
                    Object::Integer(-10),
                    Object::string_literal("aft"),
                ])],
            ),
            Operation::new("ET", vec![]),
        ];

        let count = replace_in_operations(&mut ops, &codec, "Draft", "Final").unwrap();
        assert_eq!(count, 3);
        assert!(matches!(
            &ops[1].operands[0],
            Object::String(bytes, _) if bytes == b"Final one, Final two"
        ));
        match &ops[2].operands[0] {
            Object::Array(items) => {
                assert_eq!(items.len(), 1);
                assert!(matches!(&items[0], Object::String(bytes, _) if bytes == b"Final"));
            }
            _ => panic!("TJ operand should stay an array"),
        }
    }

    #[test]
    fn test_replace_is_case_sensitive() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let codec = FontCodec {
            doc: &doc,
            fonts: &fonts,
        };
        let mut ops = vec![Operation::new("Tj", vec![Object::string_literal("DRAFT")])];
        assert_eq!(
            replace_in_operations(&mut ops, &codec, "Draft", "Final").unwrap(),
            0
        );
    }

    fn string_operand(op: &Operation) -> &[u8] {
        match &op.operands[0] {
            Object::String(bytes, _) => bytes,
            other => panic!("expected string operand, got {:?}", other),
        }
    }

    #[test]
    fn test_replace_across_show_operators() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let codec = FontCodec {
            doc: &doc,
            fonts: &fonts,
        };
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal("Q2")]),
            Operation::new("Tj", vec![Object::string_literal(" Report")]),
            Operation::new("ET", vec![]),
        ];
        assert_eq!(collect_text_blocks(&ops, &codec)[0].text, "Q2 Report");

        let count = replace_in_operations(&mut ops, &codec, "Q2 Report", "Q3 Summary").unwrap();
        assert_eq!(count, 1);
        assert_eq!(string_operand(&ops[2]), b"Q3 Summary");
        assert_eq!(string_operand(&ops[3]), b"");
        assert_eq!(collect_text_blocks(&ops, &codec)[0].text, "Q3 Summary");
    }

    #[test]
    fn test_replace_across_lines_keeps_tail() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let codec = FontCodec {
            doc: &doc,
            fonts: &fonts,
        };
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal("Quarterly")]),
            Operation::new("Td", vec![0.into(), (-14).into()]),
            Operation::new("Tj", vec![Object::string_literal("Report 2024")]),
            Operation::new("ET", vec![]),
        ];

        let count = replace_in_operations(&mut ops, &codec, "Quarterly Report", "Annual Review").unwrap();
        assert_eq!(count, 1);
        assert_eq!(string_operand(&ops[2]), b"Annual Review");
        assert_eq!(string_operand(&ops[4]), b" 2024");
    }

    #[test]
    fn test_tj_span_drops_inner_kerning() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let codec = FontCodec {
            doc: &doc,
            fonts: &fonts,
        };
        let mut ops = vec![Operation::new(
            "TJ",
            vec![Object::Array(vec![
                Object::string_literal("Net "),
                Object::Integer(-20),
                Object::string_literal("Dr"),
                Object::Integer(-10),
                Object::string_literal("aft v2"),
            ])],
        )];

        assert_eq!(replace_in_operations(&mut ops, &codec, "Draft", "Final").unwrap(), 1);
        match &ops[0].operands[0] {
            Object::Array(items) => {
                assert_eq!(items.len(), 4);
                assert!(matches!(&items[2], Object::String(b, _) if b == b"Final"));
                assert!(matches!(&items[3], Object::String(b, _) if b == b" v2"));
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_unencodable_replacement_leaves_operations() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let codec = FontCodec {
            doc: &doc,
            fonts: &fonts,
        };
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tj", vec![Object::string_literal("Status: Draft")]),
            Operation::new("ET", vec![]),
        ];

        let err = replace_in_operations(&mut ops, &codec, "Draft", "Готово").unwrap_err();
        assert!(matches!(err, Error::Unencodable { .. }));
        assert_eq!(string_operand(&ops[1]), b"Status: Draft");
    }
}
