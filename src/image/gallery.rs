//! Output naming, `prompts.json` and the HTML contact sheet.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Maximum slug length used in file names.
pub const SLUG_MAX_CHARS: usize = 40;

/// A generated image and the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub prompt: String,
    pub file: String,
}

/// Lowercase, collapse every run of characters outside `[a-z0-9]` to a
/// single `-` and trim dashes. Empty results become `image`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug.to_string()
    }
}

/// `NNN-<slug>.<ext>` for the 1-based image number.
pub fn image_filename(number: usize, prompt: &str, ext: &str) -> String {
    let slug: String = slugify(prompt).chars().take(SLUG_MAX_CHARS).collect();
    format!("{:03}-{}.{}", number, slug, ext)
}

/// Escape text for HTML bodies and attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Write `prompts.json` (pretty-printed array) into `out_dir`.
pub fn write_prompts(out_dir: &Path, items: &[GalleryItem]) -> Result<PathBuf> {
    let path = out_dir.join("prompts.json");
    fs::write(&path, serde_json::to_string_pretty(items)?)?;
    Ok(path)
}

/// Render the gallery page.
pub fn render_gallery(out_dir: &Path, items: &[GalleryItem]) -> String {
    let thumbs: Vec<String> = items
        .iter()
        .map(|it| {
            let file = escape_html(&it.file);
            format!(
                "<figure>\n  <a href=\"{file}\"><img src=\"{file}\" loading=\"lazy\" /></a>\n  <figcaption>{}</figcaption>\n</figure>",
                escape_html(&it.prompt),
            )
        })
        .collect();

    format!(
        r#"<!doctype html>
<meta charset="utf-8" />
<title>image-gen</title>
<style>
  :root {{ color-scheme: dark; }}
  body {{ margin: 24px; font: 14px/1.4 ui-sans-serif, system-ui; background: #0b0f14; color: #e8edf2; }}
  h1 {{ font-size: 18px; margin: 0 0 16px; }}
  .grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 16px; }}
  figure {{ margin: 0; padding: 12px; border: 1px solid #1e2a36; border-radius: 14px; background: #0f1620; }}
  img {{ width: 100%; height: auto; border-radius: 10px; display: block; }}
  figcaption {{ margin-top: 10px; color: #b7c2cc; }}
  code {{ color: #9cd1ff; }}
</style>
<h1>image-gen</h1>
<p>Output: <code>{}</code></p>
<div class="grid">
{}
</div>
"#,
        escape_html(&out_dir.to_string_lossy()),
        thumbs.join("\n")
    )
}

/// Write `index.html` into `out_dir`.
pub fn write_gallery(out_dir: &Path, items: &[GalleryItem]) -> Result<PathBuf> {
    let path = out_dir.join("index.html");
    fs::write(&path, render_gallery(out_dir, items))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("A Cat, on the Moon!"), "a-cat-on-the-moon");
        assert_eq!(slugify("  --Hello__World--  "), "hello-world");
        assert_eq!(slugify("日本語"), "image");
        assert_eq!(slugify(""), "image");
    }

    #[test]
    fn test_image_filename_truncates_slug() {
        let prompt = "a very long prompt that keeps going well past forty characters";
        let name = image_filename(3, prompt, "png");
        assert!(name.starts_with("003-a-very-long-prompt"));
        assert_eq!(name.len(), "003-".len() + SLUG_MAX_CHARS + ".png".len());
        assert_eq!(image_filename(12, "x", "webp"), "012-x.webp");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_gallery_files() {
        let dir = TempDir::new().unwrap();
        let items = vec![GalleryItem {
            prompt: "<b>cat</b>".into(),
            file: "001-b-cat-b.png".into(),
        }];

        let prompts = write_prompts(dir.path(), &items).unwrap();
        let parsed: Vec<GalleryItem> =
            serde_json::from_str(&fs::read_to_string(prompts).unwrap()).unwrap();
        assert_eq!(parsed, items);

        let html = fs::read_to_string(write_gallery(dir.path(), &items).unwrap()).unwrap();
        assert!(html.contains("<figcaption>&lt;b&gt;cat&lt;/b&gt;</figcaption>"));
        assert!(html.contains(r#"<img src="001-b-cat-b.png" loading="lazy" />"#));
        assert!(!html.contains("<b>cat"));
    }
}
