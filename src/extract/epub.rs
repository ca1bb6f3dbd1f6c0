use std::path::Path;

use epub::doc::EpubDoc;

use super::{BookExtractor, ExtractedBook, ExtractedPage};

pub struct EpubExtractor;

impl BookExtractor for EpubExtractor {
    fn extract(&self, path: &Path) -> anyhow::Result<ExtractedBook> {
        let mut doc = EpubDoc::new(path).map_err(|e| anyhow::anyhow!("epub open failed: {e}"))?;

        let title = doc.mdata("title");
        let author = doc.mdata("creator");
        let cover = doc.get_cover().ok().map(|(bytes, _mime)| bytes);

        let spine_len = doc.spine.len();
        let mut pages = Vec::with_capacity(spine_len);

        for i in 0..spine_len {
            let chapter_id = doc.spine.get(i).cloned();
            if !doc.set_current_page(i) {
                continue;
            }
            let Some((content, _mime)) = doc.get_current_str() else {
                continue;
            };
            let text = strip_html_tags(&content);
            if text.trim().is_empty() {
                continue;
            }
            pages.push(ExtractedPage {
                text,
                page_number: None,
                chapter: chapter_id,
            });
        }

        Ok(ExtractedBook {
            pages,
            title,
            author,
            cover,
        })
    }
}

/// EPUB chapter bodies are XHTML; the chunker works on plain text so tags
/// are stripped with a minimal, dependency-free scan rather than a full
/// HTML parser.
fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_keeps_text() {
        let html = "<p>Hello <b>world</b></p><p>Second.</p>";
        assert_eq!(strip_html_tags(html), "Hello worldSecond.");
    }
}
