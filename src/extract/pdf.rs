use std::path::Path;

use super::{BookExtractor, ExtractedBook, ExtractedPage};

pub struct PdfExtractor;

impl BookExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> anyhow::Result<ExtractedBook> {
        let pages_text = pdf_extract::extract_text_by_pages(path)
            .map_err(|e| anyhow::anyhow!("pdf extraction failed: {e}"))?;

        let pages = pages_text
            .into_iter()
            .enumerate()
            .map(|(i, text)| ExtractedPage {
                text,
                page_number: Some(i as i32 + 1),
                chapter: None,
            })
            .collect();

        Ok(ExtractedBook {
            pages,
            title: None,
            author: None,
            cover: None,
        })
    }
}
