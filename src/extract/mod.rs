//! Opaque PDF/EPUB extraction capability: `extract(path) -> {pages|chapters,
//! metadata, cover}` (spec §1). Extraction is CPU/file-I/O bound, so it is
//! a synchronous trait run inside `spawn_blocking` by the extract stage
//! executor, the same discipline the teacher uses for its own PDF
//! ingestion (`tokio::task::spawn_blocking` around `pdf::ingest_pdf`).

pub mod cover;
pub mod epub;
pub mod pdf;

use std::path::Path;

#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub text: String,
    pub page_number: Option<i32>,
    pub chapter: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractedBook {
    pub pages: Vec<ExtractedPage>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover: Option<Vec<u8>>,
}

pub trait BookExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> anyhow::Result<ExtractedBook>;
}

pub fn for_file_type(file_type: &str) -> Box<dyn BookExtractor> {
    match file_type {
        "epub" => Box::new(epub::EpubExtractor),
        _ => Box::new(pdf::PdfExtractor),
    }
}

#[cfg(test)]
pub mod fakes {
    use super::*;

    pub struct FakeExtractor {
        pub book: ExtractedBook,
    }

    impl BookExtractor for FakeExtractor {
        fn extract(&self, _path: &Path) -> anyhow::Result<ExtractedBook> {
            Ok(self.book.clone())
        }
    }
}
