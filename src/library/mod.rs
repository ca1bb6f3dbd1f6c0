//! Library directory scan, hash-dedup import, and filename-derived
//! metadata fallback. Grounded on the original's `library_service.py`,
//! `processing/pipeline.py` (`scan_directory`, `compute_file_hash`), and
//! `processing/metadata_parser.py` (`parse_filename`) — SPEC_FULL §B.5.

use std::path::{Path, PathBuf};

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};

use crate::db::entities::*;

const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "epub"];

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub file_path: PathBuf,
    pub file_type: String,
    pub file_size: u64,
}

/// Recursively walks `directory`, returning every `.pdf`/`.epub` file found.
pub fn scan_directory(directory: &Path) -> Vec<ScannedFile> {
    let mut results = Vec::new();
    if !directory.exists() {
        tracing::error!(directory = %directory.display(), "library directory not found");
        return results;
    }

    let mut entries: Vec<_> = walkdir::WalkDir::new(directory)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .collect();
    entries.sort_by_key(|e| e.path().to_path_buf());

    for entry in entries {
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let ext = ext.to_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        results.push(ScannedFile {
            file_path: path.to_path_buf(),
            file_type: ext,
            file_size: meta.len(),
        });
    }

    tracing::info!(count = results.len(), directory = %directory.display(), "library scan complete");
    results
}

/// SHA-256 over the file's bytes, hex-encoded (spec §6 File identity).
pub fn compute_file_hash(path: &Path) -> anyhow::Result<String> {
    use sha2::{Digest, Sha256};
    use std::io::Read;

    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFilename {
    pub title: String,
    pub author: Option<String>,
}

/// Parses `"Author - Title"` / `"Title_Author"` conventions out of a bare
/// filename, falling back to the cleaned stem as the title.
pub fn parse_filename(path: &Path) -> ParsedFilename {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

    let paren_re = once_cell::sync::Lazy::new(|| regex::Regex::new(r"\([^)]*\)").unwrap());
    let bracket_re = once_cell::sync::Lazy::new(|| regex::Regex::new(r"\[[^\]]*\]").unwrap());
    let whitespace_re = once_cell::sync::Lazy::new(|| regex::Regex::new(r"\s+").unwrap());

    let cleaned = paren_re.replace_all(stem, "");
    let cleaned = bracket_re.replace_all(&cleaned, "");
    let cleaned = cleaned.trim_matches(|c: char| " _-.".contains(c)).to_string();

    if let Some((author, title)) = cleaned.split_once(" - ") {
        return ParsedFilename {
            title: title.trim().to_string(),
            author: Some(author.trim().to_string()),
        };
    }

    if let Some(pos) = cleaned.rfind('_') {
        let (title_part, author_part) = cleaned.split_at(pos);
        let author_part = &author_part[1..];
        if author_part.len() > 3 {
            return ParsedFilename {
                title: title_part.replace('_', " ").trim().to_string(),
                author: Some(author_part.replace('_', " ").trim().to_string()),
            };
        }
    }

    let title = cleaned.replace(['_', '-'], " ");
    let title = whitespace_re.replace_all(&title, " ").trim().to_string();
    ParsedFilename { title, author: None }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Imports scanned files, skipping any whose content hash already has a
/// Book row (spec §8 Testable Property 4 / §8 scenario S1).
pub async fn import_books(db: &DatabaseConnection, files: &[ScannedFile]) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for file in files {
        let hash = match compute_file_hash(&file.file_path) {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(path = %file.file_path.display(), error = %e, "failed to hash file during import");
                summary.errors += 1;
                continue;
            }
        };

        let existing = BookEntity::find()
            .filter(BookColumn::FileHash.eq(hash.clone()))
            .count(db)
            .await
            .unwrap_or(0);
        if existing > 0 {
            summary.skipped += 1;
            continue;
        }

        let parsed = parse_filename(&file.file_path);
        let now = chrono::Utc::now();
        let book = BookActiveModel {
            title: Set(parsed.title),
            author: Set(parsed.author),
            file_hash: Set(hash),
            processing_status: Set(book::status::PENDING.to_string()),
            processing_progress: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let inserted = match sea_orm::ActiveModelTrait::insert(book, db).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(path = %file.file_path.display(), error = %e, "failed to create book during import");
                summary.errors += 1;
                continue;
            }
        };

        let book_file = BookFileActiveModel {
            book_id: Set(inserted.id),
            file_path: Set(file.file_path.to_string_lossy().to_string()),
            file_type: Set(file.file_type.clone()),
            file_size: Set(file.file_size as i64),
            ..Default::default()
        };
        if let Err(e) = sea_orm::ActiveModelTrait::insert(book_file, db).await {
            tracing::error!(error = %e, "failed to record book file during import");
            summary.errors += 1;
            continue;
        }

        crate::jobs::enqueue(db, inserted.id, processing_job::stage::EXTRACT).await.ok();
        summary.imported += 1;
    }

    summary
}

#[derive(Debug, serde::Serialize)]
pub struct LibraryStats {
    pub total_books: u64,
    pub processed_books: u64,
    pub pending_books: u64,
    pub total_chunks: u64,
    pub total_insights: u64,
}

pub async fn get_library_stats(db: &DatabaseConnection) -> anyhow::Result<LibraryStats> {
    let total_books = BookEntity::find().count(db).await?;
    let processed = BookEntity::find()
        .filter(BookColumn::ProcessingStatus.eq(book::status::COMPLETED))
        .count(db)
        .await?;
    let total_chunks = BookChunkEntity::find().count(db).await?;
    let total_insights = BookInsightEntity::find().count(db).await?;

    Ok(LibraryStats {
        total_books,
        processed_books: processed,
        pending_books: total_books.saturating_sub(processed),
        total_chunks,
        total_insights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_author_dash_title() {
        let parsed = parse_filename(Path::new("Robert Greene - The 48 Laws of Power.pdf"));
        assert_eq!(parsed.author.as_deref(), Some("Robert Greene"));
        assert_eq!(parsed.title, "The 48 Laws of Power");
    }

    #[test]
    fn strips_bracketed_and_parenthesized_noise() {
        let parsed = parse_filename(Path::new("Some Book (z-lib.org) [epub].epub"));
        assert_eq!(parsed.title, "Some Book");
        assert!(parsed.author.is_none());
    }

    #[test]
    fn falls_back_to_cleaned_stem() {
        let parsed = parse_filename(Path::new("just_a_title.pdf"));
        assert_eq!(parsed.title, "just a title");
    }
}
