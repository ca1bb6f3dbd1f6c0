//! Paragraph-aware recursive splitter with overlap.
//!
//! Ground truth for the algorithm is the original `processing/chunker.py`:
//! greedily accumulate paragraphs until the token budget overflows, then
//! seed the next chunk with a tail of prior paragraphs (walked from the
//! end) whose cumulative token count stays within the overlap budget.

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_CHUNK_SIZE: usize = 512;
pub const DEFAULT_CHUNK_OVERLAP: usize = 64;

static PARAGRAPH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// One page or chapter of raw text, as handed to the chunker by the
/// extract stage. `chapter` is `None` for PDFs.
#[derive(Debug, Clone)]
pub struct Page {
    pub text: String,
    pub page_number: Option<i32>,
    pub chapter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub chunk_index: i32,
    pub content: String,
    pub page_number: Option<i32>,
    pub chapter: Option<String>,
    pub token_count: i32,
}

fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

struct Paragraph {
    text: String,
    tokens: usize,
    page_number: Option<i32>,
    chapter: Option<String>,
}

/// Splits `pages` into chunks, numbering them starting at `base_index`.
/// Never splits within a paragraph, never emits an empty chunk.
pub fn chunk_pages(
    pages: &[Page],
    chunk_size: usize,
    chunk_overlap: usize,
    base_index: i32,
) -> Vec<Chunk> {
    let mut paragraphs: Vec<Paragraph> = Vec::new();
    for page in pages {
        for raw in PARAGRAPH_SPLIT.split(&page.text) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            paragraphs.push(Paragraph {
                text: trimmed.to_string(),
                tokens: estimate_tokens(trimmed),
                page_number: page.page_number,
                chapter: page.chapter.clone(),
            });
        }
    }

    let mut chunks = Vec::new();
    let mut current: Vec<usize> = Vec::new(); // indices into `paragraphs`
    let mut current_tokens = 0usize;
    let mut next_index = base_index;

    let emit = |current: &[usize], paragraphs: &[Paragraph], chunks: &mut Vec<Chunk>, idx: &mut i32| {
        if current.is_empty() {
            return;
        }
        let content = current
            .iter()
            .map(|&i| paragraphs[i].text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let token_count: usize = current.iter().map(|&i| paragraphs[i].tokens).sum();
        let first = &paragraphs[current[0]];
        chunks.push(Chunk {
            chunk_index: *idx,
            content,
            page_number: first.page_number,
            chapter: first.chapter.clone(),
            token_count: token_count as i32,
        });
        *idx += 1;
    };

    for (pi, para) in paragraphs.iter().enumerate() {
        if !current.is_empty() && current_tokens + para.tokens > chunk_size {
            emit(&current, &paragraphs, &mut chunks, &mut next_index);

            // Seed the next chunk's overlap: walk the just-emitted chunk's
            // paragraphs from the end, taking a tail whose cumulative
            // token count stays within `chunk_overlap`, preserving order.
            let mut overlap: Vec<usize> = Vec::new();
            let mut overlap_tokens = 0usize;
            for &idx in current.iter().rev() {
                let t = paragraphs[idx].tokens;
                if overlap_tokens + t > chunk_overlap {
                    break;
                }
                overlap.insert(0, idx);
                overlap_tokens += t;
            }

            current = overlap;
            current_tokens = overlap_tokens;
        }

        current.push(pi);
        current_tokens += para.tokens;
    }

    emit(&current, &paragraphs, &mut chunks, &mut next_index);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize, label: &str) -> String {
        std::iter::repeat(format!("{label}word"))
            .take(n)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn splits_on_overflow_and_seeds_overlap() {
        // S2: P1(300) + P2(300) + P3(300), chunk_size=512, overlap=64.
        let p1 = words(300, "p1");
        let p2 = words(300, "p2");
        let p3 = words(300, "p3");
        let text = format!("{p1}\n\n{p2}\n\n{p3}");
        let pages = vec![Page {
            text,
            page_number: Some(1),
            chapter: None,
        }];

        let chunks = chunk_pages(&pages, 512, 64, 0);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, p1);
        assert!(chunks[1].content.starts_with(chunks[1].content.split("\n\n").next().unwrap()));
        assert!(chunks[1].content.ends_with(&p2));
        assert!(chunks[2].content.ends_with(&p3));
        assert_eq!(
            chunks.iter().map(|c| c.chunk_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn never_emits_empty_chunk_for_blank_input() {
        let pages = vec![Page {
            text: "\n\n   \n\n".to_string(),
            page_number: Some(1),
            chapter: None,
        }];
        assert!(chunk_pages(&pages, 512, 64, 0).is_empty());
    }

    #[test]
    fn dense_index_carried_across_pages() {
        let pages = vec![
            Page { text: words(10, "a"), page_number: Some(1), chapter: None },
            Page { text: words(10, "b"), page_number: Some(2), chapter: None },
        ];
        let chunks = chunk_pages(&pages, 512, 64, 5);
        assert_eq!(chunks[0].chunk_index, 5);
        // both pages fit in one chunk (well under 512 tokens)
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].page_number, Some(1));
    }

    #[test]
    fn idempotent_rerun_produces_identical_chunks() {
        let pages = vec![Page {
            text: format!("{}\n\n{}", words(100, "x"), words(100, "y")),
            page_number: Some(1),
            chapter: None,
        }];
        let a = chunk_pages(&pages, 512, 64, 0);
        let b = chunk_pages(&pages, 512, 64, 0);
        assert_eq!(a, b);
    }
}
