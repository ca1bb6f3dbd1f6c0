//! Content-based recommendations (SPEC_FULL §B.5, grounded on
//! `recommendation_service.py`): mean-embedding cosine similarity between
//! books, aggregated to the best-scoring chunk per candidate book, with a
//! recent-completed fallback when there's no reading history.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order, QueryFilter, QueryOrder, QuerySelect, Statement};

use crate::db::entities::*;

const SIMILAR_BOOKS_SAMPLE: u64 = 20;
const SIMILAR_CHUNKS_FANOUT: i64 = 5;
const PER_SOURCE_BOOK_LIMIT: usize = 3;
const RECOMMENDATION_HISTORY_LIMIT: u64 = 5;

pub struct SimilarBook {
    pub book: Book,
    pub similarity: f64,
}

#[derive(FromQueryResult)]
struct EmbeddingRow {
    embedding_text: String,
}

#[derive(FromQueryResult)]
struct DistanceRow {
    book_id: i32,
    distance: f64,
}

pub async fn get_similar_books(db: &DatabaseConnection, book_id: i32, limit: usize) -> anyhow::Result<Vec<SimilarBook>> {
    let backend = db.get_database_backend();

    let rows = EmbeddingRow::find_by_statement(Statement::from_sql_and_values(
        backend,
        "SELECT embedding::text AS embedding_text FROM book_chunk \
         WHERE book_id = $1 AND has_embedding = true LIMIT $2",
        [book_id.into(), (SIMILAR_BOOKS_SAMPLE as i64).into()],
    ))
    .all(db)
    .await?;

    let vectors: Vec<Vec<f32>> = rows.iter().filter_map(|r| parse_pgvector_text(&r.embedding_text)).collect();
    if vectors.is_empty() {
        return Ok(Vec::new());
    }
    let avg = mean_vector(&vectors);
    let literal = crate::db::vector::to_pgvector_literal(&avg);

    let fetch_n = (limit as i64) * SIMILAR_CHUNKS_FANOUT;
    let rows = DistanceRow::find_by_statement(Statement::from_sql_and_values(
        backend,
        "SELECT book_id, (embedding <=> $1::vector)::float8 AS distance FROM book_chunk \
         WHERE book_id != $2 AND has_embedding = true ORDER BY embedding <=> $1::vector LIMIT $3",
        [literal.into(), book_id.into(), fetch_n.into()],
    ))
    .all(db)
    .await?;

    let mut best: HashMap<i32, f64> = HashMap::new();
    for row in rows {
        best.entry(row.book_id).or_insert(row.distance);
    }

    let mut sorted: Vec<(i32, f64)> = best.into_iter().collect();
    sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    sorted.truncate(limit);

    let mut results = Vec::with_capacity(sorted.len());
    for (bid, distance) in sorted {
        if let Some(book) = BookEntity::find_by_id(bid).one(db).await? {
            results.push(SimilarBook { book, similarity: 1.0 - distance });
        }
    }

    Ok(results)
}

pub async fn get_recommendations(db: &DatabaseConnection, limit: usize) -> anyhow::Result<Vec<Book>> {
    let recent_progress = ReadingProgressEntity::find()
        .filter(ReadingProgressColumn::Status.is_in([reading_progress::status::READING, reading_progress::status::COMPLETED]))
        .order_by(ReadingProgressColumn::LastReadAt, Order::Desc)
        .limit(RECOMMENDATION_HISTORY_LIMIT)
        .all(db)
        .await?;

    if recent_progress.is_empty() {
        return Ok(BookEntity::find()
            .filter(BookColumn::ProcessingStatus.eq(book::status::COMPLETED))
            .order_by(BookColumn::CreatedAt, Order::Desc)
            .limit(limit as u64)
            .all(db)
            .await?);
    }

    let read_book_ids: std::collections::HashSet<i32> = recent_progress.iter().map(|p| p.book_id).collect();
    let mut seen = read_book_ids.clone();
    let mut recommended = Vec::new();

    for progress in &recent_progress {
        let similar = get_similar_books(db, progress.book_id, PER_SOURCE_BOOK_LIMIT).await?;
        for s in similar {
            if seen.insert(s.book.id) {
                recommended.push(s.book);
            }
        }
    }

    recommended.truncate(limit);
    Ok(recommended)
}

fn parse_pgvector_text(text: &str) -> Option<Vec<f32>> {
    text.trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|s| s.trim().parse::<f32>().ok())
        .collect()
}

fn mean_vector(vectors: &[Vec<f32>]) -> Vec<f32> {
    let dim = vectors[0].len();
    let mut sum = vec![0.0f32; dim];
    for v in vectors {
        for (i, x) in v.iter().enumerate() {
            sum[i] += x;
        }
    }
    let n = vectors.len() as f32;
    sum.into_iter().map(|s| s / n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_vector_averages_componentwise() {
        let vectors = vec![vec![1.0, 1.0], vec![3.0, 5.0]];
        assert_eq!(mean_vector(&vectors), vec![2.0, 3.0]);
    }

    #[test]
    fn parses_pgvector_bracket_notation() {
        assert_eq!(parse_pgvector_text("[0.5,1,-2.25]"), Some(vec![0.5, 1.0, -2.25]));
    }

    #[test]
    fn rejects_malformed_pgvector_text() {
        assert_eq!(parse_pgvector_text("[nope]"), None);
    }
}
