//! Hybrid Retriever (spec §4.G): full-text search and ANN vector search
//! fused by Reciprocal Rank Fusion. Grounded on the paperforge-style
//! `hybrid_search` raw-SQL technique (`vector_search`/`bm25_search`
//! composed with an RRF merge) since pgvector has no sea-orm query DSL.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement};
use serde::Serialize;

use crate::db::vector::to_pgvector_literal;
use crate::llm::EmbeddingClient;

const RRF_K: f64 = 60.0;

#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub chunk_id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub book_author: Option<String>,
    pub content: String,
    pub page_number: Option<i32>,
    pub chapter: Option<String>,
    pub score: f64,
}

#[derive(FromQueryResult)]
struct RankedRow {
    id: i32,
    rank_pos: i32,
}

#[derive(FromQueryResult)]
struct HydratedRow {
    id: i32,
    book_id: i32,
    content: String,
    page_number: Option<i32>,
    chapter: Option<String>,
    title: String,
    author: Option<String>,
}

/// `hybridSearch(query, limit, bookFilter?)`. Empty queries are rejected
/// upstream by callers (handlers/chat assembler), not here.
pub async fn hybrid_search(
    db: &DatabaseConnection,
    embedder: &dyn EmbeddingClient,
    query: &str,
    limit: usize,
    book_ids: Option<&[i32]>,
) -> anyhow::Result<Vec<RetrievedChunk>> {
    let fetch_n = (2 * limit) as i64;
    let backend = db.get_database_backend();

    let book_ids_vec: Option<Vec<i32>> = book_ids.map(|ids| ids.to_vec());

    let fts_sql = "SELECT id, (row_number() OVER (ORDER BY ts_rank(search_vector, plainto_tsquery('english', $1)) DESC) - 1)::int AS rank_pos \
         FROM book_chunk WHERE search_vector @@ plainto_tsquery('english', $1) AND ($2::int[] IS NULL OR book_id = ANY($2)) \
         ORDER BY ts_rank(search_vector, plainto_tsquery('english', $1)) DESC LIMIT $3";
    let fts_rows = RankedRow::find_by_statement(Statement::from_sql_and_values(
        backend,
        fts_sql,
        [query.into(), book_ids_vec.clone().into(), fetch_n.into()],
    ))
    .all(db)
    .await
    .unwrap_or_default();

    let ann_rows = match embedder.embed_one(query).await {
        Ok(embedding) => {
            let literal = to_pgvector_literal(&embedding);
            let ann_sql = "SELECT id, (row_number() OVER (ORDER BY embedding <=> $1::vector) - 1)::int AS rank_pos \
                 FROM book_chunk WHERE has_embedding = true AND ($2::int[] IS NULL OR book_id = ANY($2)) \
                 ORDER BY embedding <=> $1::vector LIMIT $3";
            RankedRow::find_by_statement(Statement::from_sql_and_values(
                backend,
                ann_sql,
                [literal.into(), book_ids_vec.clone().into(), fetch_n.into()],
            ))
            .all(db)
            .await
            .unwrap_or_default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "query embedding failed, falling back to FTS-only");
            Vec::new()
        }
    };

    let fts_ranks: Vec<(i32, i32)> = fts_rows.iter().map(|r| (r.id, r.rank_pos)).collect();
    let ann_ranks: Vec<(i32, i32)> = ann_rows.iter().map(|r| (r.id, r.rank_pos)).collect();
    let ranked = fuse_rankings(&fts_ranks, &ann_ranks, limit);
    if ranked.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = ranked.iter().map(|(id, _)| *id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let hydrate_sql = "SELECT bc.id, bc.book_id, bc.content, bc.page_number, bc.chapter, b.title, b.author \
                        FROM book_chunk bc JOIN book b ON b.id = bc.book_id WHERE bc.id = ANY($1)";
    let hydrated = HydratedRow::find_by_statement(Statement::from_sql_and_values(
        backend,
        hydrate_sql,
        [ids.clone().into()],
    ))
    .all(db)
    .await?;

    let by_id: HashMap<i32, HydratedRow> = hydrated.into_iter().map(|r| (r.id, r)).collect();
    let score_by_id: HashMap<i32, f64> = ranked.into_iter().collect();

    let mut results: Vec<RetrievedChunk> = ids
        .into_iter()
        .filter_map(|id| {
            let row = by_id.get(&id)?;
            Some(RetrievedChunk {
                chunk_id: row.id,
                book_id: row.book_id,
                book_title: row.title.clone(),
                book_author: row.author.clone(),
                content: row.content.clone(),
                page_number: row.page_number,
                chapter: row.chapter.clone(),
                score: score_by_id.get(&id).copied().unwrap_or(0.0),
            })
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap().then_with(|| a.chunk_id.cmp(&b.chunk_id)));
    Ok(results)
}

/// Reciprocal Rank Fusion: each ranking list contributes `1 / (RRF_K + rank + 1)`
/// per id it contains; ids present in both lists accumulate both terms.
fn fuse_rankings(fts_ranks: &[(i32, i32)], ann_ranks: &[(i32, i32)], limit: usize) -> Vec<(i32, f64)> {
    let mut scores: HashMap<i32, f64> = HashMap::new();
    for &(id, rank_pos) in fts_ranks.iter().chain(ann_ranks.iter()) {
        *scores.entry(id).or_insert(0.0) += 1.0 / (RRF_K + rank_pos as f64 + 1.0);
    }

    let mut ranked: Vec<(i32, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_present_in_both_lists_outranks_single_list_hit() {
        let fts = vec![(1, 0), (2, 1)];
        let ann = vec![(2, 0), (3, 1)];
        let fused = fuse_rankings(&fts, &ann, 10);
        assert_eq!(fused[0].0, 2);
    }

    #[test]
    fn respects_limit() {
        let fts = vec![(1, 0), (2, 1), (3, 2)];
        let fused = fuse_rankings(&fts, &[], 2);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let fts = vec![(5, 0), (2, 0)];
        let fused = fuse_rankings(&fts, &[], 10);
        assert_eq!(fused[0].0, 2);
        assert_eq!(fused[1].0, 5);
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        assert!(fuse_rankings(&[], &[], 10).is_empty());
    }
}
