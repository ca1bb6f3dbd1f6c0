//! Topic modeling (SPEC_FULL §B supplement, grounded on the original's
//! `topic_service.run_topic_modeling`): k-means over per-book mean chunk
//! embeddings, placeholder `"Topic N"` naming with a hash-derived color.
//! No LLM labeling is wired — `LABEL_TOPIC` stays an unused prompt,
//! matching the source (spec §9 Open Question, resolved in SPEC_FULL §B.3).

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Set, Statement,
};

use crate::db::entities::*;
use crate::pipeline::PipelineContext;

const DEFAULT_N_TOPICS: usize = 10;
const CHUNKS_PER_BOOK_SAMPLE: u64 = 20;
const KMEANS_SEED: u64 = 42;
const KMEANS_MAX_ITERS: usize = 100;
const RELATION_STRENGTH_FLOOR: f32 = 0.3;

pub struct TopicGraph {
    pub nodes: Vec<Topic>,
    pub edges: Vec<TopicRelation>,
}

/// All topics, most populated first.
pub async fn get_topics(db: &DatabaseConnection) -> anyhow::Result<Vec<Topic>> {
    Ok(TopicEntity::find().order_by_desc(TopicColumn::BookCount).all(db).await?)
}

/// A topic and its member books, most relevant first.
pub async fn get_topic_with_books(db: &DatabaseConnection, topic_id: i32) -> anyhow::Result<Option<(Topic, Vec<Book>)>> {
    let Some(topic) = TopicEntity::find_by_id(topic_id).one(db).await? else {
        return Ok(None);
    };

    let memberships = BookTopicEntity::find()
        .filter(BookTopicColumn::TopicId.eq(topic_id))
        .order_by_desc(BookTopicColumn::Relevance)
        .all(db)
        .await?;

    let mut books = Vec::with_capacity(memberships.len());
    for m in memberships {
        if let Some(b) = BookEntity::find_by_id(m.book_id).one(db).await? {
            books.push(b);
        }
    }

    Ok(Some((topic, books)))
}

/// Topics as nodes, relations stronger than the floor as edges.
pub async fn get_topic_graph(db: &DatabaseConnection) -> anyhow::Result<TopicGraph> {
    let nodes = get_topics(db).await?;
    let edges = TopicRelationEntity::find()
        .filter(TopicRelationColumn::Strength.gt(RELATION_STRENGTH_FLOOR))
        .all(db)
        .await?;
    Ok(TopicGraph { nodes, edges })
}

#[derive(FromQueryResult)]
struct EmbeddingRow {
    embedding_text: String,
}

pub async fn rebuild(ctx: &PipelineContext) -> anyhow::Result<()> {
    run_topic_modeling(&ctx.db, DEFAULT_N_TOPICS).await?;
    Ok(())
}

pub async fn run_topic_modeling(db: &DatabaseConnection, n_topics_requested: usize) -> anyhow::Result<Vec<Topic>> {
    let completed_books = BookEntity::find()
        .filter(BookColumn::ProcessingStatus.eq(book::status::COMPLETED))
        .all(db)
        .await?;

    let mut n_topics = n_topics_requested;
    if completed_books.len() < n_topics {
        n_topics = (completed_books.len() / 2).max(2);
    }

    let mut book_embeddings: Vec<(i32, Vec<f32>)> = Vec::new();
    for b in &completed_books {
        if let Some(avg) = mean_embedding_for_book(db, b.id).await? {
            book_embeddings.push((b.id, avg));
        }
    }

    if book_embeddings.len() < 2 {
        return Ok(Vec::new());
    }

    n_topics = n_topics.min(book_embeddings.len());
    let vectors: Vec<Vec<f32>> = book_embeddings.iter().map(|(_, v)| v.clone()).collect();
    let labels = kmeans(&vectors, n_topics);

    // Clear out the previous clustering before writing the new one.
    TopicEntity::delete_many().exec(db).await?;

    let mut topics = Vec::new();
    for i in 0..n_topics {
        let members: Vec<usize> = (0..labels.len()).filter(|&j| labels[j] == i).collect();
        if members.is_empty() {
            continue;
        }

        let centroid = mean_vector(&members.iter().map(|&j| vectors[j].clone()).collect::<Vec<_>>());
        let color = hash_color(&format!("topic{i}"));

        let inserted = sea_orm::ActiveModelTrait::insert(
            TopicActiveModel {
                name: Set(format!("Topic {}", i + 1)),
                keywords: Set(None),
                has_embedding: Set(true),
                book_count: Set(members.len() as i32),
                color: Set(color),
                ..Default::default()
            },
            db,
        )
        .await?;

        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "UPDATE topic SET centroid_embedding = $1::vector WHERE id = $2",
            [crate::db::vector::to_pgvector_literal(&centroid).into(), inserted.id.into()],
        ))
        .await?;

        for &j in &members {
            let (book_id, _) = book_embeddings[j];
            sea_orm::ActiveModelTrait::insert(
                BookTopicActiveModel {
                    book_id: Set(book_id),
                    topic_id: Set(inserted.id),
                    relevance: Set(0.8),
                    ..Default::default()
                },
                db,
            )
            .await?;
        }

        topics.push(inserted);
    }

    Ok(topics)
}

async fn mean_embedding_for_book(db: &DatabaseConnection, book_id: i32) -> anyhow::Result<Option<Vec<f32>>> {
    let rows = EmbeddingRow::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        "SELECT embedding::text AS embedding_text FROM book_chunk \
         WHERE book_id = $1 AND has_embedding = true LIMIT $2",
        [book_id.into(), (CHUNKS_PER_BOOK_SAMPLE as i64).into()],
    ))
    .all(db)
    .await?;

    let vectors: Vec<Vec<f32>> = rows.iter().filter_map(|r| parse_pgvector_text(&r.embedding_text)).collect();
    if vectors.is_empty() {
        return Ok(None);
    }
    Ok(Some(mean_vector(&vectors)))
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

fn hash_color(seed: &str) -> String {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    seed.hash(&mut hasher);
    format!("#{:06x}", hasher.finish() & 0xFFFFFF)
}

/// Lloyd's algorithm with a fixed seed, mirroring the original's
/// `KMeans(random_state=42)`. No crate in the adopted stack offers
/// clustering, so this is a direct, minimal port of the algorithm.
fn kmeans(vectors: &[Vec<f32>], k: usize) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(KMEANS_SEED);
    let mut centroids: Vec<Vec<f32>> = vectors.choose_multiple(&mut rng, k).cloned().collect();
    let mut labels = vec![0usize; vectors.len()];

    for _ in 0..KMEANS_MAX_ITERS {
        let mut changed = false;
        for (i, v) in vectors.iter().enumerate() {
            let best = centroids
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| squared_dist(v, a).partial_cmp(&squared_dist(v, b)).unwrap())
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            if labels[i] != best {
                labels[i] = best;
                changed = true;
            }
        }

        let mut sums: HashMap<usize, Vec<Vec<f32>>> = HashMap::new();
        for (i, &label) in labels.iter().enumerate() {
            sums.entry(label).or_default().push(vectors[i].clone());
        }
        for (cluster, members) in sums {
            if !members.is_empty() {
                centroids[cluster] = mean_vector(&members);
            }
        }

        if !changed {
            break;
        }
    }

    labels
}

fn squared_dist(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_vector_averages_componentwise() {
        let vectors = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert_eq!(mean_vector(&vectors), vec![2.0, 3.0]);
    }

    #[test]
    fn parses_pgvector_bracket_notation() {
        assert_eq!(parse_pgvector_text("[1,2.5,-3]"), Some(vec![1.0, 2.5, -3.0]));
    }

    #[test]
    fn rejects_malformed_pgvector_text() {
        assert_eq!(parse_pgvector_text("[1,oops,3]"), None);
    }

    #[test]
    fn hash_color_is_deterministic_and_well_formed() {
        let a = hash_color("topic0");
        let b = hash_color("topic0");
        assert_eq!(a, b);
        assert_eq!(a.len(), 7);
        assert!(a.starts_with('#'));
    }

    #[test]
    fn kmeans_separates_two_distinct_clusters() {
        let vectors = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
        ];
        let labels = kmeans(&vectors, 2);
        assert_eq!(labels.len(), vectors.len());
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }
}
