//! Second brain: learning paths and cross-book insight connections
//! (SPEC_FULL §B.4, grounded on `knowledge_service.py`). Every operation
//! here is a read path — no executor writes `InsightConnection` or
//! `LearningPath` rows (spec §9 Open Question, resolved read-only).

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect};

use crate::db::entities::*;

const CONNECTION_FLOOR: f32 = 0.5;

pub struct LearningPathDetail {
    pub path: LearningPath,
    pub books: Vec<LearningPathBookEntry>,
}

pub struct LearningPathBookEntry {
    pub book: Book,
    pub position: i32,
    pub rationale: Option<String>,
}

pub struct ConnectionDetail {
    pub connection: InsightConnection,
    pub insight_a: (BookInsight, Option<Book>),
    pub insight_b: (BookInsight, Option<Book>),
}

pub struct KnowledgeMapNode {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
}

pub struct KnowledgeMapEdge {
    pub source: i32,
    pub target: i32,
    pub strength: f32,
    pub description: Option<String>,
}

pub struct KnowledgeMap {
    pub nodes: Vec<KnowledgeMapNode>,
    pub edges: Vec<KnowledgeMapEdge>,
}

pub async fn get_learning_paths(db: &DatabaseConnection) -> anyhow::Result<Vec<LearningPath>> {
    Ok(LearningPathEntity::find()
        .order_by(LearningPathColumn::CreatedAt, Order::Desc)
        .all(db)
        .await?)
}

pub async fn get_learning_path(db: &DatabaseConnection, path_id: i32) -> anyhow::Result<Option<LearningPathDetail>> {
    let Some(path) = LearningPathEntity::find_by_id(path_id).one(db).await? else {
        return Ok(None);
    };

    let path_books = LearningPathBookEntity::find()
        .filter(LearningPathBookColumn::PathId.eq(path_id))
        .order_by_asc(LearningPathBookColumn::Position)
        .all(db)
        .await?;

    let mut books = Vec::with_capacity(path_books.len());
    for pb in path_books {
        if let Some(book) = BookEntity::find_by_id(pb.book_id).one(db).await? {
            books.push(LearningPathBookEntry { book, position: pb.position, rationale: pb.rationale });
        }
    }

    Ok(Some(LearningPathDetail { path, books }))
}

pub async fn get_knowledge_connections(db: &DatabaseConnection, limit: u64) -> anyhow::Result<Vec<ConnectionDetail>> {
    let connections = InsightConnectionEntity::find()
        .order_by(InsightConnectionColumn::Strength, Order::Desc)
        .limit(limit)
        .all(db)
        .await?;

    let mut results = Vec::with_capacity(connections.len());
    for conn in connections {
        let Some(insight_a) = BookInsightEntity::find_by_id(conn.insight_a_id).one(db).await? else {
            continue;
        };
        let Some(insight_b) = BookInsightEntity::find_by_id(conn.insight_b_id).one(db).await? else {
            continue;
        };
        let book_a = BookEntity::find_by_id(insight_a.book_id).one(db).await?;
        let book_b = BookEntity::find_by_id(insight_b.book_id).one(db).await?;
        results.push(ConnectionDetail {
            connection: conn,
            insight_a: (insight_a, book_a),
            insight_b: (insight_b, book_b),
        });
    }

    Ok(results)
}

pub async fn get_knowledge_map(db: &DatabaseConnection) -> anyhow::Result<KnowledgeMap> {
    let books = BookEntity::find()
        .filter(BookColumn::ProcessingStatus.eq(book::status::COMPLETED))
        .all(db)
        .await?;

    let connections = InsightConnectionEntity::find()
        .filter(InsightConnectionColumn::Strength.gt(CONNECTION_FLOOR))
        .all(db)
        .await?;

    let mut book_ids_in_connections = std::collections::HashSet::new();
    let mut edges = Vec::new();
    for conn in connections {
        let Some(insight_a) = BookInsightEntity::find_by_id(conn.insight_a_id).one(db).await? else {
            continue;
        };
        let Some(insight_b) = BookInsightEntity::find_by_id(conn.insight_b_id).one(db).await? else {
            continue;
        };
        if insight_a.book_id == insight_b.book_id {
            continue;
        }
        book_ids_in_connections.insert(insight_a.book_id);
        book_ids_in_connections.insert(insight_b.book_id);
        edges.push(KnowledgeMapEdge {
            source: insight_a.book_id,
            target: insight_b.book_id,
            strength: conn.strength,
            description: conn.description,
        });
    }

    let nodes = books
        .into_iter()
        .filter(|b| book_ids_in_connections.contains(&b.id))
        .map(|b| KnowledgeMapNode { id: b.id, title: b.title, author: b.author })
        .collect();

    Ok(KnowledgeMap { nodes, edges })
}
