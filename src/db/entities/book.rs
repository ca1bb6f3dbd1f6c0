use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "book")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub language: Option<String>,
    pub page_count: Option<i32>,
    #[sea_orm(unique)]
    pub file_hash: String,
    pub cover_path: Option<String>,
    pub processing_status: String,
    pub processing_progress: i32,
    pub rating: Option<f32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_file::Entity")]
    BookFile,
    #[sea_orm(has_many = "super::book_chunk::Entity")]
    BookChunk,
    #[sea_orm(has_many = "super::book_insight::Entity")]
    BookInsight,
    #[sea_orm(has_many = "super::processing_job::Entity")]
    ProcessingJob,
    #[sea_orm(has_many = "super::reading_progress::Entity")]
    ReadingProgress,
    #[sea_orm(has_many = "super::external_metadata::Entity")]
    ExternalMetadata,
}

impl Related<super::book_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookFile.def()
    }
}

impl Related<super::book_chunk::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookChunk.def()
    }
}

impl Related<super::book_insight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookInsight.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Processing status values, in the monotone order stage executors advance
/// `Book.processing_status` through (spec §3/§8 Testable Property 2).
pub mod status {
    pub const PENDING: &str = "pending";
    pub const EXTRACTING: &str = "extracting";
    pub const CHUNKING: &str = "chunking";
    pub const EMBEDDING: &str = "embedding";
    pub const GENERATING_INSIGHTS: &str = "generating_insights";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}
