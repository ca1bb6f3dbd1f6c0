use sea_orm::entity::prelude::*;
use serde::Serialize;

/// `embedding` lives in `pgvector`, same caveat as `book_chunk::Model`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "book_insight")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub insight_type: String,
    pub title: String,
    pub content: String,
    pub supporting_quote: Option<String>,
    pub importance: i32,
    pub refinement_level: i32,
    pub has_embedding: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_delete = "Cascade"
    )]
    Book,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub mod insight_type {
    pub const KEY_CONCEPT: &str = "key_concept";
    pub const FRAMEWORK: &str = "framework";
    pub const TAKEAWAY: &str = "takeaway";
    pub const ARGUMENT: &str = "argument";
    pub const QUOTE: &str = "quote";
    pub const DEFINITION: &str = "definition";
}
