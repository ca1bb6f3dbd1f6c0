use sea_orm::entity::prelude::*;
use serde::Serialize;

/// `embedding` is a `pgvector` column and has no native sea-orm type; it is
/// read/written through raw `Statement::from_sql_and_values` calls in
/// `retrieval`/`pipeline::embed_stage`, never through this `Model`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "book_chunk")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub chunk_index: i32,
    pub content: String,
    pub page_number: Option<i32>,
    pub chapter: Option<String>,
    pub token_count: i32,
    pub has_embedding: bool,
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
