use sea_orm::entity::prelude::*;
use serde::Serialize;

/// `centroid_embedding` lives in `pgvector`, same caveat as `book_chunk::Model`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "topic")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub keywords: Option<String>,
    pub has_embedding: bool,
    pub book_count: i32,
    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_topic::Entity")]
    BookTopic,
}

impl Related<super::book_topic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookTopic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
