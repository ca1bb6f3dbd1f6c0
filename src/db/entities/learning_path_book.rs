use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "learning_path_book")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub path_id: i32,
    pub book_id: i32,
    pub position: i32,
    pub rationale: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::learning_path::Entity",
        from = "Column::PathId",
        to = "super::learning_path::Column::Id",
        on_delete = "Cascade"
    )]
    LearningPath,
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_delete = "Cascade"
    )]
    Book,
}

impl ActiveModelBehavior for ActiveModel {}
