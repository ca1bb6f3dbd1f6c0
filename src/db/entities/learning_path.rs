use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Supplemented from the original's `app/models/knowledge.py` (SPEC_FULL §B.1):
/// spec.md's §6 endpoint list names `/knowledge/learning-paths` but §3 never
/// defines the backing rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "learning_path")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::learning_path_book::Entity")]
    LearningPathBook,
}

impl Related<super::learning_path_book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LearningPathBook.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
