use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "topic_relation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub topic_a_id: i32,
    pub topic_b_id: i32,
    pub strength: f32,
    pub relation_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
