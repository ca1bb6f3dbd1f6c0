use sea_orm::entity::prelude::*;
use serde::Serialize;

/// `(insight_a_id, insight_b_id)` with `a < b` by id (spec §3). No executor
/// writes these rows (§9 Open Question, resolved read-only per SPEC_FULL §B.4).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "insight_connection")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub insight_a_id: i32,
    pub insight_b_id: i32,
    pub connection_type: String,
    pub strength: f32,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
