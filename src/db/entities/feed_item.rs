use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "feed_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_type: String,
    pub title: String,
    pub content: String,
    /// Book ids this item references, stored as JSON array of i32.
    pub book_ids: Json,
    pub metadata_json: Option<Json>,
    pub is_read: bool,
    pub is_pinned: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub mod item_type {
    pub const TIL: &str = "til";
    pub const CONNECTION: &str = "connection";
    pub const QUOTE: &str = "quote";
    pub const CONCEPT: &str = "concept";
    pub const RECOMMENDATION: &str = "recommendation";
    pub const MILESTONE: &str = "milestone";
    pub const DAILY_DIGEST: &str = "daily_digest";
}
