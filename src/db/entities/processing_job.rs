use sea_orm::entity::prelude::*;
use serde::Serialize;

/// `(book_id, stage)` uniquely identifies one job row (spec §3). The
/// `pending|failed -> running` transition under row-lock in `jobs::claim`
/// is the sole serialization primitive (spec §4.B/§9).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "processing_job")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub stage: String,
    pub status: String,
    pub attempts: i32,
    pub error_message: Option<String>,
    pub started_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
    pub external_task_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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

impl ActiveModelBehavior for ActiveModel {}

pub mod stage {
    pub const EXTRACT: &str = "extract";
    pub const CHUNK: &str = "chunk";
    pub const EMBED: &str = "embed";
    pub const INSIGHTS_PASS_1: &str = "insights_pass_1";
    pub const INSIGHTS_PASS_2: &str = "insights_pass_2";
    pub const INSIGHTS_PASS_3: &str = "insights_pass_3";
    pub const ENRICHMENT: &str = "enrichment";
    pub const TOPIC: &str = "topic";

    pub fn insights_pass(level: i32) -> &'static str {
        match level {
            1 => INSIGHTS_PASS_1,
            2 => INSIGHTS_PASS_2,
            _ => INSIGHTS_PASS_3,
        }
    }
}

pub mod status {
    pub const PENDING: &str = "pending";
    pub const RUNNING: &str = "running";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    pub const SKIPPED: &str = "skipped";
}
