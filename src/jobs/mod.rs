//! Job Store: the durable primitive every stage executor and the
//! orchestrator dispatch loop go through. `claim` is the only place a
//! `pending|failed -> running` transition happens, serialized by
//! row-level locking so concurrent claims resolve to exactly one winner
//! (spec §4.B).

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::sea_query::LockType;

use crate::db::entities::*;

/// Creates a pending job for `(book_id, stage)` unless one already exists.
pub async fn enqueue(db: &DatabaseConnection, book_id: i32, stage: &str) -> anyhow::Result<ProcessingJob> {
    let existing = ProcessingJobEntity::find()
        .filter(ProcessingJobColumn::BookId.eq(book_id))
        .filter(ProcessingJobColumn::Stage.eq(stage))
        .one(db)
        .await?;

    if let Some(job) = existing {
        return Ok(job);
    }

    let now = chrono::Utc::now();
    let job = ProcessingJobActiveModel {
        book_id: Set(book_id),
        stage: Set(stage.to_string()),
        status: Set(processing_job::status::PENDING.to_string()),
        attempts: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(sea_orm::ActiveModelTrait::insert(job, db).await?)
}

/// Claims the oldest pending-or-failed job for `stage`, transitioning it to
/// `running` under `FOR UPDATE SKIP LOCKED` so at most one worker wins the
/// race against concurrent claimants. The transition itself is the only
/// operation serialized by row-lock; the transaction commits before this
/// returns, so the stage's own work runs outside of it. Creates the job
/// row first if this is the first time `stage` is dispatched for `book_id`.
/// Idempotent: if the job is already `running` (e.g. a prior worker crashed
/// mid-stage and left the row `running`), returns that existing row rather
/// than `None`, so the resuming executor re-runs the stage (spec §4.B).
pub async fn claim(
    db: &DatabaseConnection,
    book_id: i32,
    stage: &str,
    external_id: Option<&str>,
) -> anyhow::Result<Option<ProcessingJob>> {
    enqueue(db, book_id, stage).await?;

    let txn = db.begin().await?;

    let candidate = ProcessingJobEntity::find()
        .filter(ProcessingJobColumn::BookId.eq(book_id))
        .filter(ProcessingJobColumn::Stage.eq(stage))
        .filter(
            ProcessingJobColumn::Status
                .eq(processing_job::status::PENDING)
                .or(ProcessingJobColumn::Status.eq(processing_job::status::FAILED)),
        )
        .lock_with_behavior(LockType::Update, sea_orm::sea_query::LockBehavior::SkipLocked)
        .one(&txn)
        .await?;

    let Some(candidate) = candidate else {
        txn.rollback().await?;
        let running = ProcessingJobEntity::find()
            .filter(ProcessingJobColumn::BookId.eq(book_id))
            .filter(ProcessingJobColumn::Stage.eq(stage))
            .filter(ProcessingJobColumn::Status.eq(processing_job::status::RUNNING))
            .one(db)
            .await?;
        return Ok(running);
    };

    let now = chrono::Utc::now();
    let attempts = candidate.attempts;
    let mut active: ProcessingJobActiveModel = candidate.into();
    active.status = Set(processing_job::status::RUNNING.to_string());
    active.attempts = Set(attempts + 1);
    active.started_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    active.external_task_id = Set(external_id.map(str::to_string));

    let updated = sea_orm::ActiveModelTrait::update(active, &txn).await?;
    txn.commit().await?;

    Ok(Some(updated))
}

/// Terminal transition for a previously claimed job.
pub async fn mark(
    db: &DatabaseConnection,
    job: &ProcessingJob,
    status: &str,
    error: Option<String>,
) -> Result<(), DbErr> {
    let now = chrono::Utc::now();
    let mut active: ProcessingJobActiveModel = job.clone().into();
    active.status = Set(status.to_string());
    active.error_message = Set(error);
    active.updated_at = Set(now.into());
    if status == processing_job::status::COMPLETED
        || status == processing_job::status::FAILED
        || status == processing_job::status::SKIPPED
    {
        active.completed_at = Set(Some(now.into()));
    }
    sea_orm::ActiveModelTrait::update(active, db).await?;
    Ok(())
}

/// Lists every pending job for `stage`, oldest first.
pub async fn pending(db: &DatabaseConnection, stage: &str) -> Result<Vec<ProcessingJob>, DbErr> {
    ProcessingJobEntity::find()
        .filter(ProcessingJobColumn::Stage.eq(stage))
        .filter(ProcessingJobColumn::Status.eq(processing_job::status::PENDING))
        .order_by_asc(ProcessingJobColumn::CreatedAt)
        .all(db)
        .await
}

/// Counts jobs per `(stage, status)`, the shape the orchestrator's priority
/// scan reads on every tick (spec §4.A).
pub async fn group_by_status(db: &DatabaseConnection) -> Result<HashMap<(String, String), u64>, DbErr> {
    let jobs = ProcessingJobEntity::find().all(db).await?;
    let mut counts = HashMap::new();
    for job in jobs {
        *counts.entry((job.stage, job.status)).or_insert(0) += 1;
    }
    Ok(counts)
}
