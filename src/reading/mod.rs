//! Reading progress and session tracking (SPEC_FULL §B.6, grounded on
//! `reading_service.py`): per-book progress CRUD with derived percent/status,
//! plus start/end session bookkeeping that rolls into total read time.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set, TryIntoModel};

use crate::db::entities::*;

const COMPLETION_THRESHOLD: f32 = 95.0;

#[derive(serde::Serialize)]
pub struct ReadingStats {
    pub total_read_time_seconds: i64,
    pub total_read_time_hours: f64,
    pub books_completed: u64,
    pub books_reading: u64,
}

pub async fn get_reading_progress(db: &DatabaseConnection, book_id: i32) -> anyhow::Result<Option<ReadingProgress>> {
    Ok(ReadingProgressEntity::find()
        .filter(ReadingProgressColumn::BookId.eq(book_id))
        .one(db)
        .await?)
}

pub async fn update_reading_progress(
    db: &DatabaseConnection,
    book_id: i32,
    current_page: Option<i32>,
    total_pages: Option<i32>,
    epub_cfi: Option<String>,
) -> anyhow::Result<ReadingProgress> {
    let existing = get_reading_progress(db, book_id).await?;

    let mut active: ReadingProgressActiveModel = match existing {
        Some(row) => row.into(),
        None => ReadingProgressActiveModel {
            book_id: Set(book_id),
            current_page: Set(0),
            total_pages: Set(0),
            progress_percent: Set(0.0),
            status: Set(reading_progress::status::UNREAD.to_string()),
            total_read_time: Set(0),
            ..Default::default()
        },
    };

    if let Some(page) = current_page {
        active.current_page = Set(page);
    }
    if let Some(total) = total_pages {
        active.total_pages = Set(total);
    }
    if let Some(cfi) = epub_cfi {
        active.epub_cfi = Set(Some(cfi));
    }

    let current = *active.current_page.as_ref();
    let total = *active.total_pages.as_ref();
    if let Some(percent) = progress_percent(current, total) {
        active.progress_percent = Set(percent);
        if let Some(status) = derive_status(percent, current) {
            active.status = Set(status.to_string());
        }
    }

    active.last_read_at = Set(Some(chrono::Utc::now().into()));

    Ok(sea_orm::ActiveModelTrait::save(active, db).await?.try_into_model()?)
}

fn progress_percent(current_page: i32, total_pages: i32) -> Option<f32> {
    if total_pages > 0 {
        Some((current_page as f32 / total_pages as f32) * 100.0)
    } else {
        None
    }
}

fn derive_status(percent: f32, current_page: i32) -> Option<&'static str> {
    if percent >= COMPLETION_THRESHOLD {
        Some(reading_progress::status::COMPLETED)
    } else if current_page > 0 {
        Some(reading_progress::status::READING)
    } else {
        None
    }
}

pub async fn start_reading_session(db: &DatabaseConnection, book_id: i32) -> anyhow::Result<ReadingSession> {
    Ok(sea_orm::ActiveModelTrait::insert(
        ReadingSessionActiveModel {
            book_id: Set(book_id),
            started_at: Set(chrono::Utc::now().into()),
            pages_read: Set(0),
            ..Default::default()
        },
        db,
    )
    .await?)
}

pub async fn end_reading_session(
    db: &DatabaseConnection,
    session_id: i32,
    pages_read: i32,
) -> anyhow::Result<Option<ReadingSession>> {
    let Some(session) = ReadingSessionEntity::find_by_id(session_id).one(db).await? else {
        return Ok(None);
    };

    let started_at = session.started_at;
    let book_id = session.book_id;
    let ended_at = chrono::Utc::now();
    let duration = (ended_at - started_at).num_seconds() as i32;

    let mut active: ReadingSessionActiveModel = session.into();
    active.ended_at = Set(Some(ended_at.into()));
    active.pages_read = Set(pages_read);
    active.duration = Set(Some(duration));
    let saved = sea_orm::ActiveModelTrait::update(active, db).await?;

    if let Some(progress) = get_reading_progress(db, book_id).await? {
        let mut progress_active: ReadingProgressActiveModel = progress.clone().into();
        progress_active.total_read_time = Set(progress.total_read_time + duration);
        sea_orm::ActiveModelTrait::update(progress_active, db).await?;
    }

    Ok(Some(saved))
}

pub async fn get_reading_stats(db: &DatabaseConnection) -> anyhow::Result<ReadingStats> {
    let all_progress = ReadingProgressEntity::find().all(db).await?;
    let total_read_time: i64 = all_progress.iter().map(|p| p.total_read_time as i64).sum();

    let books_completed = ReadingProgressEntity::find()
        .filter(ReadingProgressColumn::Status.eq(reading_progress::status::COMPLETED))
        .count(db)
        .await?;
    let books_reading = ReadingProgressEntity::find()
        .filter(ReadingProgressColumn::Status.eq(reading_progress::status::READING))
        .count(db)
        .await?;

    Ok(ReadingStats {
        total_read_time_seconds: total_read_time,
        total_read_time_hours: (total_read_time as f64 / 3600.0 * 10.0).round() / 10.0,
        books_completed,
        books_reading,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_total_pages_means_no_percent() {
        assert_eq!(progress_percent(0, 0), None);
    }

    #[test]
    fn percent_is_current_over_total() {
        assert_eq!(progress_percent(50, 200), Some(25.0));
    }

    #[test]
    fn below_threshold_with_progress_is_reading() {
        assert_eq!(derive_status(25.0, 50), Some(reading_progress::status::READING));
    }

    #[test]
    fn at_threshold_is_completed() {
        assert_eq!(derive_status(95.0, 190), Some(reading_progress::status::COMPLETED));
    }

    #[test]
    fn zero_pages_read_leaves_status_untouched() {
        assert_eq!(derive_status(0.0, 0), None);
    }
}
