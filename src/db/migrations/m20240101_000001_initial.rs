use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Full schema for the data model in spec §3, applied as raw SQL rather
/// than through the schema-builder DSL: `pgvector` columns, generated
/// `tsvector` columns and their triggers, and the HNSW index
/// (`m=16, ef_construction=64`, cosine ops — spec §6) are Postgres-specific
/// features the builder doesn't model.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS vector").await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE book (
                id SERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT,
                isbn TEXT,
                description TEXT,
                publisher TEXT,
                published_date TEXT,
                language TEXT,
                page_count INTEGER,
                file_hash TEXT NOT NULL UNIQUE,
                cover_path TEXT,
                processing_status TEXT NOT NULL DEFAULT 'pending',
                processing_progress INTEGER NOT NULL DEFAULT 0,
                rating REAL,
                search_vector tsvector,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            CREATE INDEX book_search_vector_idx ON book USING GIN (search_vector);
            CREATE INDEX book_processing_status_idx ON book (processing_status);
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE book_file (
                id SERIAL PRIMARY KEY,
                book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
                file_path TEXT NOT NULL UNIQUE,
                file_type TEXT NOT NULL,
                file_size BIGINT NOT NULL
            );
            "#,
        )
        .await?;

        db.execute_unprepared(&format!(
            r#"
            CREATE TABLE book_chunk (
                id SERIAL PRIMARY KEY,
                book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                page_number INTEGER,
                chapter TEXT,
                token_count INTEGER NOT NULL,
                embedding vector({dim}),
                has_embedding BOOLEAN NOT NULL DEFAULT false,
                search_vector tsvector GENERATED ALWAYS AS (to_tsvector('english', content)) STORED,
                UNIQUE (book_id, chunk_index)
            );
            CREATE INDEX book_chunk_search_vector_idx ON book_chunk USING GIN (search_vector);
            CREATE INDEX book_chunk_embedding_idx ON book_chunk
                USING hnsw (embedding vector_cosine_ops) WITH (m = 16, ef_construction = 64);
            "#,
            dim = DEFAULT_EMBEDDING_DIM
        ))
        .await?;

        db.execute_unprepared(&format!(
            r#"
            CREATE TABLE book_insight (
                id SERIAL PRIMARY KEY,
                book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
                insight_type TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                supporting_quote TEXT,
                importance INTEGER NOT NULL DEFAULT 5,
                refinement_level INTEGER NOT NULL DEFAULT 1,
                embedding vector({dim}),
                has_embedding BOOLEAN NOT NULL DEFAULT false,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            CREATE INDEX book_insight_embedding_idx ON book_insight
                USING hnsw (embedding vector_cosine_ops) WITH (m = 16, ef_construction = 64);
            CREATE INDEX book_insight_book_id_idx ON book_insight (book_id);
            "#,
            dim = DEFAULT_EMBEDDING_DIM
        ))
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE insight_connection (
                id SERIAL PRIMARY KEY,
                insight_a_id INTEGER NOT NULL REFERENCES book_insight(id) ON DELETE CASCADE,
                insight_b_id INTEGER NOT NULL REFERENCES book_insight(id) ON DELETE CASCADE,
                connection_type TEXT NOT NULL,
                strength REAL NOT NULL,
                description TEXT,
                CHECK (insight_a_id < insight_b_id)
            );
            "#,
        )
        .await?;

        db.execute_unprepared(&format!(
            r#"
            CREATE TABLE topic (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                keywords TEXT,
                centroid_embedding vector({dim}),
                has_embedding BOOLEAN NOT NULL DEFAULT false,
                book_count INTEGER NOT NULL DEFAULT 0,
                color TEXT NOT NULL
            );
            "#,
            dim = DEFAULT_EMBEDDING_DIM
        ))
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE book_topic (
                id SERIAL PRIMARY KEY,
                book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
                topic_id INTEGER NOT NULL REFERENCES topic(id) ON DELETE CASCADE,
                relevance REAL NOT NULL,
                UNIQUE (book_id, topic_id)
            );

            CREATE TABLE topic_relation (
                id SERIAL PRIMARY KEY,
                topic_a_id INTEGER NOT NULL REFERENCES topic(id) ON DELETE CASCADE,
                topic_b_id INTEGER NOT NULL REFERENCES topic(id) ON DELETE CASCADE,
                strength REAL NOT NULL,
                relation_type TEXT NOT NULL
            );
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE processing_job (
                id SERIAL PRIMARY KEY,
                book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
                stage TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                attempts INTEGER NOT NULL DEFAULT 0,
                error_message TEXT,
                started_at TIMESTAMPTZ,
                completed_at TIMESTAMPTZ,
                external_task_id TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                UNIQUE (book_id, stage)
            );
            CREATE INDEX processing_job_status_idx ON processing_job (stage, status);
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE feed_item (
                id SERIAL PRIMARY KEY,
                item_type TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                book_ids JSONB NOT NULL DEFAULT '[]',
                metadata_json JSONB,
                is_read BOOLEAN NOT NULL DEFAULT false,
                is_pinned BOOLEAN NOT NULL DEFAULT false,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE chat_session (
                id SERIAL PRIMARY KEY,
                title TEXT,
                book_ids JSONB NOT NULL DEFAULT '[]',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE TABLE chat_message (
                id SERIAL PRIMARY KEY,
                session_id INTEGER NOT NULL REFERENCES chat_session(id) ON DELETE CASCADE,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                source_chunks JSONB NOT NULL DEFAULT '[]',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            CREATE INDEX chat_message_session_idx ON chat_message (session_id, created_at);
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE reading_progress (
                id SERIAL PRIMARY KEY,
                book_id INTEGER NOT NULL UNIQUE REFERENCES book(id) ON DELETE CASCADE,
                current_page INTEGER NOT NULL DEFAULT 0,
                total_pages INTEGER NOT NULL DEFAULT 0,
                epub_cfi TEXT,
                progress_percent REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'unread',
                total_read_time INTEGER NOT NULL DEFAULT 0,
                last_read_at TIMESTAMPTZ
            );

            CREATE TABLE reading_session (
                id SERIAL PRIMARY KEY,
                book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
                started_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                ended_at TIMESTAMPTZ,
                pages_read INTEGER NOT NULL DEFAULT 0,
                duration INTEGER
            );
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE external_metadata (
                id SERIAL PRIMARY KEY,
                book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
                raw_payload JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE learning_path (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE TABLE learning_path_book (
                id SERIAL PRIMARY KEY,
                path_id INTEGER NOT NULL REFERENCES learning_path(id) ON DELETE CASCADE,
                book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                rationale TEXT
            );
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r#"
            DROP TABLE IF EXISTS learning_path_book, learning_path, external_metadata,
                reading_session, reading_progress, chat_message, chat_session, feed_item,
                processing_job, topic_relation, book_topic, topic, insight_connection,
                book_insight, book_chunk, book_file, book CASCADE;
            "#,
        )
        .await?;
        Ok(())
    }
}

const DEFAULT_EMBEDDING_DIM: i32 = 384;
