//! Entity definitions, one module per table. Re-exported here with a
//! `<Name><Entity|Column|Model|ActiveModel>` alias scheme so call sites can
//! glob-import this module without name collisions between entities.

pub mod book;
pub mod book_chunk;
pub mod book_file;
pub mod book_insight;
pub mod book_topic;
pub mod chat_message;
pub mod chat_session;
pub mod external_metadata;
pub mod feed_item;
pub mod insight_connection;
pub mod learning_path;
pub mod learning_path_book;
pub mod processing_job;
pub mod reading_progress;
pub mod reading_session;
pub mod topic;
pub mod topic_relation;

pub use book::{
    ActiveModel as BookActiveModel, Column as BookColumn, Entity as BookEntity, Model as Book,
};
pub use book_chunk::{
    ActiveModel as BookChunkActiveModel, Column as BookChunkColumn, Entity as BookChunkEntity,
    Model as BookChunk,
};
pub use book_file::{
    ActiveModel as BookFileActiveModel, Column as BookFileColumn, Entity as BookFileEntity,
    Model as BookFile,
};
pub use book_insight::{
    ActiveModel as BookInsightActiveModel, Column as BookInsightColumn,
    Entity as BookInsightEntity, Model as BookInsight,
};
pub use book_topic::{
    ActiveModel as BookTopicActiveModel, Column as BookTopicColumn, Entity as BookTopicEntity,
    Model as BookTopic,
};
pub use chat_message::{
    ActiveModel as ChatMessageActiveModel, Column as ChatMessageColumn,
    Entity as ChatMessageEntity, Model as ChatMessage,
};
pub use chat_session::{
    ActiveModel as ChatSessionActiveModel, Column as ChatSessionColumn,
    Entity as ChatSessionEntity, Model as ChatSession,
};
pub use external_metadata::{
    ActiveModel as ExternalMetadataActiveModel, Column as ExternalMetadataColumn,
    Entity as ExternalMetadataEntity, Model as ExternalMetadata,
};
pub use feed_item::{
    ActiveModel as FeedItemActiveModel, Column as FeedItemColumn, Entity as FeedItemEntity,
    Model as FeedItem,
};
pub use insight_connection::{
    ActiveModel as InsightConnectionActiveModel, Column as InsightConnectionColumn,
    Entity as InsightConnectionEntity, Model as InsightConnection,
};
pub use learning_path::{
    ActiveModel as LearningPathActiveModel, Column as LearningPathColumn,
    Entity as LearningPathEntity, Model as LearningPath,
};
pub use learning_path_book::{
    ActiveModel as LearningPathBookActiveModel, Column as LearningPathBookColumn,
    Entity as LearningPathBookEntity, Model as LearningPathBook,
};
pub use processing_job::{
    ActiveModel as ProcessingJobActiveModel, Column as ProcessingJobColumn,
    Entity as ProcessingJobEntity, Model as ProcessingJob,
};
pub use reading_progress::{
    ActiveModel as ReadingProgressActiveModel, Column as ReadingProgressColumn,
    Entity as ReadingProgressEntity, Model as ReadingProgress,
};
pub use reading_session::{
    ActiveModel as ReadingSessionActiveModel, Column as ReadingSessionColumn,
    Entity as ReadingSessionEntity, Model as ReadingSession,
};
pub use topic::{
    ActiveModel as TopicActiveModel, Column as TopicColumn, Entity as TopicEntity, Model as Topic,
};
pub use topic_relation::{
    ActiveModel as TopicRelationActiveModel, Column as TopicRelationColumn,
    Entity as TopicRelationEntity, Model as TopicRelation,
};
