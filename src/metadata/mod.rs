//! Opaque external book-metadata capability: `lookup(title, author) ->
//! metadata` (spec §1). Grounded on the original's Google Books
//! integration in `celery_app/tasks/enrichment_tasks.py`; the exact
//! provider is an implementation detail behind this trait.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BookMetadata {
    pub description: Option<String>,
    pub isbn_13: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i32>,
    pub rating: Option<f32>,
    pub thumbnail_url: Option<String>,
    pub raw: serde_json::Value,
}

#[async_trait::async_trait]
pub trait MetadataClient: Send + Sync {
    /// Returns `None` when the provider has no match; absence is not an error.
    async fn lookup(&self, title: &str, author: Option<&str>) -> anyhow::Result<Option<BookMetadata>>;
}

pub struct GoogleBooksClient {
    http: reqwest::Client,
}

impl Default for GoogleBooksClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleBooksClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("reqwest client"),
        }
    }
}

#[derive(Deserialize)]
struct VolumesResponse {
    items: Option<Vec<Volume>>,
}

#[derive(Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Deserialize)]
struct VolumeInfo {
    description: Option<String>,
    publisher: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
    #[serde(rename = "pageCount")]
    page_count: Option<i32>,
    #[serde(rename = "averageRating")]
    average_rating: Option<f32>,
    #[serde(rename = "industryIdentifiers", default)]
    industry_identifiers: Vec<IndustryIdentifier>,
    #[serde(rename = "imageLinks")]
    image_links: Option<ImageLinks>,
}

#[derive(Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

#[derive(Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

#[async_trait::async_trait]
impl MetadataClient for GoogleBooksClient {
    async fn lookup(&self, title: &str, author: Option<&str>) -> anyhow::Result<Option<BookMetadata>> {
        let mut q = title.to_string();
        if let Some(a) = author {
            q.push_str(&format!("+inauthor:{a}"));
        }

        let resp = self
            .http
            .get("https://www.googleapis.com/books/v1/volumes")
            .query(&[("q", q.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<VolumesResponse>()
            .await?;

        let Some(volume) = resp.items.and_then(|items| items.into_iter().next()) else {
            return Ok(None);
        };
        let info = volume.volume_info;
        let raw = serde_json::json!({ "source": "google_books" });

        Ok(Some(BookMetadata {
            description: info.description,
            isbn_13: info
                .industry_identifiers
                .into_iter()
                .find(|i| i.kind == "ISBN_13")
                .map(|i| i.identifier),
            publisher: info.publisher,
            published_date: info.published_date,
            page_count: info.page_count,
            rating: info.average_rating,
            thumbnail_url: info.image_links.and_then(|l| l.thumbnail),
            raw,
        }))
    }
}

#[cfg(test)]
pub mod fakes {
    use super::*;

    pub struct FakeMetadataClient {
        pub result: Option<BookMetadata>,
    }

    #[async_trait::async_trait]
    impl MetadataClient for FakeMetadataClient {
        async fn lookup(&self, _title: &str, _author: Option<&str>) -> anyhow::Result<Option<BookMetadata>> {
            Ok(self.result.clone())
        }
    }
}
