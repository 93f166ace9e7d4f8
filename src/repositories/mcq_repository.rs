use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOneOptions, FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{user::to_bson_datetime, Mcq},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait McqRepository: Send + Sync {
    async fn create(&self, mcq: Mcq) -> AppResult<Mcq>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Mcq>>;
    /// The most recently authored MCQ, i.e. today's.
    async fn find_latest(&self) -> AppResult<Option<Mcq>>;
    async fn list_by_creator(&self, user_id: &str) -> AppResult<Vec<Mcq>>;
    async fn find_many(&self, ids: &[String]) -> AppResult<Vec<Mcq>>;
    /// `None` clears the link. Returns the updated MCQ, or `None` if missing.
    async fn set_video_link(
        &self,
        id: &str,
        video_link: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Mcq>>;
}

pub struct MongoMcqRepository {
    collection: Collection<Mcq>,
}

impl MongoMcqRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("mcqs");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for mcqs collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let creator_index = IndexModel::builder()
            .keys(doc! { "created_by": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("creator_recent".to_string())
                    .build(),
            )
            .build();

        let recent_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder().name("recent".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(creator_index).await?;
        self.collection.create_index(recent_index).await?;

        log::info!("Successfully created indexes for mcqs collection");
        Ok(())
    }
}

#[async_trait]
impl McqRepository for MongoMcqRepository {
    async fn create(&self, mcq: Mcq) -> AppResult<Mcq> {
        self.collection.insert_one(&mcq).await?;
        Ok(mcq)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Mcq>> {
        let mcq = self.collection.find_one(doc! { "id": id }).await?;
        Ok(mcq)
    }

    async fn find_latest(&self) -> AppResult<Option<Mcq>> {
        let options = FindOneOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let mcq = self
            .collection
            .find_one(doc! {})
            .with_options(options)
            .await?;
        Ok(mcq)
    }

    async fn list_by_creator(&self, user_id: &str) -> AppResult<Vec<Mcq>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "created_by": user_id })
            .with_options(options)
            .await?;
        let items: Vec<Mcq> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn find_many(&self, ids: &[String]) -> AppResult<Vec<Mcq>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?;
        let items: Vec<Mcq> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn set_video_link(
        &self,
        id: &str,
        video_link: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Mcq>> {
        let update = doc! {
            "$set": {
                "video_link": video_link,
                "updated_at": to_bson_datetime(now),
            }
        };

        let mcq = self
            .collection
            .find_one_and_update(doc! { "id": id }, update)
            .return_document(mongodb::options::ReturnDocument::After)
            .await?;
        Ok(mcq)
    }
}
