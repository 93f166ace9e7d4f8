use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::McqResponse,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait McqResponseRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the student already answered this MCQ.
    async fn create(&self, response: McqResponse) -> AppResult<McqResponse>;
    async fn find_by_student_and_mcq(
        &self,
        student_id: &str,
        mcq_id: &str,
    ) -> AppResult<Option<McqResponse>>;
    /// Newest first.
    async fn list_by_student(&self, student_id: &str) -> AppResult<Vec<McqResponse>>;
}

pub struct MongoMcqResponseRepository {
    collection: Collection<McqResponse>,
}

impl MongoMcqResponseRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("mcq_responses");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for mcq_responses collection");

        let student_mcq_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "mcq_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("student_mcq_unique".to_string())
                    .build(),
            )
            .build();

        let student_recent_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "submitted_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("student_recent".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(student_mcq_index).await?;
        self.collection.create_index(student_recent_index).await?;

        log::info!("Successfully created indexes for mcq_responses collection");
        Ok(())
    }
}

#[async_trait]
impl McqResponseRepository for MongoMcqResponseRepository {
    async fn create(&self, response: McqResponse) -> AppResult<McqResponse> {
        self.collection.insert_one(&response).await.map_err(|e| {
            match AppError::from(e) {
                AppError::AlreadyExists(_) => AppError::AlreadyExists(
                    "You have already submitted an answer for this MCQ".to_string(),
                ),
                other => other,
            }
        })?;
        Ok(response)
    }

    async fn find_by_student_and_mcq(
        &self,
        student_id: &str,
        mcq_id: &str,
    ) -> AppResult<Option<McqResponse>> {
        let response = self
            .collection
            .find_one(doc! { "student_id": student_id, "mcq_id": mcq_id })
            .await?;
        Ok(response)
    }

    async fn list_by_student(&self, student_id: &str) -> AppResult<Vec<McqResponse>> {
        let options = FindOptions::builder()
            .sort(doc! { "submitted_at": -1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "student_id": student_id })
            .with_options(options)
            .await?;
        let items: Vec<McqResponse> = cursor.try_collect().await?;
        Ok(items)
    }
}
