use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{
        user::{normalize_email, to_bson_datetime},
        User,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Overwrites only the fields given. Returns the updated account, or
    /// `None` if it does not exist.
    async fn update_profile(
        &self,
        id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Option<User>>;

    /// Sets `last_submission_at = now` only if the stored value is absent or
    /// not later than `cutoff`, as one conditional write. `false` means another
    /// submission holds the window (or the user is gone).
    async fn claim_submission_slot(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Undoes a claim whose submission failed to persist, provided nothing
    /// has overwritten the claimed timestamp since.
    async fn release_submission_slot(
        &self,
        user_id: &str,
        claimed_at: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("users");
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        self.collection.insert_one(&user).await.map_err(|e| {
            match AppError::from(e) {
                AppError::AlreadyExists(_) => {
                    AppError::AlreadyExists(format!("Email '{}' is already registered", user.email))
                }
                other => other,
            }
        })?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "email": normalize_email(email) })
            .await?;
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Option<User>> {
        let mut fields = Document::new();
        if let Some(name) = name {
            fields.insert("name", name);
        }
        if let Some(description) = description {
            fields.insert("description", description);
        }

        if fields.is_empty() {
            return self.find_by_id(id).await;
        }

        let user = self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(user)
    }

    async fn claim_submission_slot(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> AppResult<bool> {
        // `null` also matches documents where the field was never written.
        let filter = doc! {
            "id": user_id,
            "$or": [
                { "last_submission_at": null },
                { "last_submission_at": { "$lte": to_bson_datetime(cutoff) } },
            ],
        };
        let update = doc! { "$set": { "last_submission_at": to_bson_datetime(now) } };

        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count == 1)
    }

    async fn release_submission_slot(
        &self,
        user_id: &str,
        claimed_at: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let filter = doc! {
            "id": user_id,
            "last_submission_at": to_bson_datetime(claimed_at),
        };
        let update = doc! { "$set": { "last_submission_at": previous.map(to_bson_datetime) } };

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            log::warn!("Submission slot for user {} changed before it could be released", user_id);
        }
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(email_index).await?;
        log::info!("Created unique indexes on users.id and users.email");

        Ok(())
    }
}
