#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tokio::sync::RwLock;

use neet_prep_server::{
    app_state::AppState,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        user::{normalize_email, to_bson_datetime},
        Mcq, McqResponse, Role, User,
    },
    repositories::{McqRepository, McqResponseRepository, UserRepository},
};

pub const INVITE_CODE: &str = "let-me-teach";

pub fn test_config() -> Config {
    Config {
        mongo_conn_string: "mongodb://localhost:27017".to_string(),
        mongo_db_name: "neet-prep-test".to_string(),
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        jwt_secret: SecretString::from("integration_test_secret".to_string()),
        jwt_expiration_hours: 1,
        password_hash_rounds: 1_000,
        session_cookie_name: "token".to_string(),
        production: false,
        educator_invite_code: Some(SecretString::from(INVITE_CODE.to_string())),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        submission_window_hours: 24,
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, user: User) -> User {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists(format!(
                "Email '{}' is already registered",
                user.email
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(description) = description {
            user.description = Some(description);
        }
        Ok(Some(user.clone()))
    }

    async fn claim_submission_slot(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };

        let eligible = match user.last_submission_at {
            None => true,
            Some(last) => last <= to_bson_datetime(cutoff),
        };
        if eligible {
            user.last_submission_at = Some(to_bson_datetime(now));
        }
        Ok(eligible)
    }

    async fn release_submission_slot(
        &self,
        user_id: &str,
        claimed_at: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(user_id) {
            if user.last_submission_at == Some(to_bson_datetime(claimed_at)) {
                user.last_submission_at = previous.map(to_bson_datetime);
            }
        }
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMcqRepository {
    mcqs: Arc<RwLock<HashMap<String, Mcq>>>,
    /// Makes every insert fail, to exercise claim rollback.
    pub fail_inserts: bool,
}

impl InMemoryMcqRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub async fn count(&self) -> usize {
        self.mcqs.read().await.len()
    }
}

#[async_trait]
impl McqRepository for InMemoryMcqRepository {
    async fn create(&self, mcq: Mcq) -> AppResult<Mcq> {
        if self.fail_inserts {
            return Err(AppError::DatabaseError("insert rejected".to_string()));
        }
        self.mcqs.write().await.insert(mcq.id.clone(), mcq.clone());
        Ok(mcq)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Mcq>> {
        Ok(self.mcqs.read().await.get(id).cloned())
    }

    async fn find_latest(&self) -> AppResult<Option<Mcq>> {
        Ok(self
            .mcqs
            .read()
            .await
            .values()
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    async fn list_by_creator(&self, user_id: &str) -> AppResult<Vec<Mcq>> {
        let mut items: Vec<Mcq> = self
            .mcqs
            .read()
            .await
            .values()
            .filter(|m| m.created_by == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_many(&self, ids: &[String]) -> AppResult<Vec<Mcq>> {
        let mcqs = self.mcqs.read().await;
        Ok(ids.iter().filter_map(|id| mcqs.get(id).cloned()).collect())
    }

    async fn set_video_link(
        &self,
        id: &str,
        video_link: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Mcq>> {
        let mut mcqs = self.mcqs.write().await;
        Ok(mcqs.get_mut(id).map(|mcq| {
            mcq.video_link = video_link;
            mcq.updated_at = to_bson_datetime(now);
            mcq.clone()
        }))
    }
}

#[derive(Default)]
pub struct InMemoryMcqResponseRepository {
    responses: Arc<RwLock<Vec<McqResponse>>>,
}

impl InMemoryMcqResponseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl McqResponseRepository for InMemoryMcqResponseRepository {
    async fn create(&self, response: McqResponse) -> AppResult<McqResponse> {
        let mut responses = self.responses.write().await;
        if responses
            .iter()
            .any(|r| r.student_id == response.student_id && r.mcq_id == response.mcq_id)
        {
            return Err(AppError::AlreadyExists(
                "You have already submitted an answer for this MCQ".to_string(),
            ));
        }
        responses.push(response.clone());
        Ok(response)
    }

    async fn find_by_student_and_mcq(
        &self,
        student_id: &str,
        mcq_id: &str,
    ) -> AppResult<Option<McqResponse>> {
        Ok(self
            .responses
            .read()
            .await
            .iter()
            .find(|r| r.student_id == student_id && r.mcq_id == mcq_id)
            .cloned())
    }

    async fn list_by_student(&self, student_id: &str) -> AppResult<Vec<McqResponse>> {
        let mut items: Vec<McqResponse> = self
            .responses
            .read()
            .await
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(items)
    }
}

/// App state over fresh in-memory repositories. The user repository is
/// returned too so tests can seed accounts and inspect stored timestamps.
pub fn in_memory_state() -> (AppState, Arc<InMemoryUserRepository>) {
    with_mcq_repository(Arc::new(InMemoryMcqRepository::new()))
}

pub fn with_mcq_repository(
    mcqs: Arc<InMemoryMcqRepository>,
) -> (AppState, Arc<InMemoryUserRepository>) {
    let users = Arc::new(InMemoryUserRepository::new());
    let state = AppState::from_parts(
        test_config(),
        users.clone(),
        mcqs,
        Arc::new(InMemoryMcqResponseRepository::new()),
    );
    (state, users)
}

pub fn user(name: &str, role: Role) -> User {
    User::new(
        name,
        &format!("{}@example.com", name),
        "not-a-real-hash",
        role,
    )
}

pub fn mcq_body() -> serde_json::Value {
    serde_json::json!({
        "subject": "Biology",
        "chapter": "Human physiology",
        "topic": "Blood",
        "question": "Which cells carry oxygen?",
        "options": ["Platelets", "Red blood cells", "White blood cells", "Plasma cells"],
        "correct_answer": "Red blood cells",
    })
}
