use std::sync::Arc;

use crate::{
    auth::{JwtService, PasswordService},
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        McqRepository, McqResponseRepository, MongoMcqRepository, MongoMcqResponseRepository,
        MongoUserRepository, UserRepository,
    },
    services::{
        account_service::AccountService, mcq_service::McqService,
        submission_gate::SubmissionWindow,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt_service: Arc<JwtService>,
    pub user_repository: Arc<dyn UserRepository>,
    pub account_service: Arc<AccountService>,
    pub mcq_service: Arc<McqService>,
    /// `None` when running on in-memory repositories.
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let user_repository = Arc::new(MongoUserRepository::new(&db));
        user_repository.ensure_indexes().await?;

        let mcq_repository = Arc::new(MongoMcqRepository::new(&db));
        mcq_repository.ensure_indexes().await?;

        let response_repository = Arc::new(MongoMcqResponseRepository::new(&db));
        response_repository.ensure_indexes().await?;

        let mut state = Self::from_parts(
            config,
            user_repository,
            mcq_repository,
            response_repository,
        );
        state.db = Some(db);
        Ok(state)
    }

    /// Wires services over arbitrary repository implementations.
    pub fn from_parts(
        config: Config,
        user_repository: Arc<dyn UserRepository>,
        mcq_repository: Arc<dyn McqRepository>,
        response_repository: Arc<dyn McqResponseRepository>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        let account_service = Arc::new(AccountService::new(
            user_repository.clone(),
            PasswordService::new(config.password_hash_rounds),
            config.educator_invite_code.clone(),
        ));

        let mcq_service = Arc::new(McqService::new(
            user_repository.clone(),
            mcq_repository,
            response_repository,
            SubmissionWindow::hours(config.submission_window_hours),
        ));

        Self {
            config: Arc::new(config),
            jwt_service,
            user_repository,
            account_service,
            mcq_service,
            db: None,
        }
    }
}
