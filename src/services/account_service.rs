use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use validator::Validate;

use crate::{
    auth::PasswordService,
    errors::{AppError, AppResult},
    models::{
        domain::{Role, User},
        dto::request::{LoginRequest, SignupRequest, UpdateProfileRequest},
    },
    repositories::UserRepository,
};

pub struct AccountService {
    repository: Arc<dyn UserRepository>,
    passwords: PasswordService,
    educator_invite_code: Option<SecretString>,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        passwords: PasswordService,
        educator_invite_code: Option<SecretString>,
    ) -> Self {
        Self {
            repository,
            passwords,
            educator_invite_code,
        }
    }

    /// Role is fixed here for the life of the account.
    pub async fn signup(&self, request: SignupRequest) -> AppResult<User> {
        request.validate()?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("name is required".to_string()));
        }

        let role = request.role.unwrap_or_default();
        if role == Role::Educator {
            self.check_invite_code(request.invite_code.as_deref())?;
        }

        if self.repository.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::AlreadyExists("Email already exists".to_string()));
        }

        let password_hash = self.passwords.hash(&request.password)?;
        let user = User::new(name, &request.email, &password_hash, role);
        let user = self.repository.create(user).await?;

        log::info!("Created {} account {}", user.role, user.id);
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<User> {
        request.validate()?;

        let invalid = || AppError::Unauthenticated("invalid email or password".to_string());

        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;

        if !self.passwords.verify(&request.password, &user.password_hash) {
            log::debug!("Password mismatch for account {}", user.id);
            return Err(invalid());
        }

        Ok(user)
    }

    pub async fn profile(&self, user_id: &str) -> AppResult<User> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> AppResult<User> {
        request.validate()?;

        let name = match request.name.as_deref().map(str::trim) {
            Some("") => return Err(AppError::ValidationError("name is required".to_string())),
            other => other.map(str::to_string),
        };
        let description = request.description.map(|d| d.trim().to_string());

        let user = self
            .repository
            .update_profile(user_id, name, description)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        log::info!("Updated profile of {}", user.id);
        Ok(user)
    }

    fn check_invite_code(&self, supplied: Option<&str>) -> AppResult<()> {
        let Some(expected) = &self.educator_invite_code else {
            return Err(AppError::InternalError(
                "Educator signup is not configured".to_string(),
            ));
        };

        match supplied {
            Some(code) if code == expected.expose_secret() => Ok(()),
            _ => Err(AppError::Forbidden(
                "Not authorized to sign up as educator".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;

    fn signup_request(role: Option<Role>, invite_code: Option<&str>) -> SignupRequest {
        SignupRequest {
            name: "Asha Rao".to_string(),
            email: "Asha@Example.com".to_string(),
            password: "long enough secret".to_string(),
            role,
            invite_code: invite_code.map(str::to_string),
        }
    }

    fn service(repository: MockUserRepository) -> AccountService {
        AccountService::new(
            Arc::new(repository),
            PasswordService::new(1_000),
            Some(SecretString::from("let-me-teach".to_string())),
        )
    }

    #[actix_web::test]
    async fn test_signup_defaults_to_student_and_hashes() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));
        repository.expect_create().times(1).returning(|user| Ok(user));

        let user = service(repository).signup(signup_request(None, None)).await.unwrap();

        assert_eq!(user.role, Role::Student);
        assert_eq!(user.email, "asha@example.com");
        assert_ne!(user.password_hash, "long enough secret");
        assert!(user.last_submission_at.is_none());
    }

    #[actix_web::test]
    async fn test_educator_signup_requires_invite_code() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));
        repository.expect_create().times(1).returning(|user| Ok(user));
        let service = service(repository);

        let wrong = service
            .signup(signup_request(Some(Role::Educator), Some("guess")))
            .await;
        assert!(matches!(wrong, Err(AppError::Forbidden(_))));

        let missing = service.signup(signup_request(Some(Role::Educator), None)).await;
        assert!(matches!(missing, Err(AppError::Forbidden(_))));

        let user = service
            .signup(signup_request(Some(Role::Educator), Some("let-me-teach")))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Educator);
    }

    #[actix_web::test]
    async fn test_educator_signup_unconfigured() {
        let mut repository = MockUserRepository::new();
        repository.expect_create().never();
        let service = AccountService::new(Arc::new(repository), PasswordService::new(1_000), None);

        let result = service
            .signup(signup_request(Some(Role::Educator), Some("anything")))
            .await;
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }

    #[actix_web::test]
    async fn test_signup_duplicate_email() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Ok(Some(User::test_student("asha"))));
        repository.expect_create().never();

        let result = service(repository).signup(signup_request(None, None)).await;
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[actix_web::test]
    async fn test_login_checks_password() {
        let passwords = PasswordService::new(1_000);
        let mut stored = User::test_student("asha");
        stored.password_hash = passwords.hash("right password").unwrap();

        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(move |_| Ok(Some(stored.clone())));
        let service = service(repository);

        let ok = service
            .login(LoginRequest {
                email: "asha@example.com".to_string(),
                password: "right password".to_string(),
            })
            .await;
        assert!(ok.is_ok());

        let wrong = service
            .login(LoginRequest {
                email: "asha@example.com".to_string(),
                password: "wrong password".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::Unauthenticated(_))));
    }

    #[actix_web::test]
    async fn test_login_unknown_email_uses_same_message() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));

        let result = service(repository)
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "whatever".to_string(),
            })
            .await;

        match result {
            Err(err) => assert_eq!(err.to_string(), "Unauthenticated: invalid email or password"),
            Ok(_) => panic!("expected login to fail"),
        }
    }

    #[actix_web::test]
    async fn test_update_profile_trims_and_passes_only_display_fields() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_update_profile()
            .withf(|id, name, description| {
                id == "user-1"
                    && name.as_deref() == Some("Asha R")
                    && description.as_deref() == Some("Aspiring doctor")
            })
            .times(1)
            .returning(|_, name, description| {
                let mut user = User::test_student("asha");
                user.name = name.unwrap_or_default();
                user.description = description;
                Ok(Some(user))
            });

        let user = service(repository)
            .update_profile(
                "user-1",
                UpdateProfileRequest {
                    name: Some("  Asha R ".to_string()),
                    description: Some(" Aspiring doctor ".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(user.name, "Asha R");
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.description.as_deref(), Some("Aspiring doctor"));
    }

    #[actix_web::test]
    async fn test_update_profile_rejects_blank_name() {
        let mut repository = MockUserRepository::new();
        repository.expect_update_profile().never();

        let result = service(repository)
            .update_profile(
                "user-1",
                UpdateProfileRequest {
                    name: Some("   ".to_string()),
                    description: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_profile_of_missing_account() {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));

        let result = service(repository).profile("gone").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
