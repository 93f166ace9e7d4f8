use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::claims::Claims,
    errors::{AppError, AppResult},
    models::domain::user::User,
};

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl JwtService {
    pub fn new(secret: &SecretString, expiration_hours: i64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation,
            lifetime: Duration::hours(expiration_hours),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn create_token(&self, user: &User) -> AppResult<String> {
        self.create_token_at(user, Utc::now())
    }

    pub fn create_token_at(&self, user: &User, issued_at: DateTime<Utc>) -> AppResult<String> {
        let claims = Claims::new(user, issued_at, self.lifetime);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to create JWT: {}", e)))
    }

    /// Signature, expiry and claim shape are all checked here; every failure is
    /// reported the same way so callers cannot distinguish forged from stale.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Rejected session token: {:?}", e.kind());
                AppError::Unauthenticated("invalid or expired credential".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, models::domain::Role};
    use serde_json::json;

    fn service() -> JwtService {
        let config = Config::test_config();
        JwtService::new(&config.jwt_secret, 1)
    }

    fn sign_raw(payload: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn assert_invalid(result: AppResult<Claims>) {
        match result {
            Err(AppError::Unauthenticated(msg)) => {
                assert_eq!(msg, "invalid or expired credential")
            }
            other => panic!("expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn test_jwt_create_and_validate() {
        let jwt_service = service();
        let user = User::test_educator("ravi");

        let token = jwt_service.create_token(&user).unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Educator);
    }

    #[test]
    fn test_jwt_garbage_token() {
        assert_invalid(service().validate_token("invalid.token.here"));
        assert_invalid(service().validate_token("not-even-a-jwt"));
    }

    #[test]
    fn test_jwt_expired_token() {
        let jwt_service = service();
        let user = User::test_student("mira");

        let issued_two_hours_ago = Utc::now() - Duration::hours(2);
        let token = jwt_service.create_token_at(&user, issued_two_hours_ago).unwrap();

        assert_invalid(jwt_service.validate_token(&token));
    }

    #[test]
    fn test_jwt_wrong_secret() {
        let other = JwtService::new(&SecretString::from("another-secret".to_string()), 1);
        let token = other.create_token(&User::test_student("mira")).unwrap();

        assert_invalid(service().validate_token(&token));
    }

    #[test]
    fn test_jwt_legacy_subject_claim_names_are_rejected() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let secret = "test_jwt_secret_key";

        let user_id_claim = sign_raw(json!({ "userId": "abc", "role": "student", "exp": exp, "iat": 0 }), secret);
        let underscore_id_claim = sign_raw(json!({ "_id": "abc", "role": "student", "exp": exp, "iat": 0 }), secret);

        assert_invalid(service().validate_token(&user_id_claim));
        assert_invalid(service().validate_token(&underscore_id_claim));
    }

    #[test]
    fn test_jwt_unknown_role_is_rejected() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = sign_raw(
            json!({ "sub": "abc", "role": "admin", "exp": exp, "iat": 0 }),
            "test_jwt_secret_key",
        );

        assert_invalid(service().validate_token(&token));
    }
}
