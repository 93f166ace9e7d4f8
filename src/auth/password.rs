use pbkdf2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Pbkdf2,
};
use rand_core::OsRng;

use crate::errors::{AppError, AppResult};

/// PBKDF2-SHA256 hashing in PHC string format. The round count is only used
/// for new hashes; verification reads it back from the stored string.
#[derive(Clone, Debug)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    pub fn new(rounds: u32) -> Self {
        Self {
            params: Params {
                rounds,
                ..Params::default()
            },
        }
    }

    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, self.params, &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))
    }

    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            log::warn!("Stored password hash is not a valid PHC string");
            return false;
        };

        Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}
