use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::user::{Role, User};

/// Session token payload. `sub` carries the account id at issuance and is the
/// only claim the identity gate reads to find the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn new(user: &User, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        let exp = issued_at + lifetime;

        Self {
            sub: user.id.clone(),
            role: user.role,
            iat: issued_at.timestamp().max(0) as usize,
            exp: exp.timestamp().max(0) as usize,
        }
    }
}
