use std::fmt;

use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. Closed set; anything else fails to deserialize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Educator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Educator => "educator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stored as a BSON date so the submission window can be range-queried.
    #[serde(default)]
    pub last_submission_at: Option<BsonDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: &str, role: Role) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash: password_hash.to_string(),
            role,
            description: None,
            last_submission_at: None,
            created_at: Some(Utc::now()),
        }
    }

    pub fn last_submission(&self) -> Option<DateTime<Utc>> {
        self.last_submission_at.and_then(from_bson_datetime)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn to_bson_datetime(at: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(at.timestamp_millis())
}

pub fn from_bson_datetime(at: BsonDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(at.timestamp_millis())
}

#[cfg(test)]
impl User {
    pub fn test_student(name: &str) -> Self {
        User::new(name, &format!("{}@example.com", name), "not-a-real-hash", Role::Student)
    }

    pub fn test_educator(name: &str) -> Self {
        User::new(name, &format!("{}@example.com", name), "not-a-real-hash", Role::Educator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation_normalizes_email() {
        let user = User::new(" Asha ", " Asha@Example.COM ", "hash", Role::Educator);

        assert_eq!(user.name, "Asha");
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(user.role, Role::Educator);
        assert!(user.last_submission().is_none());
        assert!(!user.id.is_empty());
    }

    #[test]
    fn test_role_rejects_unknown_strings() {
        assert_eq!(serde_json::from_str::<Role>("\"educator\"").unwrap(), Role::Educator);
        assert_eq!(serde_json::from_str::<Role>("\"student\"").unwrap(), Role::Student);
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
        assert!(serde_json::from_str::<Role>("\"Educator\"").is_err());
    }

    #[test]
    fn test_bson_datetime_conversion_keeps_millis() {
        let at = DateTime::from_timestamp_millis(1_760_000_000_123).unwrap();
        assert_eq!(from_bson_datetime(to_bson_datetime(at)), Some(at));
    }
}
