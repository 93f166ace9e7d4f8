use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::user::to_bson_datetime;

/// An educator-authored question of the day.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Mcq {
    pub id: String,
    pub subject: String,
    pub chapter: String,
    pub topic: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub created_by: String,
    #[serde(default)]
    pub video_link: Option<String>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

pub struct NewMcq {
    pub subject: String,
    pub chapter: String,
    pub topic: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub video_link: Option<String>,
}

impl Mcq {
    pub fn new(fields: NewMcq, created_by: &str, now: DateTime<Utc>) -> Self {
        let at = to_bson_datetime(now);
        Mcq {
            id: Uuid::new_v4().to_string(),
            subject: fields.subject,
            chapter: fields.chapter,
            topic: fields.topic,
            question: fields.question,
            options: fields.options,
            correct_answer: fields.correct_answer,
            created_by: created_by.to_string(),
            video_link: fields.video_link,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn is_correct(&self, selected_answer: &str) -> bool {
        self.correct_answer == selected_answer.trim()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }
}

#[cfg(test)]
pub fn sample_mcq(created_by: &str) -> Mcq {
    Mcq::new(
        NewMcq {
            subject: "Biology".to_string(),
            chapter: "Cell".to_string(),
            topic: "Organelles".to_string(),
            question: "Powerhouse of the cell?".to_string(),
            options: vec![
                "Nucleus".to_string(),
                "Mitochondria".to_string(),
                "Ribosome".to_string(),
                "Golgi body".to_string(),
            ],
            correct_answer: "Mitochondria".to_string(),
            video_link: None,
        },
        created_by,
        Utc::now(),
    )
}
