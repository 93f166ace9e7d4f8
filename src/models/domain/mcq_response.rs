use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{mcq::Mcq, user::to_bson_datetime};

/// A student's single answer to an MCQ. One per (student, mcq).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct McqResponse {
    pub id: String,
    pub student_id: String,
    pub mcq_id: String,
    pub selected_answer: String,
    pub is_correct: bool,
    /// Seconds.
    #[serde(default)]
    pub time_spent: u32,
    pub submitted_at: BsonDateTime,
}

impl McqResponse {
    pub fn grade(
        mcq: &Mcq,
        student_id: &str,
        selected_answer: &str,
        time_spent: u32,
        now: DateTime<Utc>,
    ) -> Self {
        McqResponse {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            mcq_id: mcq.id.clone(),
            selected_answer: selected_answer.trim().to_string(),
            is_correct: mcq.is_correct(selected_answer),
            time_spent,
            submitted_at: to_bson_datetime(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::mcq::sample_mcq;

    #[test]
    fn test_grade_correct_and_wrong_answers() {
        let mcq = sample_mcq("edu-1");

        let right = McqResponse::grade(&mcq, "stu-1", "Mitochondria", 12, Utc::now());
        assert!(right.is_correct);
        assert_eq!(right.mcq_id, mcq.id);
        assert_eq!(right.time_spent, 12);

        let wrong = McqResponse::grade(&mcq, "stu-1", "Ribosome", 0, Utc::now());
        assert!(!wrong.is_correct);
        assert_eq!(wrong.selected_answer, "Ribosome");
    }
}
