use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    errors::whole_hours_ceil,
    models::domain::{user::from_bson_datetime, Mcq, McqResponse, Role, User},
    services::submission_gate::Eligibility,
};

/// Account as exposed over the API. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_submission_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        let last_submission_at = user.last_submission();
        UserDto {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            description: user.description,
            last_submission_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: &str) -> Self {
        Self {
            data,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Full MCQ, including the answer. Only for its author or after answering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McqDto {
    pub id: String,
    pub subject: String,
    pub chapter: String,
    pub topic: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub created_by: String,
    pub video_link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Mcq> for McqDto {
    fn from(mcq: Mcq) -> Self {
        McqDto {
            id: mcq.id,
            subject: mcq.subject,
            chapter: mcq.chapter,
            topic: mcq.topic,
            question: mcq.question,
            options: mcq.options,
            correct_answer: mcq.correct_answer,
            created_by: mcq.created_by,
            video_link: mcq.video_link,
            created_at: from_bson_datetime(mcq.created_at),
            updated_at: from_bson_datetime(mcq.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McqResponseDto {
    pub id: String,
    pub mcq_id: String,
    pub selected_answer: String,
    pub is_correct: bool,
    pub time_spent: u32,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<McqResponse> for McqResponseDto {
    fn from(response: McqResponse) -> Self {
        McqResponseDto {
            id: response.id,
            mcq_id: response.mcq_id,
            selected_answer: response.selected_answer,
            is_correct: response.is_correct,
            time_spent: response.time_spent,
            submitted_at: from_bson_datetime(response.submitted_at),
        }
    }
}

/// Today's MCQ as a student sees it: no correct answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentMcqView {
    pub id: String,
    pub subject: String,
    pub chapter: String,
    pub topic: String,
    pub question: String,
    pub options: Vec<String>,
    pub video_link: Option<String>,
    pub created_by: String,
    /// `None` if the author's account is gone.
    pub created_by_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_attempted: bool,
    pub student_response: Option<McqResponseDto>,
}

impl StudentMcqView {
    pub fn new(mcq: Mcq, author: Option<&User>, response: Option<McqResponse>) -> Self {
        StudentMcqView {
            id: mcq.id,
            subject: mcq.subject,
            chapter: mcq.chapter,
            topic: mcq.topic,
            question: mcq.question,
            options: mcq.options,
            video_link: mcq.video_link,
            created_by: mcq.created_by,
            created_by_name: author.map(|user| user.name.clone()),
            created_at: from_bson_datetime(mcq.created_at),
            is_attempted: response.is_some(),
            student_response: response.map(McqResponseDto::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmittedAnswerDto {
    #[serde(flatten)]
    pub response: McqResponseDto,
    pub correct_answer: String,
}

#[derive(Debug, Serialize)]
pub struct StudentResultDto {
    #[serde(flatten)]
    pub response: McqResponseDto,
    /// `None` if the MCQ has since been removed.
    pub mcq: Option<McqDto>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultsSummary {
    pub total_attempts: usize,
    pub correct_answers: usize,
    pub wrong_answers: usize,
    pub accuracy_percentage: u32,
}

impl ResultsSummary {
    pub fn from_responses(responses: &[McqResponse]) -> Self {
        let total_attempts = responses.len();
        let correct_answers = responses.iter().filter(|r| r.is_correct).count();
        let accuracy_percentage = if total_attempts == 0 {
            0
        } else {
            ((correct_answers as f64 / total_attempts as f64) * 100.0).round() as u32
        };

        ResultsSummary {
            total_attempts,
            correct_answers,
            wrong_answers: total_attempts - correct_answers,
            accuracy_percentage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudentResultsResponse {
    pub results: Vec<StudentResultDto>,
    pub summary: ResultsSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityDto {
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_eligible_at: Option<DateTime<Utc>>,
}

impl From<Eligibility> for EligibilityDto {
    fn from(eligibility: Eligibility) -> Self {
        if eligibility.can_submit {
            return EligibilityDto {
                can_submit: true,
                remaining_ms: None,
                remaining_hours: None,
                next_eligible_at: None,
            };
        }

        EligibilityDto {
            can_submit: false,
            remaining_ms: Some(eligibility.remaining.num_milliseconds()),
            remaining_hours: Some(whole_hours_ceil(eligibility.remaining)),
            next_eligible_at: eligibility.next_eligible_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::mcq::sample_mcq,
        services::submission_gate::SubmissionWindow,
    };
    use chrono::Duration;

    #[test]
    fn test_user_dto_hides_password_hash() {
        let user = User::test_student("mira");
        let json = serde_json::to_value(UserDto::from(user.clone())).unwrap();

        assert_eq!(json["email"], user.email);
        assert_eq!(json["role"], "student");
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("not-a-real-hash"));
    }

    #[test]
    fn test_student_view_hides_correct_answer() {
        let author = User::test_educator("ravi");
        let view = StudentMcqView::new(sample_mcq(&author.id), Some(&author), None);
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("correct_answer").is_none());
        assert_eq!(json["created_by_name"], "ravi");
        assert_eq!(json["is_attempted"], false);
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_results_summary() {
        let mcq = sample_mcq("edu-1");
        let now = Utc::now();
        let responses = vec![
            McqResponse::grade(&mcq, "s", "Mitochondria", 0, now),
            McqResponse::grade(&mcq, "s", "Nucleus", 0, now),
            McqResponse::grade(&mcq, "s", "Mitochondria", 0, now),
        ];

        let summary = ResultsSummary::from_responses(&responses);
        assert_eq!(summary.total_attempts, 3);
        assert_eq!(summary.correct_answers, 2);
        assert_eq!(summary.wrong_answers, 1);
        assert_eq!(summary.accuracy_percentage, 67);

        assert_eq!(ResultsSummary::from_responses(&[]).accuracy_percentage, 0);
    }

    #[test]
    fn test_eligibility_dto() {
        let window = SubmissionWindow::default();
        let now = Utc::now();

        let open = EligibilityDto::from(window.evaluate(None, now));
        assert!(open.can_submit);
        assert!(open.remaining_ms.is_none());

        let closed = EligibilityDto::from(window.evaluate(Some(now - Duration::hours(1)), now));
        assert!(!closed.can_submit);
        assert_eq!(closed.remaining_ms, Some(Duration::hours(23).num_milliseconds()));
        assert_eq!(closed.remaining_hours, Some(23));
    }
}
