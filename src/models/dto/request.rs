use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{NewMcq, Role},
};

pub const MIN_MCQ_OPTIONS: usize = 4;

static YOUTUBE_URL_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(
        r"(?i)^https?://(?:(?:[a-z0-9-]+\.)*youtube\.com/watch\?(?:[^#]*&)?v=[^&#]+|(?:www\.)?youtu\.be/[^/?#]+)",
    )
    .expect("YOUTUBE_URL_REGEX is a valid regex pattern")
});

pub fn is_youtube_url(url: &str) -> bool {
    YOUTUBE_URL_REGEX.is_match(url.trim())
}

/// Clients send `""` for an empty optional field; treat it as absent.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

fn validate_youtube_url(url: &str) -> Result<(), ValidationError> {
    if is_youtube_url(url) {
        Ok(())
    } else {
        Err(ValidationError::new("youtube_url")
            .with_message("Please provide a valid YouTube URL".into()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Option<Role>,

    #[serde(default, alias = "inviteCode", deserialize_with = "blank_as_none")]
    pub invite_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMcqRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,

    #[validate(length(min = 1, max = 200))]
    pub chapter: String,

    #[validate(length(min = 1, max = 200))]
    pub topic: String,

    #[validate(length(min = 1, max = 5000))]
    pub question: String,

    #[validate(length(min = 4, message = "At least 4 options are required"))]
    pub options: Vec<String>,

    #[validate(length(min = 1, max = 1000))]
    #[serde(alias = "correctAnswer")]
    pub correct_answer: String,

    #[validate(custom(function = "validate_youtube_url"))]
    #[serde(default, alias = "videoLink", deserialize_with = "blank_as_none")]
    pub video_link: Option<String>,
}

impl CreateMcqRequest {
    /// Field validation plus the checks that span fields: blank-after-trim
    /// text, blank options, and the answer being one of the options.
    pub fn into_new_mcq(self) -> AppResult<NewMcq> {
        self.validate()?;

        let subject = required_text(&self.subject, "subject")?;
        let chapter = required_text(&self.chapter, "chapter")?;
        let topic = required_text(&self.topic, "topic")?;
        let question = required_text(&self.question, "question")?;
        let correct_answer = required_text(&self.correct_answer, "correct_answer")?;

        let options: Vec<String> = self.options.iter().map(|o| o.trim().to_string()).collect();
        if options.len() < MIN_MCQ_OPTIONS || options.iter().any(|o| o.is_empty()) {
            return Err(AppError::ValidationError(
                "All options must be filled".to_string(),
            ));
        }

        if !options.contains(&correct_answer) {
            return Err(AppError::ValidationError(
                "Correct answer must be one of the provided options".to_string(),
            ));
        }

        let video_link = self
            .video_link
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty());

        Ok(NewMcq {
            subject,
            chapter,
            topic,
            question,
            options,
            correct_answer,
            video_link,
        })
    }
}

fn required_text(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "mcqId")]
    pub mcq_id: String,

    #[validate(length(min = 1, max = 1000))]
    #[serde(alias = "selectedAnswer")]
    pub selected_answer: String,

    /// Seconds.
    #[serde(default, alias = "timeSpent")]
    pub time_spent: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VideoLinkRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "mcqId")]
    pub mcq_id: String,

    #[validate(custom(function = "validate_youtube_url"))]
    #[serde(alias = "videoLink")]
    pub video_link: String,
}

/// Only the display fields; role, email and the submission timestamp are
/// not reachable from here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub name: Option<String>,

    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: Option<String>,
}
