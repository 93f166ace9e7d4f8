use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    auth::Identity,
    errors::{AppError, AppResult},
    models::{
        domain::{Mcq, McqResponse},
        dto::{
            request::{CreateMcqRequest, SubmitAnswerRequest, VideoLinkRequest},
            response::{
                McqDto, ResultsSummary, StudentMcqView, StudentResultDto, StudentResultsResponse,
                SubmittedAnswerDto,
            },
        },
    },
    repositories::{McqRepository, McqResponseRepository, UserRepository},
    services::submission_gate::{Eligibility, SubmissionWindow},
};

pub struct McqService {
    users: Arc<dyn UserRepository>,
    mcqs: Arc<dyn McqRepository>,
    responses: Arc<dyn McqResponseRepository>,
    window: SubmissionWindow,
}

impl McqService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        mcqs: Arc<dyn McqRepository>,
        responses: Arc<dyn McqResponseRepository>,
        window: SubmissionWindow,
    ) -> Self {
        Self {
            users,
            mcqs,
            responses,
            window,
        }
    }

    pub fn eligibility(&self, author: &Identity, now: DateTime<Utc>) -> Eligibility {
        self.window.evaluate(author.user.last_submission_at, now)
    }

    /// Creates an MCQ under the rolling authoring window.
    ///
    /// The early check against the identity's snapshot only spares a write;
    /// the conditional claim on the user record is what decides. If the MCQ
    /// cannot be stored after a successful claim, the claim is rolled back so
    /// a failed write never costs the author a window.
    pub async fn create_mcq(
        &self,
        author: &Identity,
        request: CreateMcqRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Mcq> {
        self.eligibility(author, now).ensure()?;

        let fields = request.into_new_mcq()?;

        let claimed = self
            .users
            .claim_submission_slot(&author.user_id, now, self.window.cutoff(now))
            .await?;
        if !claimed {
            return Err(self.rejection(&author.user_id, now).await);
        }

        let mcq = Mcq::new(fields, &author.user_id, now);
        match self.mcqs.create(mcq).await {
            Ok(mcq) => {
                log::info!("Educator {} created MCQ {}", author.user_id, mcq.id);
                Ok(mcq)
            }
            Err(err) => {
                log::error!("Failed to store MCQ for {}: {}", author.user_id, err);
                let previous = author.user.last_submission_at;
                if let Err(release_err) = self
                    .users
                    .release_submission_slot(&author.user_id, now, previous)
                    .await
                {
                    log::error!(
                        "Failed to release submission slot for {}: {}",
                        author.user_id,
                        release_err
                    );
                }
                Err(err)
            }
        }
    }

    /// Error for a lost claim, carrying the wait measured from the stored
    /// timestamp that won.
    async fn rejection(&self, user_id: &str, now: DateTime<Utc>) -> AppError {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => {
                let eligibility = self.window.evaluate(user.last_submission(), now);
                log::debug!(
                    "Submission claim for {} lost, {}ms remaining",
                    user_id,
                    eligibility.remaining.num_milliseconds()
                );
                AppError::RateLimited {
                    remaining: eligibility.remaining,
                }
            }
            Ok(None) => AppError::Unauthenticated("account not found".to_string()),
            Err(err) => err,
        }
    }

    pub async fn list_for_educator(&self, author_id: &str) -> AppResult<Vec<McqDto>> {
        let mcqs = self.mcqs.list_by_creator(author_id).await?;
        Ok(mcqs.into_iter().map(McqDto::from).collect())
    }

    pub async fn today_for_student(&self, student_id: &str) -> AppResult<StudentMcqView> {
        let mcq = self
            .mcqs
            .find_latest()
            .await?
            .ok_or_else(|| AppError::NotFound("No MCQ available today".to_string()))?;

        let response = self
            .responses
            .find_by_student_and_mcq(student_id, &mcq.id)
            .await?;
        let author = self.users.find_by_id(&mcq.created_by).await?;

        Ok(StudentMcqView::new(mcq, author.as_ref(), response))
    }

    pub async fn submit_answer(
        &self,
        student_id: &str,
        request: SubmitAnswerRequest,
        now: DateTime<Utc>,
    ) -> AppResult<SubmittedAnswerDto> {
        request.validate()?;

        let mcq = self
            .mcqs
            .find_by_id(&request.mcq_id)
            .await?
            .ok_or_else(|| AppError::NotFound("MCQ not found".to_string()))?;

        if self
            .responses
            .find_by_student_and_mcq(student_id, &mcq.id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(
                "You have already submitted an answer for this MCQ".to_string(),
            ));
        }

        let response = McqResponse::grade(
            &mcq,
            student_id,
            &request.selected_answer,
            request.time_spent.unwrap_or(0),
            now,
        );
        let response = self.responses.create(response).await?;

        log::info!(
            "Student {} answered MCQ {} (correct: {})",
            student_id,
            mcq.id,
            response.is_correct
        );

        Ok(SubmittedAnswerDto {
            response: response.into(),
            correct_answer: mcq.correct_answer,
        })
    }

    pub async fn student_results(&self, student_id: &str) -> AppResult<StudentResultsResponse> {
        let responses = self.responses.list_by_student(student_id).await?;
        let summary = ResultsSummary::from_responses(&responses);

        let ids: Vec<String> = responses.iter().map(|r| r.mcq_id.clone()).collect();
        let mut mcqs: HashMap<String, Mcq> = self
            .mcqs
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|mcq| (mcq.id.clone(), mcq))
            .collect();

        let results = responses
            .into_iter()
            .map(|response| {
                let mcq = mcqs.remove(&response.mcq_id).map(McqDto::from);
                StudentResultDto {
                    response: response.into(),
                    mcq,
                }
            })
            .collect();

        Ok(StudentResultsResponse { results, summary })
    }

    pub async fn add_video_link(
        &self,
        author_id: &str,
        request: VideoLinkRequest,
        now: DateTime<Utc>,
    ) -> AppResult<McqDto> {
        request.validate()?;
        let link = request.video_link.trim().to_string();
        self.set_video_link(author_id, &request.mcq_id, Some(link), now)
            .await
    }

    pub async fn remove_video_link(
        &self,
        author_id: &str,
        mcq_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<McqDto> {
        self.set_video_link(author_id, mcq_id, None, now).await
    }

    async fn set_video_link(
        &self,
        author_id: &str,
        mcq_id: &str,
        link: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<McqDto> {
        let not_found = || AppError::NotFound("MCQ not found".to_string());

        let mcq = self.mcqs.find_by_id(mcq_id).await?.ok_or_else(not_found)?;
        if !mcq.is_owned_by(author_id) {
            return Err(AppError::Forbidden(
                "You can only change video links on your own MCQs".to_string(),
            ));
        }

        let updated = self
            .mcqs
            .set_video_link(mcq_id, link, now)
            .await?
            .ok_or_else(not_found)?;
        Ok(updated.into())
    }
}
