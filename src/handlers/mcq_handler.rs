use actix_web::{delete, get, post, web, HttpResponse};
use chrono::Utc;

use crate::{
    app_state::AppState,
    auth::{AuthenticatedUser, RequireRole},
    errors::AppError,
    models::dto::{
        request::{CreateMcqRequest, SubmitAnswerRequest, VideoLinkRequest},
        response::{ApiResponse, EligibilityDto, McqDto},
    },
};

#[post("/create", wrap = "RequireRole::educator()")]
pub async fn create_mcq(
    state: web::Data<AppState>,
    request: web::Json<CreateMcqRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let mcq = state
        .mcq_service
        .create_mcq(&auth.0, request.into_inner(), Utc::now())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        McqDto::from(mcq),
        "MCQ created successfully",
    )))
}

#[get("/can-submit", wrap = "RequireRole::educator()")]
pub async fn can_submit(state: web::Data<AppState>, auth: AuthenticatedUser) -> HttpResponse {
    let eligibility = state.mcq_service.eligibility(&auth.0, Utc::now());
    HttpResponse::Ok().json(EligibilityDto::from(eligibility))
}

#[get("/educator", wrap = "RequireRole::educator()")]
pub async fn educator_mcqs(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let mcqs = state.mcq_service.list_for_educator(&auth.0.user_id).await?;
    Ok(HttpResponse::Ok().json(mcqs))
}

#[get("/today", wrap = "RequireRole::student()")]
pub async fn today(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let view = state.mcq_service.today_for_student(&auth.0.user_id).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/submit", wrap = "RequireRole::student()")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    request: web::Json<SubmitAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let submitted = state
        .mcq_service
        .submit_answer(&auth.0.user_id, request.into_inner(), Utc::now())
        .await?;
    Ok(HttpResponse::Created().json(submitted))
}

#[get("/student-results", wrap = "RequireRole::student()")]
pub async fn student_results(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let results = state.mcq_service.student_results(&auth.0.user_id).await?;
    Ok(HttpResponse::Ok().json(results))
}

#[post("/add-video-link", wrap = "RequireRole::educator()")]
pub async fn add_video_link(
    state: web::Data<AppState>,
    request: web::Json<VideoLinkRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let mcq = state
        .mcq_service
        .add_video_link(&auth.0.user_id, request.into_inner(), Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(mcq, "Video link added")))
}

#[delete("/remove-video-link/{mcq_id}", wrap = "RequireRole::educator()")]
pub async fn remove_video_link(
    state: web::Data<AppState>,
    mcq_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let mcq = state
        .mcq_service
        .remove_video_link(&auth.0.user_id, &mcq_id, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(mcq, "Video link removed")))
}
