use actix_web::{get, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::UpdateProfileRequest,
        response::{ApiResponse, ProfileResponse, UserDto},
    },
};

/// Reads the account fresh from storage, so a profile edit made in another
/// session shows up before the token is reissued.
#[get("/current")]
pub async fn current(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.account_service.profile(&auth.0.user_id).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: UserDto::from(user),
    }))
}

#[put("/profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .account_service
        .update_profile(&auth.0.user_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(UserDto::from(user), "Profile updated")))
}
