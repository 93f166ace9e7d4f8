use actix_web::{get, post, route, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{
        cookie::{removal_cookie, session_cookie},
        AuthenticatedUser, IdentityGate,
    },
    errors::AppError,
    models::{
        domain::User,
        dto::{
            request::{LoginRequest, SignupRequest},
            response::{ApiResponse, AuthCheckResponse, MessageResponse, UserDto},
        },
    },
};

fn with_session(
    state: &AppState,
    mut builder: actix_web::HttpResponseBuilder,
    user: User,
    message: &str,
) -> Result<HttpResponse, AppError> {
    let token = state.jwt_service.create_token(&user)?;
    let cookie = session_cookie(&state.config, token, state.jwt_service.lifetime());

    Ok(builder
        .cookie(cookie)
        .json(ApiResponse::new(UserDto::from(user), message)))
}

#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.account_service.signup(request.into_inner()).await?;
    with_session(&state, HttpResponse::Created(), user, "Account created")
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.account_service.login(request.into_inner()).await?;
    log::info!("User {} logged in", user.id);
    with_session(&state, HttpResponse::Ok(), user, "Logged in")
}

#[route("/logout", method = "GET", method = "POST")]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(removal_cookie(&state.config))
        .json(MessageResponse {
            message: "Logged out".to_string(),
        })
}

#[get("/check", wrap = "IdentityGate")]
pub async fn check(auth: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(AuthCheckResponse {
        authenticated: true,
        user: auth.0.user,
    })
}
