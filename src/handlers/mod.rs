pub mod auth_handler;
pub mod health_handler;
pub mod mcq_handler;
pub mod user_handler;

use actix_web::{
    error::{JsonPayloadError, PathError},
    web, HttpRequest,
};

use crate::{auth::IdentityGate, errors::AppError};

/// Mounts every route. Health routes and the account entry points sit
/// outside the Identity Gate; everything under `/api/user` and `/api/mcq`
/// sits behind it, with role checks per route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(health_handler::health)
        .service(health_handler::ready)
        .service(
            web::scope("/api/auth")
                .service(auth_handler::signup)
                .service(auth_handler::login)
                .service(auth_handler::logout)
                .service(auth_handler::check),
        )
        .service(
            web::scope("/api/user")
                .wrap(IdentityGate)
                .service(user_handler::current)
                .service(user_handler::update_profile),
        )
        .service(
            web::scope("/api/mcq")
                .wrap(IdentityGate)
                .service(mcq_handler::create_mcq)
                .service(mcq_handler::can_submit)
                .service(mcq_handler::educator_mcqs)
                .service(mcq_handler::today)
                .service(mcq_handler::submit_answer)
                .service(mcq_handler::student_results)
                .service(mcq_handler::add_video_link)
                .service(mcq_handler::remove_video_link),
        );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected JSON body: {}", err);
    AppError::ValidationError(err.to_string()).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(err.to_string()).into()
}
