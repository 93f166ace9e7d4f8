use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use neet_prep_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    if config.production {
        config.validate_for_production().map_err(std::io::Error::other)?;
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let allowed_origins = config.allowed_origins.clone();

    let state = AppState::new(config).await.map_err(|e| {
        log::error!("Failed to initialise application state: {}", e);
        std::io::Error::other(e)
    })?;
    let state = web::Data::new(state);

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
