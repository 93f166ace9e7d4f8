use actix_web::cookie::{time, Cookie, SameSite};

use crate::config::Config;

/// HTTP-only cookie carrying the session token. Cross-site in production
/// (frontend on another origin), same-site otherwise.
pub fn session_cookie(config: &Config, token: String, lifetime: chrono::Duration) -> Cookie<'static> {
    Cookie::build(config.session_cookie_name.clone(), token)
        .path("/")
        .http_only(true)
        .secure(config.production)
        .same_site(same_site(config))
        .max_age(time::Duration::seconds(lifetime.num_seconds()))
        .finish()
}

pub fn removal_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::build(config.session_cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .secure(config.production)
        .same_site(same_site(config))
        .finish();
    cookie.make_removal();
    cookie
}

fn same_site(config: &Config) -> SameSite {
    if config.production {
        SameSite::None
    } else {
        SameSite::Lax
    }
}
